//! Per-product flow description
//!
//! Every product kind and verification mode runs through the same
//! controller; the differences are captured here.

use crate::domain::{ErrorPolicy, Product};

#[derive(Debug, Clone, PartialEq)]
pub struct FlowSpec {
    pub product: Product,
    pub create_path: String,
    pub pay_path: String,
    pub check_path: String,
    /// `amount` or `duration`
    pub quantity_field: &'static str,
    pub default_quantity: Option<u64>,
    pub create_policy: ErrorPolicy,
    pub pay_policy: ErrorPolicy,
}

impl FlowSpec {
    pub fn for_product(product: Product) -> Self {
        Self {
            product,
            create_path: product.create_path(),
            pay_path: product.pay_path(),
            check_path: product.check_path(),
            quantity_field: product.kind.quantity_field(),
            default_quantity: product.kind.default_quantity(),
            create_policy: ErrorPolicy::create_default(),
            pay_policy: ErrorPolicy::pay_default(),
        }
    }

    pub fn with_create_policy(mut self, policy: ErrorPolicy) -> Self {
        self.create_policy = policy;
        self
    }

    pub fn with_pay_policy(mut self, policy: ErrorPolicy) -> Self {
        self.pay_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorCode, ProductKind};

    #[test]
    fn test_premium_without_kyc_spec() {
        let spec = FlowSpec::for_product(Product::without_kyc(ProductKind::Premium));
        assert_eq!(spec.create_path, "/v2/buyPremiumWithoutKYC/create");
        assert_eq!(spec.check_path, "/v2/buyPremiumWithoutKYC/check");
        assert_eq!(spec.quantity_field, "duration");
        assert_eq!(spec.default_quantity, Some(3));
    }

    #[test]
    fn test_all_flows_share_policies() {
        for product in Product::all() {
            let spec = FlowSpec::for_product(product);
            assert!(spec.pay_policy.retryable_codes().contains(&ErrorCode::TransferFailed));
            assert!(spec.create_policy.retryable_codes().contains(&ErrorCode::SearchFailed));
        }
    }
}
