//! Shared helpers for turning raw JSON into typed responses

use serde_json::Value;

use super::transport::TransportError;
use crate::domain::ErrorCode;

/// Deserialize a JSON body with proper error handling
pub fn parse_json<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, TransportError> {
    serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()))
}

/// Pull `error_code` out of an error body, if it is JSON and has one
pub fn extract_error_code(body: &str) -> Option<ErrorCode> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .get("error_code")
        .and_then(Value::as_str)
        .map(ErrorCode::parse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_code() {
        assert_eq!(
            extract_error_code(r#"{"error_code":"ORDER_NOT_FOUND"}"#),
            Some(ErrorCode::OrderNotFound)
        );
        assert_eq!(extract_error_code("<html>502</html>"), None);
        assert_eq!(extract_error_code(r#"{"message":"nope"}"#), None);
    }
}
