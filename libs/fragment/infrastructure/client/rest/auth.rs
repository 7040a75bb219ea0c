//! Auth key requests for RestClient

use serde_json::{json, Value};

use super::RestClient;
use crate::domain::AuthKeyResponse;
use crate::error::Result;
use crate::infrastructure::client::credentials::CredentialError;
use crate::infrastructure::client::transport::{Transport, TransportError};

const AUTH_PATH: &str = "/v2/auth";

impl<T: Transport> RestClient<T> {
    /// Body of `POST /v2/auth`
    ///
    /// Both secrets are validated but sent as plain text: `/v2/auth` does not
    /// take the encoded form used by the other endpoints.
    pub fn auth_body(
        &self,
        cookies: Option<&str>,
        seed: Option<&str>,
    ) -> std::result::Result<Value, CredentialError> {
        let cookies = self.credentials.validated_cookies(cookies)?;
        let seed = self.credentials.validated_seed(seed)?;

        Ok(json!({
            "fragment_cookies": cookies,
            "seed": seed,
        }))
    }

    pub async fn submit_auth(
        &self,
        body: &Value,
    ) -> std::result::Result<AuthKeyResponse, TransportError> {
        self.post(AUTH_PATH, body).await
    }

    /// Single auth key request, no retry
    pub async fn request_auth_key(
        &self,
        cookies: Option<&str>,
        seed: Option<&str>,
    ) -> Result<AuthKeyResponse> {
        let body = self.auth_body(cookies, seed)?;
        Ok(self.submit_auth(&body).await?)
    }
}
