//! Credential validation and encoding
//!
//! Seeds and cookie headers are validated before any request is built and
//! encoded the way the v2 API expects them.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const COOKIE_MARKER: &str = "stel_ssid=";
const SEED_WORD_COUNTS: [usize; 2] = [12, 24];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("seed must be 12 or 24 whitespace-separated words, got {words}")]
    InvalidSeed { words: usize },

    #[error("fragment cookies must be a header string containing stel_ssid=")]
    InvalidCookies,

    #[error("{0} not provided and no default set")]
    MissingCredential(CredentialKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Seed,
    Cookies,
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialKind::Seed => f.write_str("seed"),
            CredentialKind::Cookies => f.write_str("fragment cookies"),
        }
    }
}

/// Wire encoding applied to validated secrets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialEncoding {
    #[default]
    Base64,
    Raw,
}

impl CredentialEncoding {
    fn encode(&self, value: &str) -> String {
        match self {
            CredentialEncoding::Base64 => STANDARD.encode(value.as_bytes()),
            CredentialEncoding::Raw => value.to_string(),
        }
    }
}

/// Validates and encodes seeds and cookie headers, with client-wide defaults
#[derive(Clone, Default)]
pub struct CredentialPreparer {
    default_seed: Option<String>,
    default_cookies: Option<String>,
    encoding: CredentialEncoding,
}

impl fmt::Debug for CredentialPreparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPreparer")
            .field("has_default_seed", &self.default_seed.is_some())
            .field("has_default_cookies", &self.default_cookies.is_some())
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl CredentialPreparer {
    pub fn new(encoding: CredentialEncoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    pub fn with_default_seed(mut self, seed: Option<String>) -> Self {
        self.default_seed = non_blank(seed.as_deref()).map(str::to_string);
        self
    }

    pub fn with_default_cookies(mut self, cookies: Option<String>) -> Self {
        self.default_cookies = non_blank(cookies.as_deref()).map(str::to_string);
        self
    }

    pub fn encoding(&self) -> CredentialEncoding {
        self.encoding
    }

    /// Validate and encode a seed phrase, falling back to the default
    pub fn seed(&self, seed: Option<&str>) -> Result<String, CredentialError> {
        Ok(self.encoding.encode(&self.validated_seed(seed)?))
    }

    /// Validate and encode a cookie header string, falling back to the default
    pub fn cookies(&self, cookies: Option<&str>) -> Result<String, CredentialError> {
        Ok(self.encoding.encode(&self.validated_cookies(cookies)?))
    }

    /// Validated seed phrase as plain text, whatever the configured encoding
    pub fn validated_seed(&self, seed: Option<&str>) -> Result<String, CredentialError> {
        let seed = non_blank(seed)
            .or_else(|| non_blank(self.default_seed.as_deref()))
            .ok_or(CredentialError::MissingCredential(CredentialKind::Seed))?;

        let words = seed.split_whitespace().count();
        if !SEED_WORD_COUNTS.contains(&words) {
            return Err(CredentialError::InvalidSeed { words });
        }
        Ok(seed.to_string())
    }

    /// Validated cookie header as plain text, whatever the configured encoding
    pub fn validated_cookies(&self, cookies: Option<&str>) -> Result<String, CredentialError> {
        let cookies = non_blank(cookies)
            .or_else(|| non_blank(self.default_cookies.as_deref()))
            .ok_or(CredentialError::MissingCredential(CredentialKind::Cookies))?;

        if !cookies.contains(COOKIE_MARKER) {
            return Err(CredentialError::InvalidCookies);
        }
        Ok(cookies.to_string())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
