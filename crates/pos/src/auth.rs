//! Bearer credentials for the remote store.

use serde::{Deserialize, Serialize};

/// Access token sent as `Authorization: Bearer <token>`.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token; blank input yields `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

/// Salesperson login payload.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub access_token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_tokens_are_rejected() {
        assert!(BearerToken::new("").is_none());
        assert!(BearerToken::new("   ").is_none());
        assert_eq!(BearerToken::new(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = BearerToken::new("secret-token").unwrap();
        assert!(!format!("{token:?}").contains("secret"));

        let login = LoginRequest {
            email: "till@shop.test".to_string(),
            password: "hunter2".to_string(),
        };
        let rendered = format!("{login:?}");
        assert!(rendered.contains("till@shop.test"));
        assert!(!rendered.contains("hunter2"));
    }
}
