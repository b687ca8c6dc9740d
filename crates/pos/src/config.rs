//! Terminal configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;

use crate::auth::{BearerToken, LoginRequest};

pub const API_URL_ENV: &str = "TILLPOINT_API_URL";
pub const AUTH_TOKEN_ENV: &str = "TILLPOINT_AUTH_TOKEN";
pub const LOGIN_EMAIL_ENV: &str = "TILLPOINT_LOGIN_EMAIL";
pub const LOGIN_PASSWORD_ENV: &str = "TILLPOINT_LOGIN_PASSWORD";
pub const SUGGEST_DEBOUNCE_ENV: &str = "TILLPOINT_SUGGEST_DEBOUNCE_MS";
pub const CATALOG_PAGE_SIZE_ENV: &str = "TILLPOINT_CATALOG_PAGE_SIZE";

pub const DEFAULT_API_URL: &str = "http://localhost:1879";
pub const DEFAULT_SUGGEST_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_CATALOG_PAGE_SIZE: u32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Runtime configuration of a till.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosConfig {
    /// Base URL of the remote store, without trailing slash.
    pub api_url: String,
    pub auth_token: Option<BearerToken>,
    /// Credentials to exchange for a token when no token is configured.
    pub login: Option<LoginRequest>,
    /// Quiet window of the customer-suggestion debounce.
    pub suggest_debounce: Duration,
    pub catalog_page_size: u32,
}

impl Default for PosConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_token: None,
            login: None,
            suggest_debounce: DEFAULT_SUGGEST_DEBOUNCE,
            catalog_page_size: DEFAULT_CATALOG_PAGE_SIZE,
        }
    }
}

impl PosConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(API_URL_ENV) {
            let trimmed = url.trim().trim_end_matches('/');
            if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
                return Err(ConfigError::invalid(
                    API_URL_ENV,
                    &url,
                    "expected an http(s) URL",
                ));
            }
            config.api_url = trimmed.to_string();
        }

        config.auth_token = lookup(AUTH_TOKEN_ENV).and_then(BearerToken::new);

        if let (Some(email), Some(password)) = (lookup(LOGIN_EMAIL_ENV), lookup(LOGIN_PASSWORD_ENV)) {
            config.login = Some(LoginRequest { email, password });
        }

        if let Some(raw) = lookup(SUGGEST_DEBOUNCE_ENV) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(SUGGEST_DEBOUNCE_ENV, &raw, format!("{e}")))?;
            config.suggest_debounce = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(CATALOG_PAGE_SIZE_ENV) {
            let size: u32 = raw
                .trim()
                .parse()
                .map_err(|e| ConfigError::invalid(CATALOG_PAGE_SIZE_ENV, &raw, format!("{e}")))?;
            if size == 0 {
                return Err(ConfigError::invalid(CATALOG_PAGE_SIZE_ENV, &raw, "must be positive"));
            }
            config.catalog_page_size = size;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<PosConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PosConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, PosConfig::default());
        assert_eq!(config.suggest_debounce, Duration::from_millis(500));
        assert_eq!(config.api_url, "http://localhost:1879");
    }

    #[test]
    fn reads_all_keys() {
        let config = load(&[
            (API_URL_ENV, "https://store.example/api/"),
            (AUTH_TOKEN_ENV, "tok"),
            (SUGGEST_DEBOUNCE_ENV, "250"),
            (CATALOG_PAGE_SIZE_ENV, "20"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://store.example/api");
        assert_eq!(config.auth_token, BearerToken::new("tok"));
        assert_eq!(config.suggest_debounce, Duration::from_millis(250));
        assert_eq!(config.catalog_page_size, 20);
        assert!(config.login.is_none());
    }

    #[test]
    fn login_requires_both_email_and_password() {
        let only_email = load(&[(LOGIN_EMAIL_ENV, "till@shop.test")]).unwrap();
        assert!(only_email.login.is_none());

        let both = load(&[
            (LOGIN_EMAIL_ENV, "till@shop.test"),
            (LOGIN_PASSWORD_ENV, "pw"),
        ])
        .unwrap();
        assert_eq!(both.login.unwrap().email, "till@shop.test");
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = load(&[(AUTH_TOKEN_ENV, "  ")]).unwrap();
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[(SUGGEST_DEBOUNCE_ENV, "soon")]),
            Err(ConfigError::Invalid { key: SUGGEST_DEBOUNCE_ENV, .. })
        ));
        assert!(matches!(
            load(&[(CATALOG_PAGE_SIZE_ENV, "0")]),
            Err(ConfigError::Invalid { key: CATALOG_PAGE_SIZE_ENV, .. })
        ));
        assert!(matches!(
            load(&[(API_URL_ENV, "localhost:1879")]),
            Err(ConfigError::Invalid { key: API_URL_ENV, .. })
        ));
    }
}
