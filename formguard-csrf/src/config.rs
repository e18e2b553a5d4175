use crate::error::{CsrfError, Result};
use serde::Deserialize;
use std::env;

/// Default number of tokens a store retains before evicting the oldest.
pub const DEFAULT_MAX_TOKENS: usize = 1000;

/// Default length, in characters, of generated tokens.
pub const DEFAULT_TOKEN_LENGTH: usize = 32;

/// Per-store configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TokenStoreConfig {
    /// Maximum number of tokens retained, spent or not
    pub max_tokens: usize,

    /// Length of generated tokens in hex characters
    pub token_length: usize,
}

impl Default for TokenStoreConfig {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            token_length: DEFAULT_TOKEN_LENGTH,
        }
    }
}

impl TokenStoreConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `FORMGUARD_MAX_TOKENS` and `FORMGUARD_TOKEN_LENGTH`.
    ///
    /// Missing, unparseable or zero variables keep their default value.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str, default: usize| {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(default)
        };

        Self {
            max_tokens: read("FORMGUARD_MAX_TOKENS", DEFAULT_MAX_TOKENS),
            token_length: read("FORMGUARD_TOKEN_LENGTH", DEFAULT_TOKEN_LENGTH),
        }
    }

    /// Set the maximum number of retained tokens
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the generated token length
    pub fn with_token_length(mut self, token_length: usize) -> Self {
        self.token_length = token_length;
        self
    }

    /// Check that the configuration can be used by a store
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(CsrfError::Config(
                "max_tokens must be at least 1".to_string(),
            ));
        }

        if self.token_length == 0 {
            return Err(CsrfError::Config(
                "token_length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = TokenStoreConfig::default();
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.token_length, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = TokenStoreConfig::new()
            .with_max_tokens(10)
            .with_token_length(64);

        assert_eq!(config.max_tokens, 10);
        assert_eq!(config.token_length, 64);
    }

    #[test]
    fn test_invalid_config() {
        assert!(TokenStoreConfig::new().with_max_tokens(0).validate().is_err());
        assert!(TokenStoreConfig::new().with_token_length(0).validate().is_err());
    }

    #[test]
    fn test_config_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("FORMGUARD_MAX_TOKENS", "50"),
            ("FORMGUARD_TOKEN_LENGTH", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let config = TokenStoreConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
        assert_eq!(config.max_tokens, 50);
        assert_eq!(config.token_length, DEFAULT_TOKEN_LENGTH);
    }

    #[test]
    fn test_config_from_lookup_ignores_zero() {
        let config = TokenStoreConfig::from_lookup(|key| match key {
            "FORMGUARD_MAX_TOKENS" | "FORMGUARD_TOKEN_LENGTH" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(config, TokenStoreConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_deserialize_partial() {
        let config: TokenStoreConfig = serde_json::from_str(r#"{"max_tokens": 5}"#).unwrap();
        assert_eq!(config.max_tokens, 5);
        assert_eq!(config.token_length, DEFAULT_TOKEN_LENGTH);
    }
}
