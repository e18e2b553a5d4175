use crate::config::TokenStoreConfig;
use crate::error::{CsrfError, Result};
use crate::store::TokenStore;
use crate::token::{TokenCollection, TokenState};
use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// In-process token store.
///
/// Tokens live only as long as this value. To survive across web requests
/// the store itself has to be kept somewhere that outlives the request;
/// otherwise use `SessionTokenStore`.
#[derive(Debug, Clone, Default)]
pub struct ArrayTokenStore {
    config: TokenStoreConfig,
    tokens: TokenCollection,
}

impl ArrayTokenStore {
    /// Create a store with the default capacity of 1000 tokens
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that retains at most `max_tokens` tokens.
    ///
    /// Fails with [`CsrfError::Config`] if `max_tokens` is zero.
    pub fn with_max_tokens(max_tokens: usize) -> Result<Self> {
        Self::with_config(TokenStoreConfig::default().with_max_tokens(max_tokens))
    }

    /// Create a store from a validated configuration.
    pub fn with_config(config: TokenStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tokens: TokenCollection::new(),
        })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn collection(&self) -> &TokenCollection {
        &self.tokens
    }

    fn enforce_capacity(&mut self) {
        let evicted = self.tokens.evict_to(self.config.max_tokens);
        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                max_tokens = self.config.max_tokens,
                "Evicted oldest CSRF tokens"
            );
        }
    }
}

impl TokenStore for ArrayTokenStore {
    fn config(&self) -> &TokenStoreConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut TokenStoreConfig {
        &mut self.config
    }

    fn save_token(&mut self, token: &str) -> Result<()> {
        let inserted = self.tokens.insert_valid(token);
        trace!(inserted, stored = self.tokens.len(), "Saved CSRF token");
        self.enforce_capacity();
        Ok(())
    }

    fn verify_token(&self, token: &str) -> Result<()> {
        match self.tokens.state(token) {
            None => Err(CsrfError::TokenInvalid {
                token: token.to_string(),
            }),
            Some(TokenState::Spent(consumed_at)) => Err(CsrfError::TokenSpent {
                token: token.to_string(),
                consumed_at,
            }),
            Some(TokenState::Valid) => Ok(()),
        }
    }

    fn consume_token_at(&mut self, token: &str, at: DateTime<Utc>) -> Result<()> {
        if !self.tokens.mark_consumed(token, at) {
            debug!("Consumed a CSRF token that was never saved");
        }
        self.enforce_capacity();
        Ok(())
    }
}
