use crate::config::TokenStoreConfig;
use crate::error::{CsrfError, Result};
use crate::store::TokenStore;
use crate::token::{TokenCollection, TokenState};
use chrono::{DateTime, Utc};
use formguard_session::{SessionError, SessionStore};
use tracing::{debug, trace};

/// Session key under which the token collection is kept.
pub const SESSION_KEY: &str = "tokenList";

/// Token store that keeps its tokens in the user's session.
///
/// Every operation reads the whole collection from the session, applies the
/// change in memory and writes the whole collection back. There is no locking
/// around that read-modify-write: two requests of the same session running at
/// the same time can both start from the same snapshot, in which case the
/// later write discards the earlier one's saves and consumptions.
#[derive(Debug)]
pub struct SessionTokenStore<S> {
    session: S,
    config: TokenStoreConfig,
}

impl<S: SessionStore> SessionTokenStore<S> {
    /// Create a store over `session` with the default capacity of 1000 tokens
    pub fn new(session: S) -> Self {
        Self {
            session,
            config: TokenStoreConfig::default(),
        }
    }

    /// Create a store over `session` that retains at most `max_tokens` tokens
    pub fn with_max_tokens(session: S, max_tokens: usize) -> Result<Self> {
        Self::with_config(session, TokenStoreConfig::default().with_max_tokens(max_tokens))
    }

    /// Create a store over `session` from a validated configuration.
    pub fn with_config(session: S, config: TokenStoreConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { session, config })
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn into_inner(self) -> S {
        self.session
    }

    /// Read the current collection from the session.
    pub fn load(&self) -> Result<TokenCollection> {
        match self.session.get_value(SESSION_KEY)? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| CsrfError::Session(SessionError::Deserialization(e.to_string()))),
            None => Ok(TokenCollection::new()),
        }
    }

    fn store(&mut self, tokens: &TokenCollection) -> Result<()> {
        let value = serde_json::to_value(tokens)
            .map_err(|e| CsrfError::Session(SessionError::Serialization(e.to_string())))?;
        self.session.set_value(SESSION_KEY, value)?;
        Ok(())
    }

    fn update(&mut self, change: impl FnOnce(&mut TokenCollection)) -> Result<()> {
        let mut tokens = self.load()?;
        change(&mut tokens);

        let evicted = tokens.evict_to(self.config.max_tokens);
        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                max_tokens = self.config.max_tokens,
                "Evicted oldest CSRF tokens from session"
            );
        }

        self.store(&tokens)
    }
}

impl<S: SessionStore> TokenStore for SessionTokenStore<S> {
    fn config(&self) -> &TokenStoreConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut TokenStoreConfig {
        &mut self.config
    }

    fn save_token(&mut self, token: &str) -> Result<()> {
        self.update(|tokens| {
            let inserted = tokens.insert_valid(token);
            trace!(inserted, stored = tokens.len(), "Saved CSRF token to session");
        })
    }

    fn verify_token(&self, token: &str) -> Result<()> {
        match self.load()?.state(token) {
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
        self.update(|tokens| {
            if !tokens.mark_consumed(token, at) {
                debug!("Consumed a CSRF token that was never saved");
            }
        })
    }
}
