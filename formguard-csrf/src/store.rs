use crate::body::FormBody;
use crate::config::TokenStoreConfig;
use crate::error::{CsrfError, Result};
use crate::token::generate_token;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

/// Name of the hidden form field and head meta tag that carry the token.
pub const TOKEN_NAME: &str = "csrf-token";

/// Storage and lifecycle of single-use CSRF tokens.
///
/// A token moves through `unknown -> valid -> spent`. It becomes valid when
/// saved, spent when consumed, and unknown again only when it is evicted to
/// keep the store within [`max_tokens`](TokenStore::max_tokens).
///
/// Backends implement the three storage operations; token generation and
/// request verification are shared.
///
/// # Examples
///
/// ```
/// use formguard_csrf::{ArrayTokenStore, CsrfError, TokenStore, TOKEN_NAME};
///
/// let mut store = ArrayTokenStore::new();
/// let token = store.generate_new_token();
/// store.save_token(&token)?;
///
/// // The first submission carrying the token is accepted and burns it.
/// store.verify(&[("comment", "hi"), (TOKEN_NAME, token.as_str())])?;
///
/// // Replaying the same form is rejected.
/// let replay = store.verify(&[("comment", "hi"), (TOKEN_NAME, token.as_str())]);
/// assert!(matches!(replay, Err(CsrfError::TokenSpent { .. })));
/// # Ok::<(), CsrfError>(())
/// ```
pub trait TokenStore {
    fn config(&self) -> &TokenStoreConfig;

    fn config_mut(&mut self) -> &mut TokenStoreConfig;

    /// Save a token as valid for later verification.
    ///
    /// Saving beyond capacity evicts the oldest tokens. Saving a token that is
    /// already held makes it valid again without moving it.
    fn save_token(&mut self, token: &str) -> Result<()>;

    /// Check that the token exists and has not been consumed.
    ///
    /// Fails with [`CsrfError::TokenInvalid`] for unknown tokens and with
    /// [`CsrfError::TokenSpent`] for consumed ones. Never modifies the store.
    fn verify_token(&self, token: &str) -> Result<()>;

    /// Mark a token as used at `at`.
    ///
    /// No existence check is made: an unknown token is recorded as spent.
    fn consume_token_at(&mut self, token: &str, at: DateTime<Utc>) -> Result<()>;

    /// Mark a token as used now.
    fn consume_token(&mut self, token: &str) -> Result<()> {
        self.consume_token_at(token, Utc::now())
    }

    fn max_tokens(&self) -> usize {
        self.config().max_tokens
    }

    fn token_length(&self) -> usize {
        self.config().token_length
    }

    /// Generate tokens of a different length from now on.
    ///
    /// A length of zero would produce the empty token and is rejected.
    fn set_token_length(&mut self, token_length: usize) -> Result<()> {
        if token_length == 0 {
            return Err(CsrfError::Config(
                "token_length must be at least 1".to_string(),
            ));
        }
        self.config_mut().token_length = token_length;
        Ok(())
    }

    /// Generate a new random token. The token is NOT saved.
    fn generate_new_token(&self) -> String {
        generate_token(self.token_length())
    }

    /// Check a submitted request body and consume its token.
    ///
    /// A body without any fields is not a form submission and passes
    /// untouched. Otherwise the body must carry a [`TOKEN_NAME`] field whose
    /// value verifies; that token is then consumed so it cannot be replayed.
    fn verify<B>(&mut self, body: &B) -> Result<()>
    where
        B: FormBody + ?Sized,
        Self: Sized,
    {
        let fields = body.form_fields()?;
        if fields.is_empty() {
            return Ok(());
        }

        let Some(token) = fields.get(TOKEN_NAME) else {
            warn!(fields = fields.len(), "Rejected submission: CSRF token missing");
            return Err(CsrfError::TokenMissing);
        };

        if let Err(err) = self.verify_token(token) {
            let reason = match &err {
                CsrfError::TokenInvalid { .. } => "unknown token",
                CsrfError::TokenSpent { .. } => "token already spent",
                _ => "store failure",
            };
            warn!(reason, "Rejected submission");
            return Err(err);
        }

        self.consume_token(token)?;
        debug!("Accepted submission");
        Ok(())
    }
}

impl<T: TokenStore + ?Sized> TokenStore for &mut T {
    fn config(&self) -> &TokenStoreConfig {
        (**self).config()
    }

    fn config_mut(&mut self) -> &mut TokenStoreConfig {
        (**self).config_mut()
    }

    fn save_token(&mut self, token: &str) -> Result<()> {
        (**self).save_token(token)
    }

    fn verify_token(&self, token: &str) -> Result<()> {
        (**self).verify_token(token)
    }

    fn consume_token_at(&mut self, token: &str, at: DateTime<Utc>) -> Result<()> {
        (**self).consume_token_at(token, at)
    }
}
