//! # formguard CSRF tokens
//!
//! Single-use tokens for protecting server-rendered HTML forms against
//! Cross-Site Request Forgery.
//!
//! ## How it works
//!
//! - A page render asks a [`TokenStore`] for a fresh random token, saves it
//!   and embeds it in the page's forms (see the `formguard-html` crate).
//! - The form submission handler passes the submitted body to
//!   [`TokenStore::verify`]. The token must be known and unused; it is then
//!   consumed, so each token is accepted exactly once.
//! - Stores keep at most [`max_tokens`](TokenStore::max_tokens) tokens. Once
//!   full, the oldest issued token is forgotten, which means a page left open
//!   long enough will fail with [`CsrfError::TokenInvalid`] on submit.
//!
//! ## Backends
//!
//! - [`ArrayTokenStore`] keeps tokens in memory, owned by the value itself.
//! - `SessionTokenStore` keeps tokens in the user's session through any
//!   `formguard_session::SessionStore`. Enabled by the default `session`
//!   feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formguard_csrf::{SessionTokenStore, TokenStore, TOKEN_NAME};
//! use formguard_session::Session;
//! use std::collections::HashMap;
//! use std::time::Duration;
//!
//! let mut session = Session::generate(Duration::from_secs(3600));
//!
//! // Rendering the form.
//! let token = {
//!     let mut store = SessionTokenStore::new(&mut session);
//!     let token = store.generate_new_token();
//!     store.save_token(&token).unwrap();
//!     token
//! };
//!
//! // Handling the submission in a later request.
//! let mut body = HashMap::new();
//! body.insert("title".to_string(), "Hello".to_string());
//! body.insert(TOKEN_NAME.to_string(), token);
//!
//! let mut store = SessionTokenStore::new(&mut session);
//! assert!(store.verify(&body).is_ok());
//! assert!(store.verify(&body).is_err());
//! ```
//!
//! ## Errors
//!
//! ```rust
//! use formguard_csrf::{ArrayTokenStore, CsrfError, TokenStore};
//!
//! let mut store = ArrayTokenStore::new();
//!
//! // Requests without form fields are not checked.
//! assert!(store.verify(&[] as &[(&str, &str)]).is_ok());
//!
//! // A form without a token is rejected with 403.
//! let err = store.verify(&[("other", "x")]).unwrap_err();
//! assert!(matches!(err, CsrfError::TokenMissing));
//! assert_eq!(err.status_code(), http::StatusCode::FORBIDDEN);
//! ```

pub mod array_store;
pub mod body;
pub mod config;
pub mod error;
#[cfg(feature = "session")]
pub mod session_store;
pub mod store;
pub mod token;

pub use array_store::ArrayTokenStore;
pub use body::{FormBody, FormFields, UrlEncoded};
pub use config::{DEFAULT_MAX_TOKENS, DEFAULT_TOKEN_LENGTH, TokenStoreConfig};
pub use error::{CsrfError, Result};
#[cfg(feature = "session")]
pub use session_store::{SESSION_KEY, SessionTokenStore};
pub use store::{TOKEN_NAME, TokenStore};
pub use token::{TokenCollection, TokenRecord, TokenState, generate_token};
