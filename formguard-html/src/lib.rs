//! # formguard HTML injection
//!
//! Puts CSRF tokens from a [`TokenStore`](formguard_csrf::TokenStore) into
//! server-rendered pages:
//!
//! - every `<form method="post">` gets a hidden `csrf-token` input as its
//!   first child;
//! - `<head>` gets a `<meta name="csrf-token">` holding the active token, for
//!   scripts that submit forms asynchronously.
//!
//! Other form methods are left alone.
//!
//! ## Example
//!
//! ```rust
//! use formguard_csrf::ArrayTokenStore;
//! use formguard_html::{HtmlDocument, HtmlDocumentProtector, TokenSharing};
//!
//! let mut store = ArrayTokenStore::new();
//! let mut page = HtmlDocument::parse(
//!     r#"<form method="post"></form><form method="post"></form>"#,
//! );
//!
//! HtmlDocumentProtector::new(&mut page, &mut store).protect_and_inject(TokenSharing::Form)?;
//!
//! // One token per form plus the one in the meta tag.
//! assert_eq!(store.len(), 3);
//! println!("{page}");
//! # Ok::<(), formguard_html::ProtectError>(())
//! ```
//!
//! Any DOM can be protected by implementing [`Document`]; [`HtmlDocument`]
//! is the built-in one.

pub mod document;
pub mod dom;
pub mod error;
pub mod protector;

pub use document::Document;
pub use dom::{HtmlDocument, NodeId};
pub use error::{HtmlError, ProtectError, Result};
pub use formguard_csrf::TOKEN_NAME;
pub use protector::{HtmlDocumentProtector, TokenSharing};
