// formguard - single-use CSRF tokens for server-rendered forms
//
// The core lives in formguard-csrf. Session storage and HTML injection are
// optional and enabled by default.

// Re-export core functionality
pub use formguard_csrf::*;

// Re-export optional crates
#[cfg(feature = "session")]
pub use formguard_session;

#[cfg(feature = "html")]
pub use formguard_html;

#[cfg(feature = "session")]
pub use formguard_session::{Session, SessionError, SessionStore};

#[cfg(feature = "html")]
pub use formguard_html::{
    Document, HtmlDocument, HtmlDocumentProtector, HtmlError, ProtectError, TokenSharing,
};

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        ArrayTokenStore, CsrfError, FormBody, TOKEN_NAME, TokenStore, TokenStoreConfig,
        UrlEncoded,
    };

    #[cfg(feature = "session")]
    pub use crate::{Session, SessionStore, SessionTokenStore};

    #[cfg(feature = "html")]
    pub use crate::{Document, HtmlDocument, HtmlDocumentProtector, TokenSharing};
}
