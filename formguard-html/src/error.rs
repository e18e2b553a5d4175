use formguard_csrf::CsrfError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HtmlError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

impl HtmlError {
    pub(crate) fn selector(selector: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProtectError {
    #[error(transparent)]
    Csrf(#[from] CsrfError),

    #[error(transparent)]
    Html(#[from] HtmlError),

    /// The document has no `<html>` element to hold a new `<head>`.
    #[error("Document has no <html> element")]
    MissingHtmlElement,
}

pub type Result<T, E = ProtectError> = std::result::Result<T, E>;
