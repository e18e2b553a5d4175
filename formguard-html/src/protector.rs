//! Token injection into rendered pages.

use crate::document::Document;
use crate::dom::HtmlDocument;
use crate::error::{ProtectError, Result};
use formguard_csrf::{TOKEN_NAME, TokenStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// How tokens are shared between the forms of one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenSharing {
    /// One token for every form and the meta tag.
    #[default]
    Page,
    /// A fresh token for each form, so forms submitted without a page
    /// reload do not burn each other's tokens.
    Form,
}

impl TokenSharing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Page => "PAGE",
            Self::Form => "FORM",
        }
    }
}

impl fmt::Display for TokenSharing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenSharing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("page") {
            Ok(Self::Page)
        } else if s.eq_ignore_ascii_case("form") {
            Ok(Self::Form)
        } else {
            Err(format!("Unknown token sharing mode: {s}"))
        }
    }
}

/// Injects CSRF tokens into the POST forms and head of a document.
///
/// Every token the protector hands out is saved in the token store first,
/// so it verifies when the form comes back.
///
/// # Examples
///
/// ```
/// use formguard_csrf::ArrayTokenStore;
/// use formguard_html::{Document, HtmlDocumentProtector, TokenSharing};
///
/// let mut store = ArrayTokenStore::new();
/// let html = r#"<form method="post"><button>Send</button></form>"#;
///
/// let mut protector = HtmlDocumentProtector::from_html(html, &mut store);
/// protector.protect_and_inject(TokenSharing::Page)?;
/// let document = protector.into_document();
///
/// let input = document.query_selector("form input[name=csrf-token]")?.unwrap();
/// let meta = document.query_selector("head meta[name=csrf-token]")?.unwrap();
/// assert_eq!(
///     document.get_attribute(input, "value"),
///     document.get_attribute(meta, "content"),
/// );
/// assert_eq!(store.len(), 1);
/// # Ok::<(), formguard_html::ProtectError>(())
/// ```
pub struct HtmlDocumentProtector<'a, D, S: ?Sized> {
    document: D,
    token_store: &'a mut S,
}

impl<'a, D, S> HtmlDocumentProtector<'a, D, S>
where
    D: Document,
    S: TokenStore + ?Sized,
{
    pub fn new(document: D, token_store: &'a mut S) -> Self {
        Self {
            document,
            token_store,
        }
    }

    /// Inject a hidden token field into every POST form and publish the
    /// active token in `<head><meta name="csrf-token">`.
    ///
    /// A token is issued even for pages without forms, for use by scripts
    /// reading the meta tag.
    pub fn protect_and_inject(&mut self, sharing: TokenSharing) -> Result<()> {
        let mut token = self.issue_token()?;
        let mut injected = 0usize;

        for form in self.document.forms()? {
            let is_post = self
                .document
                .get_attribute(form, "method")
                .is_some_and(|method| method.eq_ignore_ascii_case("post"));
            if !is_post {
                continue;
            }

            let input = self.document.create_element("input");
            self.document.set_attribute(input, "name", TOKEN_NAME);
            self.document.set_attribute(input, "value", &token);
            self.document.set_attribute(input, "type", "hidden");
            self.document.insert_child(form, input, 0);
            injected += 1;

            if sharing == TokenSharing::Form {
                token = self.issue_token()?;
            }
        }

        let meta = self.token_meta()?;
        self.document.set_attribute(meta, "content", &token);

        debug!(forms = injected, sharing = %sharing, "Injected CSRF tokens");
        Ok(())
    }

    pub fn html_document(&self) -> &D {
        &self.document
    }

    pub fn into_document(self) -> D {
        self.document
    }

    fn issue_token(&mut self) -> Result<String> {
        let token = self.token_store.generate_new_token();
        self.token_store.save_token(&token)?;
        Ok(token)
    }

    /// Find the token meta tag, creating it (and `<head>`) when absent.
    fn token_meta(&mut self) -> Result<D::Element> {
        let selector = format!("head meta[name='{TOKEN_NAME}']");
        if let Some(meta) = self.document.query_selector(&selector)? {
            return Ok(meta);
        }

        let head = match self.document.query_selector("head")? {
            Some(head) => head,
            None => {
                let html = self
                    .document
                    .query_selector("html")?
                    .ok_or(ProtectError::MissingHtmlElement)?;
                let head = self.document.create_element("head");
                self.document.insert_child(html, head, 0);
                head
            }
        };

        let meta = self.document.create_element("meta");
        self.document.set_attribute(meta, "name", TOKEN_NAME);
        self.document.append_child(head, meta);
        Ok(meta)
    }
}

impl<'a, S> HtmlDocumentProtector<'a, HtmlDocument, S>
where
    S: TokenStore + ?Sized,
{
    /// Parse `html` and protect the resulting [`HtmlDocument`].
    pub fn from_html(html: &str, token_store: &'a mut S) -> Self {
        Self::new(HtmlDocument::parse(html), token_store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formguard_csrf::{ArrayTokenStore, CsrfError};

    fn protect(html: &str, sharing: TokenSharing) -> (HtmlDocument, ArrayTokenStore) {
        let mut store = ArrayTokenStore::new();
        let mut document = HtmlDocument::parse(html);
        HtmlDocumentProtector::new(&mut document, &mut store)
            .protect_and_inject(sharing)
            .unwrap();
        (document, store)
    }

    fn attribute_values(document: &HtmlDocument, selector: &str, name: &str) -> Vec<String> {
        document
            .query_selector_all(selector)
            .unwrap()
            .into_iter()
            .filter_map(|el| document.get_attribute(el, name).map(str::to_string))
            .collect()
    }

    #[test]
    fn test_sharing_parse() {
        assert_eq!("PAGE".parse::<TokenSharing>().unwrap(), TokenSharing::Page);
        assert_eq!("form".parse::<TokenSharing>().unwrap(), TokenSharing::Form);
        assert!("SITE".parse::<TokenSharing>().is_err());
        assert_eq!(TokenSharing::default(), TokenSharing::Page);
        assert_eq!(TokenSharing::Form.to_string(), "FORM");
    }

    #[test]
    fn test_no_forms_still_issues_token() {
        let (document, store) = protect("<p>nothing here</p>", TokenSharing::Page);

        let metas = attribute_values(&document, "meta[name=csrf-token]", "content");
        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].len(), 32);
        assert!(document.forms().unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_hidden_input_is_first_child() {
        let (document, _) = protect(
            "<form method='POST'><input name='title'></form>",
            TokenSharing::Page,
        );

        let form = document.forms().unwrap()[0];
        let first = document.children(form)[0];
        assert_eq!(document.get_attribute(first, "name"), Some(TOKEN_NAME));
        assert_eq!(document.get_attribute(first, "type"), Some("hidden"));
    }

    #[test]
    fn test_forms_without_post_method_are_skipped() {
        let (document, _) = protect(
            "<form><input name=q></form><form method=get></form><form method=dialog></form>",
            TokenSharing::Page,
        );
        assert!(
            document
                .query_selector_all("input[name=csrf-token]")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_form_mode_saves_every_token() {
        let (document, store) = protect(
            "<form method=post></form><form method=post></form>",
            TokenSharing::Form,
        );

        let mut tokens = attribute_values(&document, "input[name=csrf-token]", "value");
        tokens.extend(attribute_values(&document, "meta[name=csrf-token]", "content"));

        assert_eq!(tokens.len(), 3);
        assert_eq!(store.len(), 3);
        for token in &tokens {
            assert!(store.verify_token(token).is_ok());
        }
    }

    #[test]
    fn test_existing_meta_is_overwritten() {
        let (document, _) = protect(
            "<head><meta name='csrf-token' content='stale'></head>",
            TokenSharing::Page,
        );

        let metas = attribute_values(&document, "meta[name=csrf-token]", "content");
        assert_eq!(metas.len(), 1);
        assert_ne!(metas[0], "stale");
    }

    #[test]
    fn test_from_html() {
        let mut store = ArrayTokenStore::new();
        let mut protector =
            HtmlDocumentProtector::from_html("<form method=post></form>", &mut store);
        protector.protect_and_inject(TokenSharing::Page).unwrap();

        let document = protector.into_document();
        let values = attribute_values(&document, "form > input[type=hidden]", "value");
        assert_eq!(
            values,
            attribute_values(&document, "head > meta[name=csrf-token]", "content")
        );
        assert!(store.verify_token(&values[0]).is_ok());
    }

    #[test]
    fn test_head_created_when_missing() {
        let mut store = ArrayTokenStore::new();
        let mut protector = HtmlDocumentProtector::new(HtmlDocument::new(), &mut store);
        protector.protect_and_inject(TokenSharing::Page).unwrap();

        let document = protector.html_document();
        let html = document.root_element().unwrap();
        let head = document.children(html)[0];
        assert_eq!(document.element_name(head), Some("head"));
        assert!(
            document
                .query_selector("head meta[name=csrf-token]")
                .unwrap()
                .is_some()
        );
    }

    #[derive(Default)]
    struct FailingStore {
        config: formguard_csrf::TokenStoreConfig,
    }

    impl TokenStore for FailingStore {
        fn config(&self) -> &formguard_csrf::TokenStoreConfig {
            &self.config
        }

        fn config_mut(&mut self) -> &mut formguard_csrf::TokenStoreConfig {
            &mut self.config
        }

        fn save_token(&mut self, _token: &str) -> formguard_csrf::Result<()> {
            Err(CsrfError::Config("read only".into()))
        }

        fn verify_token(&self, token: &str) -> formguard_csrf::Result<()> {
            Err(CsrfError::TokenInvalid {
                token: token.to_string(),
            })
        }

        fn consume_token_at(
            &mut self,
            _token: &str,
            _at: chrono::DateTime<chrono::Utc>,
        ) -> formguard_csrf::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_store_failure_leaves_document_untouched() {
        let mut store = FailingStore::default();
        let mut document = HtmlDocument::parse("<form method=post></form>");
        let before = document.to_html();

        let result =
            HtmlDocumentProtector::new(&mut document, &mut store).protect_and_inject(TokenSharing::Page);

        assert!(matches!(result, Err(ProtectError::Csrf(CsrfError::Config(_)))));
        assert_eq!(document.to_html(), before);
    }

    #[test]
    fn test_dyn_token_store() {
        let mut store = ArrayTokenStore::new();
        let store: &mut dyn TokenStore = &mut store;
        let mut document = HtmlDocument::parse("<form method=post></form>");

        HtmlDocumentProtector::new(&mut document, store)
            .protect_and_inject(TokenSharing::Form)
            .unwrap();

        assert_eq!(
            attribute_values(&document, "form input", "type"),
            vec!["hidden".to_string()]
        );
    }
}
