//! Request body adapters.
//!
//! [`TokenStore::verify`](crate::TokenStore::verify) accepts anything that can
//! present itself as a flat set of form fields. Framework request types join
//! in by implementing [`FormBody`].

use crate::error::{CsrfError, Result};
use std::collections::{BTreeMap, HashMap};

/// Flat field name to value mapping of a submitted form.
pub type FormFields = HashMap<String, String>;

/// A submitted request body that can be viewed as form fields.
pub trait FormBody {
    /// Convert the body into its fields.
    ///
    /// An empty map means the request carried no form submission at all.
    fn form_fields(&self) -> Result<FormFields>;
}

impl<T: FormBody + ?Sized> FormBody for &T {
    fn form_fields(&self) -> Result<FormFields> {
        (**self).form_fields()
    }
}

impl FormBody for HashMap<String, String> {
    fn form_fields(&self) -> Result<FormFields> {
        Ok(self.clone())
    }
}

impl FormBody for BTreeMap<String, String> {
    fn form_fields(&self) -> Result<FormFields> {
        Ok(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl FormBody for Vec<(String, String)> {
    fn form_fields(&self) -> Result<FormFields> {
        self.as_slice().form_fields()
    }
}

impl FormBody for [(String, String)] {
    fn form_fields(&self) -> Result<FormFields> {
        Ok(self.iter().cloned().collect())
    }
}

impl FormBody for [(&str, &str)] {
    fn form_fields(&self) -> Result<FormFields> {
        Ok(self
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect())
    }
}

impl<const N: usize> FormBody for [(&str, &str); N] {
    fn form_fields(&self) -> Result<FormFields> {
        self.as_slice().form_fields()
    }
}

/// JSON bodies must be objects (or `null`, treated as no submission).
impl FormBody for serde_json::Value {
    fn form_fields(&self) -> Result<FormFields> {
        match self {
            serde_json::Value::Null => Ok(FormFields::new()),
            serde_json::Value::Object(map) => Ok(map
                .iter()
                .map(|(key, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (key.clone(), value)
                })
                .collect()),
            other => Err(CsrfError::InvalidRequestBody(format!(
                "expected a JSON object, got {}",
                json_kind(other)
            ))),
        }
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// An `application/x-www-form-urlencoded` request body.
#[derive(Debug, Clone, Copy)]
pub struct UrlEncoded<'a>(pub &'a [u8]);

impl<'a> UrlEncoded<'a> {
    pub fn new(body: &'a [u8]) -> Self {
        Self(body)
    }
}

impl FormBody for UrlEncoded<'_> {
    fn form_fields(&self) -> Result<FormFields> {
        serde_urlencoded::from_bytes::<Vec<(String, String)>>(self.0)
            .map(|pairs| pairs.into_iter().collect())
            .map_err(|e| CsrfError::InvalidRequestBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pairs() {
        let fields = [("a", "1"), ("b", "2")].form_fields().unwrap();
        assert_eq!(fields.get("a").map(String::as_str), Some("1"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_json_object() {
        let fields = json!({"csrf-token": "abc", "count": 3, "ok": true})
            .form_fields()
            .unwrap();

        assert_eq!(fields["csrf-token"], "abc");
        assert_eq!(fields["count"], "3");
        assert_eq!(fields["ok"], "true");
    }

    #[test]
    fn test_json_null_is_empty() {
        assert!(serde_json::Value::Null.form_fields().unwrap().is_empty());
    }

    #[test]
    fn test_json_non_object_is_rejected() {
        let err = json!(["csrf-token"]).form_fields().unwrap_err();
        assert!(matches!(err, CsrfError::InvalidRequestBody(msg) if msg.contains("array")));
    }

    #[test]
    fn test_url_encoded() {
        let fields = UrlEncoded::new(b"name=Jane+Doe&csrf-token=f00d")
            .form_fields()
            .unwrap();

        assert_eq!(fields["name"], "Jane Doe");
        assert_eq!(fields["csrf-token"], "f00d");
    }

    #[test]
    fn test_url_encoded_empty() {
        assert!(UrlEncoded::new(b"").form_fields().unwrap().is_empty());
    }
}
