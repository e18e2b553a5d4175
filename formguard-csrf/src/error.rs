use chrono::{DateTime, Utc};
#[cfg(feature = "session")]
use formguard_session::SessionError;
use http::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    /// A form was submitted without a token field.
    #[error("CSRF token not found")]
    TokenMissing,

    /// The submitted token was never issued, has been evicted, or is wrong.
    #[error("CSRF token '{token}' does not exist")]
    TokenInvalid { token: String },

    /// The submitted token was issued but has already been used.
    #[error("CSRF token '{}' previously used at {}", .token, .consumed_at.to_rfc3339())]
    TokenSpent {
        token: String,
        consumed_at: DateTime<Utc>,
    },

    #[error("Invalid request body: {0}")]
    InvalidRequestBody(String),

    #[cfg(feature = "session")]
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CsrfError {
    /// HTTP status a handler should answer with when this error is returned.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CsrfError::TokenMissing
            | CsrfError::TokenInvalid { .. }
            | CsrfError::TokenSpent { .. }
            | CsrfError::InvalidRequestBody(_) => StatusCode::FORBIDDEN,
            #[cfg(feature = "session")]
            CsrfError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CsrfError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether this is a rejection of the submitted token itself.
    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            CsrfError::TokenMissing | CsrfError::TokenInvalid { .. } | CsrfError::TokenSpent { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CsrfError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_token_errors_are_forbidden() {
        let spent = CsrfError::TokenSpent {
            token: "abc".into(),
            consumed_at: Utc::now(),
        };

        for err in [
            CsrfError::TokenMissing,
            CsrfError::TokenInvalid { token: "abc".into() },
            spent,
        ] {
            assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
            assert!(err.is_token_error());
        }
    }

    #[cfg(feature = "session")]
    #[test]
    fn test_session_errors_are_internal() {
        let err = CsrfError::from(SessionError::Other("down".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_token_error());
    }

    #[test]
    fn test_infrastructure_errors() {
        let err = CsrfError::Config("token_length must be at least 1".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.is_token_error());

        let err = CsrfError::InvalidRequestBody("not an object".into());
        assert_eq!(err.status_code(), StatusCode::FORBIDDEN);
        assert!(!err.is_token_error());
    }

    #[test]
    fn test_spent_message_carries_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let err = CsrfError::TokenSpent {
            token: "abc".into(),
            consumed_at: at,
        };

        assert_eq!(
            err.to_string(),
            "CSRF token 'abc' previously used at 2024-05-01T12:30:00+00:00"
        );
    }
}
