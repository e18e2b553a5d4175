//! Session store trait and the in-memory session.

use crate::error::{SessionError, SessionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::trace;

/// Key-value storage scoped to a single user session.
///
/// This is the only view of a session that token stores need: a value is
/// read under a string key and the whole value is written back under the
/// same key. Implementations are free to persist the values anywhere.
///
/// # Examples
///
/// ```
/// use formguard_session::{Session, SessionStore};
/// use std::time::Duration;
///
/// let mut session = Session::new("abc", Duration::from_secs(60));
/// session.set_value("greeting", serde_json::json!("hello")).unwrap();
///
/// let value = session.get_value("greeting").unwrap();
/// assert_eq!(value, Some(serde_json::json!("hello")));
/// ```
pub trait SessionStore {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing has been stored under the key yet.
    fn get_value(&self, key: &str) -> SessionResult<Option<serde_json::Value>>;

    /// Store `value` under `key`, replacing whatever was there.
    fn set_value(&mut self, key: &str, value: serde_json::Value) -> SessionResult<()>;
}

impl<S: SessionStore + ?Sized> SessionStore for &mut S {
    fn get_value(&self, key: &str) -> SessionResult<Option<serde_json::Value>> {
        (**self).get_value(key)
    }

    fn set_value(&mut self, key: &str, value: serde_json::Value) -> SessionResult<()> {
        (**self).set_value(key, value)
    }
}

impl<S: SessionStore + ?Sized> SessionStore for Box<S> {
    fn get_value(&self, key: &str) -> SessionResult<Option<serde_json::Value>> {
        (**self).get_value(key)
    }

    fn set_value(&mut self, key: &str, value: serde_json::Value) -> SessionResult<()> {
        (**self).set_value(key, value)
    }
}

/// Session data structure.
///
/// Contains all session information including metadata and user data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier
    pub id: String,
    /// Session data as key-value pairs
    pub data: HashMap<String, serde_json::Value>,
    /// Session creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last access timestamp
    pub last_accessed_at: DateTime<Utc>,
    /// Session expiration timestamp
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a new session with the given ID and TTL.
    pub fn new(id: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            data: HashMap::new(),
            created_at: now,
            last_accessed_at: now,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()),
        }
    }

    /// Create a session with a freshly generated ID.
    pub fn generate(ttl: Duration) -> Self {
        Self::new(generate_session_id(), ttl)
    }

    /// Check if the session has expired.
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Get a typed value from the session data.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a typed value in the session data.
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> SessionResult<()> {
        let json_value =
            serde_json::to_value(value).map_err(|e| SessionError::Serialization(e.to_string()))?;
        self.data.insert(key.to_string(), json_value);
        Ok(())
    }

    /// Update the last accessed timestamp.
    pub fn touch(&mut self) {
        self.last_accessed_at = Utc::now();
    }

    fn ensure_live(&self) -> SessionResult<()> {
        if self.is_expired() {
            return Err(SessionError::Expired(self.id.clone()));
        }
        Ok(())
    }
}

impl SessionStore for Session {
    fn get_value(&self, key: &str) -> SessionResult<Option<serde_json::Value>> {
        self.ensure_live()?;
        trace!(session_id = %self.id, key = %key, "Session read");
        Ok(self.data.get(key).cloned())
    }

    fn set_value(&mut self, key: &str, value: serde_json::Value) -> SessionResult<()> {
        self.ensure_live()?;
        trace!(session_id = %self.id, key = %key, "Session write");
        self.data.insert(key.to_string(), value);
        self.touch();
        Ok(())
    }
}

/// Generate a new unique session ID.
pub fn generate_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
