//! Session storage for formguard.
//!
//! Token stores that must survive across requests keep their state in the
//! user's session. This crate defines the narrow interface they need from a
//! session, [`SessionStore`], and an in-memory [`Session`] that implements it.
//!
//! Any framework session can be plugged in by implementing [`SessionStore`]
//! for it: values are plain [`serde_json::Value`]s read and written under a
//! string key.
//!
//! # Examples
//!
//! ```
//! use formguard_session::*;
//! use std::time::Duration;
//!
//! let mut session = Session::generate(Duration::from_secs(3600));
//!
//! session.set("username", "alice")?;
//! assert_eq!(session.get::<String>("username").as_deref(), Some("alice"));
//!
//! session.set_value("visits", serde_json::json!(3))?;
//! assert_eq!(session.get_value("visits")?, Some(serde_json::json!(3)));
//! # Ok::<(), SessionError>(())
//! ```

pub mod error;
pub mod traits;

pub use error::{SessionError, SessionResult};
pub use traits::{Session, SessionStore, generate_session_id};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{SessionError, SessionResult};
    pub use crate::traits::{Session, SessionStore, generate_session_id};
}
