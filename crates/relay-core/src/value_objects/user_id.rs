//! User identity - the stable key clients declare when they connect

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque user identity
///
/// Issued by the authentication service; the relay only compares and stores it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Build a `UserId` from a handshake value, treating blank input as absent
    pub fn from_handshake(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
