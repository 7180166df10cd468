//! Bearer credential newtype.

use serde::{Deserialize, Serialize};

/// Opaque bearer token for the authenticated principal.
///
/// The token carries its own expiry in its payload segment; the session
/// crate's introspection helpers decode it. A credential is immutable once
/// issued; refreshing produces a new one that replaces this one in the
/// vault.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw bearer token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string, as sent in the `Authorization` header.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the credential and return the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

// Debug elides the token body so credentials never land in logs verbatim.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(len={})", self.0.len())
    }
}
