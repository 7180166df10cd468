//! User profile payloads.
//!
//! The session core persists and returns profiles as opaque values; only
//! the UI layer looks inside the role-specific blocks.

use serde::{Deserialize, Serialize};

/// Fields shared by every role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileBase {
    /// Principal ID from the backend
    pub id: String,
    /// Login email
    pub email: String,
    /// Display name, if the account has one
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Denormalized profile of the authenticated principal, tagged by role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserProfile {
    Admin {
        #[serde(flatten)]
        base: ProfileBase,
        /// Permission grants for the console
        #[serde(default)]
        permissions: Vec<String>,
    },
    Vendor {
        #[serde(flatten)]
        base: ProfileBase,
        #[serde(default)]
        store_name: Option<String>,
        /// Whether the vendor passed marketplace review
        #[serde(default)]
        approved: bool,
    },
    Customer {
        #[serde(flatten)]
        base: ProfileBase,
        #[serde(default)]
        subscription_tier: Option<String>,
    },
}

impl UserProfile {
    /// The common base block.
    pub fn base(&self) -> &ProfileBase {
        match self {
            UserProfile::Admin { base, .. } => base,
            UserProfile::Vendor { base, .. } => base,
            UserProfile::Customer { base, .. } => base,
        }
    }

    /// The role tag as serialized on the wire.
    pub fn role(&self) -> &'static str {
        match self {
            UserProfile::Admin { .. } => "admin",
            UserProfile::Vendor { .. } => "vendor",
            UserProfile::Customer { .. } => "customer",
        }
    }
}
