//! Storage key constants.

/// Storage keys used by the console client
pub struct StorageKeys;

impl StorageKeys {
    /// Bearer credential for the authenticated principal
    pub const CREDENTIAL: &'static str = "console_credential";

    /// Serialized user profile (JSON)
    pub const PROFILE: &'static str = "console_profile";
}
