//! Credential introspection.
//!
//! Pure helpers that read the expiry a bearer token carries in its payload
//! segment. Nothing here verifies signatures; the backend owns that. A
//! credential that cannot be decoded counts as expired (fail closed).

use crate::SessionError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use console_storage::Credential;
use serde::Deserialize;

/// Credentials inside this window are refreshed even though they are still
/// technically valid, so they cannot expire mid-flight of the request they
/// are about to authorize.
pub const REFRESH_HORIZON_SECS: i64 = 300;

#[derive(Deserialize)]
struct ExpiryClaims {
    exp: i64,
}

/// Decode the expiry timestamp (seconds since epoch) embedded in the
/// credential's payload segment.
pub fn decode_expiry(credential: &Credential) -> Result<i64, SessionError> {
    let payload = credential
        .as_str()
        .split('.')
        .nth(1)
        .ok_or_else(|| SessionError::MalformedCredential("missing payload segment".to_string()))?;

    let bytes = URL_SAFE_NO_PAD.decode(payload).map_err(|e| {
        SessionError::MalformedCredential(format!("payload segment is not base64url: {}", e))
    })?;

    let claims: ExpiryClaims = serde_json::from_slice(&bytes).map_err(|e| {
        SessionError::MalformedCredential(format!("payload lacks a decodable exp claim: {}", e))
    })?;

    Ok(claims.exp)
}

/// True when the credential's expiry has passed.
pub fn is_expired(credential: &Credential, now: i64) -> bool {
    match decode_expiry(credential) {
        Ok(expiry) => expiry <= now,
        Err(_) => true,
    }
}

/// True when the credential expires within the given horizon.
pub fn expiring_within(credential: &Credential, now: i64, horizon_secs: i64) -> bool {
    match decode_expiry(credential) {
        Ok(expiry) => expiry - now < horizon_secs,
        Err(_) => true,
    }
}

/// True when the credential must be refreshed before use.
pub fn needs_refresh(credential: &Credential, now: i64) -> bool {
    expiring_within(credential, now, REFRESH_HORIZON_SECS)
}
