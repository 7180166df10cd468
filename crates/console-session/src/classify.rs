//! Request outcome classification.
//!
//! Classification happens once, at the boundary where a protected call's
//! result is first observed. Only auth-fatal outcomes end the session;
//! everything else is surfaced to the caller with the session untouched.

use crate::ApiError;

/// Error payload codes that signal a dead credential regardless of status.
const AUTH_FATAL_CODES: [&str; 4] = [
    "token_expired",
    "token_invalid",
    "token_missing",
    "session_revoked",
];

/// How a failed protected call affects the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The credential itself was rejected; the session must end
    AuthFatal,
    /// Business or connectivity failure; the session is untouched
    Transient,
}

/// Classify a transport failure.
///
/// Unauthorized/forbidden statuses and credential-shaped payload codes are
/// auth-fatal. Not-found, server errors, validation errors, connectivity
/// loss, and timeouts leave the session alone.
pub fn classify(error: &ApiError) -> FailureClass {
    match error {
        ApiError::Status {
            status: 401 | 403, ..
        } => FailureClass::AuthFatal,
        ApiError::Status {
            code: Some(code), ..
        } if AUTH_FATAL_CODES.contains(&code.as_str()) => FailureClass::AuthFatal,
        _ => FailureClass::Transient,
    }
}

impl ApiError {
    /// True when this failure terminates the session.
    pub fn is_auth_fatal(&self) -> bool {
        classify(self) == FailureClass::AuthFatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(status: u16, code: Option<&str>) -> ApiError {
        ApiError::Status {
            status,
            code: code.map(String::from),
            message: "test".to_string(),
        }
    }

    #[test]
    fn test_unauthorized_is_auth_fatal() {
        assert_eq!(classify(&status(401, None)), FailureClass::AuthFatal);
        assert_eq!(classify(&status(403, None)), FailureClass::AuthFatal);
    }

    #[test]
    fn test_credential_payload_codes_are_auth_fatal() {
        // Some gateways surface credential rejection with a 400 and a code.
        assert_eq!(
            classify(&status(400, Some("token_expired"))),
            FailureClass::AuthFatal
        );
        assert_eq!(
            classify(&status(400, Some("session_revoked"))),
            FailureClass::AuthFatal
        );
    }

    #[test]
    fn test_business_failures_are_transient() {
        assert_eq!(classify(&status(404, None)), FailureClass::Transient);
        assert_eq!(
            classify(&status(422, Some("validation_failed"))),
            FailureClass::Transient
        );
        assert_eq!(classify(&status(500, None)), FailureClass::Transient);
    }

    #[test]
    fn test_connectivity_failures_are_transient() {
        assert_eq!(
            classify(&ApiError::Network("connection reset".to_string())),
            FailureClass::Transient
        );
        assert_eq!(classify(&ApiError::Timeout), FailureClass::Transient);
        assert_eq!(
            classify(&ApiError::Payload("truncated body".to_string())),
            FailureClass::Transient
        );
    }
}
