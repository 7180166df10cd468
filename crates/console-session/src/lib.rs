//! Session and token-refresh core for the admin console client.
//!
//! This crate provides:
//! - Pure credential introspection (embedded expiry decoding)
//! - A single-flight refresh coordinator shared by all protected calls
//! - Startup session restore with degraded-mode handling
//! - Classification of failures into auth-fatal vs transient
//! - A `SessionManager` facade the UI layer drives for every protected call

mod bootstrap;
mod classify;
mod config;
mod coordinator;
mod error;
mod http;
mod session;
pub mod token;
mod transport;

#[cfg(test)]
mod testutil;

pub use bootstrap::restore_machine;
pub use bootstrap::{RestoreInput, RestoreMachine, RestoreOutcome, RestoreState};
pub use classify::{classify, FailureClass};
pub use config::{ApiConfig, RetryPolicy};
pub use coordinator::RefreshCoordinator;
pub use error::{ApiError, SessionError, SessionResult};
pub use http::HttpTransport;
pub use session::{SessionEvent, SessionEventCallback, SessionManager, SessionSnapshot};
pub use transport::{AuthTransport, LoginCredentials, LoginGrant};
