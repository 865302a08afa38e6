//! Error types shared across the lingbot crates.
//!
//! `ServiceError` lives here rather than in `lingbot-services` so callers
//! can downcast and classify remote failures without string matching.

use std::path::PathBuf;

use thiserror::Error;

/// A mistake schedule that cannot be used. Raised at configuration load
/// time; the engine never runs with an unusable schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("risk percentage at row {row}, column {col} is {risk}, expected 1-100")]
    RiskOutOfRange { row: usize, col: usize, risk: u8 },
}

/// Failure to persist or restore word progress. Fatal at session end:
/// silently losing progress would corrupt future-session behavior.
#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur when talking to the remote learning service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The credentials were rejected or the login page did not come back.
    #[error("login failed: {0}")]
    LoginFailed(String),

    /// A call that requires a session was made before logging in.
    #[error("not logged in")]
    NotLoggedIn,

    /// The service returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered with something the client cannot interpret.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
