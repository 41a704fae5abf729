//! Configuration and framework error type.
//!
//! Downstream crates wrap `QsError` as one variant of their own error enums
//! (see `qs_sim::SimError`).

use thiserror::Error;

/// The top-level error type for `qs-core`.
#[derive(Debug, Error)]
pub enum QsError {
    #[error("{what} must be {expected}, got {value}")]
    InvalidRate {
        what:     &'static str,
        expected: &'static str,
        value:    f64,
    },

    #[error("server count must be at least 1")]
    NoServers,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `qs-core`.
pub type QsResult<T> = Result<T, QsError>;
