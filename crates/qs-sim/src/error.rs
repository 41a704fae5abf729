use qs_core::QsError;
use qs_service::ServiceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] QsError),

    #[error("{what} length {got} does not match server count {expected}")]
    ServerCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[cfg(feature = "parallel")]
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

pub type SimResult<T> = Result<T, SimError>;
