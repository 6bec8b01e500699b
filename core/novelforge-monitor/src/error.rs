//! Error types for security monitoring.

use novelforge_storage::StorageError;
use novelforge_types::AccessDenied;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("security event not found")]
    EventNotFound,

    #[error("security event is already resolved")]
    EventAlreadyResolved,

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl MonitorError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::EventNotFound => "EVENT_NOT_FOUND",
            Self::EventAlreadyResolved => "EVENT_ALREADY_RESOLVED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Storage(_) => "STORE_ERROR",
        }
    }
}

pub type MonitorResult<T> = Result<T, MonitorError>;
