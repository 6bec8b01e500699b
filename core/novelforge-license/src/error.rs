//! Error types for the licensing module.

use novelforge_storage::StorageError;
use novelforge_types::AccessDenied;
use thiserror::Error;

/// Licensing-specific errors.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// No license has the presented key.
    #[error("invalid license key")]
    InvalidLicense,

    /// License status is not active.
    #[error("license is not active")]
    LicenseInactive,

    /// License expiry is in the past.
    #[error("license has expired")]
    LicenseExpired,

    /// Device limit reached.
    #[error("license allows at most {0} devices")]
    DeviceLimitExceeded(u32),

    /// Fingerprint already has an active binding.
    #[error("device is already bound to a license")]
    DeviceAlreadyBound,

    /// License lookup by key for management actions failed.
    #[error("license not found")]
    LicenseNotFound,

    /// Binding does not exist or is no longer active.
    #[error("device binding not found")]
    BindingNotFound,

    /// Caller's role is too low.
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// Caller has the role but does not own the record.
    #[error("{0}")]
    NotOwner(String),

    /// Malformed or out-of-range input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Store access failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LicenseError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidLicense => "INVALID_LICENSE",
            Self::LicenseInactive => "LICENSE_INACTIVE",
            Self::LicenseExpired => "LICENSE_EXPIRED",
            Self::DeviceLimitExceeded(_) => "DEVICE_LIMIT_EXCEEDED",
            Self::DeviceAlreadyBound => "DEVICE_ALREADY_BOUND",
            Self::LicenseNotFound => "LICENSE_NOT_FOUND",
            Self::BindingNotFound => "BINDING_NOT_FOUND",
            Self::Forbidden(_) | Self::NotOwner(_) => "FORBIDDEN",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Storage(_) => "STORE_ERROR",
        }
    }
}

impl From<novelforge_types::Error> for LicenseError {
    fn from(err: novelforge_types::Error) -> Self {
        Self::InvalidRequest(err.to_string())
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
