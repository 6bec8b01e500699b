//! Error types for account management.

use novelforge_storage::StorageError;
use novelforge_types::{AccessDenied, Role};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    /// Missing, unknown or revoked bearer token.
    #[error("authentication required")]
    Unauthenticated,

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    /// The creator may only grant roles strictly below its own.
    #[error("a {creator} may not create a {requested} account")]
    RoleNotPermitted { creator: Role, requested: Role },

    #[error("an administrator account already exists")]
    AdminExists,

    #[error("email address is already registered")]
    EmailTaken,

    #[error("user not found")]
    UserNotFound,

    /// AI calls require at least one active device binding.
    #[error("no active license binding for this account")]
    NoValidLicense,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AccountError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::RoleNotPermitted { .. } => "ROLE_NOT_PERMITTED",
            Self::AdminExists => "ADMIN_EXISTS",
            Self::EmailTaken => "EMAIL_TAKEN",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::NoValidLicense => "NO_VALID_LICENSE",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Storage(_) => "STORE_ERROR",
        }
    }
}

pub type AccountResult<T> = Result<T, AccountError>;
