//! Core type definitions for NovelForge Sentinel.
//!
//! This crate defines the records and identifiers shared by the storage
//! layer and the service crates:
//! - Identifiers (UUID v7)
//! - The ordered role hierarchy and authenticated principals
//! - Licenses, device bindings, security events, profiles, notifications
//!   and AI usage records
//!
//! Behaviour (verification, binding, scanning) lives in the service crates.

mod account;
mod device;
mod ids;
mod license;
mod role;
pub mod security;

pub use account::{AiUsageRecord, Notification, NotificationKind, Profile};
pub use device::{DeviceBinding, DeviceFingerprint, DeviceInfo, MAX_FINGERPRINT_LEN};
pub use ids::{BindingId, EventId, LicenseId, NotificationId, UsageId, UserId};
pub use license::{DEFAULT_TIER, License, LicenseStatus, LicenseSummary, LicenseUpdate};
pub use role::{AccessDenied, Principal, Role};
pub use security::{NewSecurityEvent, SecurityEvent, Severity};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid device fingerprint: {0}")]
    InvalidFingerprint(String),

    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}
