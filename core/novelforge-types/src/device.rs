//! Device fingerprints and license bindings.
//!
//! A fingerprint is an opaque client-generated identifier. The server never
//! derives one itself; it only normalizes and length-checks what the client
//! sends so that the uniqueness constraint on active bindings is meaningful.

use crate::{BindingId, LicenseId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum accepted fingerprint length, in characters.
pub const MAX_FINGERPRINT_LEN: usize = 256;

/// A validated device fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DeviceFingerprint(String);

impl DeviceFingerprint {
    /// Trims and validates a raw fingerprint.
    pub fn parse(raw: &str) -> Result<Self, crate::Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(crate::Error::InvalidFingerprint(
                "fingerprint must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_FINGERPRINT_LEN {
            return Err(crate::Error::InvalidFingerprint(format!(
                "fingerprint longer than {MAX_FINGERPRINT_LEN} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DeviceFingerprint {
    type Error = crate::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DeviceFingerprint> for String {
    fn from(fp: DeviceFingerprint) -> Self {
        fp.0
    }
}

/// Client-reported information about a device.
///
/// The well-known fields are optional; anything else the client sends is
/// kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Association between one device and one license.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceBinding {
    pub id: BindingId,
    pub license_id: LicenseId,
    pub user_id: UserId,
    pub device_fingerprint: DeviceFingerprint,
    pub device_info: DeviceInfo,
    /// Cleared on release; bindings are never hard-deleted.
    pub is_active: bool,
    pub activated_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl DeviceBinding {
    /// Builds a new active binding activated at `now`.
    #[must_use]
    pub fn activate(
        license_id: LicenseId,
        user_id: UserId,
        device_fingerprint: DeviceFingerprint,
        device_info: DeviceInfo,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: BindingId::new(),
            license_id,
            user_id,
            device_fingerprint,
            device_info,
            is_active: true,
            activated_at: now,
            last_seen_at: now,
        }
    }
}
