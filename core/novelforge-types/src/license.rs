//! License records.

use crate::{LicenseId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tier assigned to freshly generated licenses when none is requested.
pub const DEFAULT_TIER: &str = "basic";

/// Administrative status of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Usable for verification and new bindings.
    Active,
    /// Temporarily disabled by an operator.
    Suspended,
    /// Permanently withdrawn.
    Revoked,
}

impl LicenseStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
            Self::Revoked => "revoked",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LicenseStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            "revoked" => Ok(Self::Revoked),
            other => Err(crate::Error::UnknownVariant {
                kind: "license status",
                value: other.to_string(),
            }),
        }
    }
}

/// A purchased entitlement with a device cap and optional expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub id: LicenseId,
    /// Customer-facing key, unique across all licenses.
    pub license_key: String,
    pub tier: String,
    pub max_devices: u32,
    pub status: LicenseStatus,
    /// `None` means the license never expires.
    pub expires_at: Option<DateTime<Utc>>,
    /// Account that issued the license.
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl License {
    /// Returns true if the license has an expiry strictly before `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp < now)
    }

    /// The public summary returned alongside verification and binding results.
    #[must_use]
    pub fn summary(&self) -> LicenseSummary {
        LicenseSummary {
            tier: self.tier.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Tier and expiry of a license, as exposed to device clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseSummary {
    pub tier: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update applied to an existing license. `None` fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LicenseUpdate {
    pub status: Option<LicenseStatus>,
    pub tier: Option<String>,
    pub max_devices: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl LicenseUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.tier.is_none()
            && self.max_devices.is_none()
            && self.expires_at.is_none()
    }

    /// Applies the update to `license` in place.
    pub fn apply_to(&self, license: &mut License) {
        if let Some(status) = self.status {
            license.status = status;
        }
        if let Some(tier) = &self.tier {
            license.tier.clone_from(tier);
        }
        if let Some(max) = self.max_devices {
            license.max_devices = max;
        }
        if let Some(exp) = self.expires_at {
            license.expires_at = Some(exp);
        }
    }
}
