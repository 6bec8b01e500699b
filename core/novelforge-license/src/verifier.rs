//! Device verification.
//!
//! A device is verified when its fingerprint has an active binding whose
//! license is active and unexpired. The three checks run in that order and
//! the first failure decides the reason. Store failures are errors, never
//! "unverified".

use crate::error::LicenseResult;
use chrono::{DateTime, Utc};
use novelforge_storage::{BindingLedger, LicenseStore};
use novelforge_types::{DeviceFingerprint, LicenseStatus, LicenseSummary};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

pub const MSG_NOT_REGISTERED: &str = "device is not registered or has been deactivated";
pub const MSG_LICENSE_INACTIVE: &str = "license is invalid or inactive";
pub const MSG_LICENSE_EXPIRED: &str = "license has expired";
pub const MSG_VERIFIED: &str = "device verified";

/// Outcome of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub verified: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<LicenseSummary>,
}

impl Verification {
    fn rejected(message: &str) -> Self {
        Self {
            verified: false,
            message: message.to_string(),
            license: None,
        }
    }
}

/// Checks device fingerprints against their bound licenses.
pub struct LicenseVerifier<S> {
    store: Arc<S>,
}

impl<S> LicenseVerifier<S>
where
    S: LicenseStore + BindingLedger,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Verifies `fingerprint` against the current time.
    pub fn verify_device(&self, fingerprint: &DeviceFingerprint) -> LicenseResult<Verification> {
        self.verify_device_at(fingerprint, Utc::now())
    }

    /// Verifies `fingerprint` as of `now`. On success the binding's
    /// `last_seen_at` is set to `now`.
    pub fn verify_device_at(
        &self,
        fingerprint: &DeviceFingerprint,
        now: DateTime<Utc>,
    ) -> LicenseResult<Verification> {
        let Some(binding) = self.store.active_binding_for_fingerprint(fingerprint)? else {
            debug!(%fingerprint, "verification rejected: no active binding");
            return Ok(Verification::rejected(MSG_NOT_REGISTERED));
        };

        let license = match self.store.license_by_id(binding.license_id)? {
            Some(license) if license.status == LicenseStatus::Active => license,
            _ => {
                debug!(binding_id = %binding.id, "verification rejected: license inactive");
                return Ok(Verification::rejected(MSG_LICENSE_INACTIVE));
            }
        };

        if license.is_expired_at(now) {
            debug!(license_id = %license.id, "verification rejected: license expired");
            return Ok(Verification::rejected(MSG_LICENSE_EXPIRED));
        }

        self.store.touch_binding(binding.id, now)?;
        info!(binding_id = %binding.id, license_id = %license.id, "device verified");

        Ok(Verification {
            verified: true,
            message: MSG_VERIFIED.to_string(),
            license: Some(license.summary()),
        })
    }
}
