//! Device binding and release.
//!
//! Validation order for a bind, first failure wins:
//! 1. license exists
//! 2. license is active
//! 3. license is not expired
//! 4. license has spare device capacity
//! 5. fingerprint is not actively bound anywhere
//!
//! Steps 2 to 5 are checked again inside the single atomic ledger write, so
//! two concurrent binds cannot both take the last slot and a license
//! suspended mid-request cannot gain a device.

use crate::error::{LicenseError, LicenseResult};
use chrono::{DateTime, Utc};
use novelforge_storage::{BindOutcome, BindingLedger, LicenseStore};
use novelforge_types::{
    BindingId, DeviceBinding, DeviceFingerprint, DeviceInfo, LicenseStatus, LicenseSummary,
    Principal,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// A request to attach a device to a license.
#[derive(Debug, Clone, PartialEq)]
pub struct BindRequest {
    pub license_key: String,
    pub fingerprint: DeviceFingerprint,
    pub device_info: DeviceInfo,
}

/// Successful bind result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindReceipt {
    pub success: bool,
    pub message: String,
    pub binding: DeviceBinding,
    pub license: LicenseSummary,
}

/// Attaches devices to licenses and releases them.
pub struct DeviceBinder<S> {
    store: Arc<S>,
}

impl<S> DeviceBinder<S>
where
    S: LicenseStore + BindingLedger,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Binds a device on behalf of `principal`.
    pub fn bind_device(
        &self,
        request: BindRequest,
        principal: &Principal,
    ) -> LicenseResult<BindReceipt> {
        self.bind_device_at(request, principal, Utc::now())
    }

    pub fn bind_device_at(
        &self,
        request: BindRequest,
        principal: &Principal,
        now: DateTime<Utc>,
    ) -> LicenseResult<BindReceipt> {
        let license = self
            .store
            .license_by_key(request.license_key.trim())?
            .ok_or(LicenseError::InvalidLicense)?;

        if license.status != LicenseStatus::Active {
            return Err(LicenseError::LicenseInactive);
        }
        if license.is_expired_at(now) {
            return Err(LicenseError::LicenseExpired);
        }

        let binding = DeviceBinding::activate(
            license.id,
            principal.user_id,
            request.fingerprint,
            request.device_info,
            now,
        );

        match self.store.bind_if_capacity(&binding, license.max_devices)? {
            BindOutcome::Bound => {}
            BindOutcome::CapacityReached { active } => {
                warn!(license_id = %license.id, active, "bind rejected: device limit");
                return Err(LicenseError::DeviceLimitExceeded(license.max_devices));
            }
            BindOutcome::FingerprintTaken => {
                warn!(fingerprint = %binding.device_fingerprint, "bind rejected: already bound");
                return Err(LicenseError::DeviceAlreadyBound);
            }
            BindOutcome::LicenseMissing => return Err(LicenseError::InvalidLicense),
            BindOutcome::LicenseInactive => return Err(LicenseError::LicenseInactive),
            BindOutcome::LicenseExpired => return Err(LicenseError::LicenseExpired),
        }

        info!(
            binding_id = %binding.id,
            license_id = %license.id,
            user_id = %principal.user_id,
            "device bound"
        );

        Ok(BindReceipt {
            success: true,
            message: "device bound".to_string(),
            binding,
            license: license.summary(),
        })
    }

    /// Soft-deletes an active binding. Only its owner or an admin may do so.
    pub fn unbind_device(
        &self,
        binding_id: BindingId,
        principal: &Principal,
    ) -> LicenseResult<DeviceBinding> {
        let mut binding = self
            .store
            .binding_by_id(binding_id)?
            .filter(|b| b.is_active)
            .ok_or(LicenseError::BindingNotFound)?;

        if binding.user_id != principal.user_id && !principal.is_admin() {
            return Err(LicenseError::NotOwner(
                "only the device owner or an administrator may release a binding".to_string(),
            ));
        }

        if !self.store.deactivate_binding(binding_id)? {
            return Err(LicenseError::BindingNotFound);
        }
        binding.is_active = false;
        info!(%binding_id, user_id = %principal.user_id, "device released");
        Ok(binding)
    }
}
