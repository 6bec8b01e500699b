//! License issuance and management for resellers and admins.

use crate::error::{LicenseError, LicenseResult};
use crate::key::generate_license_key;
use chrono::{DateTime, Utc};
use novelforge_storage::{BindingLedger, LicenseStore, StorageError};
use novelforge_types::{
    DEFAULT_TIER, DeviceBinding, License, LicenseId, LicenseStatus, LicenseUpdate, Principal, Role,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Largest batch a single generate call may produce.
pub const MAX_BATCH: u32 = 100;

/// Attempts per license before a key collision is reported as an error.
const KEY_ATTEMPTS: usize = 3;

/// Parameters of a generate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateLicenses {
    pub tier: String,
    pub max_devices: u32,
    pub expires_at: Option<DateTime<Utc>>,
    pub batch_count: u32,
}

impl Default for GenerateLicenses {
    fn default() -> Self {
        Self {
            tier: DEFAULT_TIER.to_string(),
            max_devices: 1,
            expires_at: None,
            batch_count: 1,
        }
    }
}

/// A license together with its active devices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseInfo {
    pub license: License,
    pub devices: Vec<DeviceBinding>,
    pub device_count: usize,
}

/// Creates, updates and inspects licenses.
pub struct LicenseIssuer<S> {
    store: Arc<S>,
}

impl<S> LicenseIssuer<S>
where
    S: LicenseStore + BindingLedger,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Generates `batch_count` fresh active licenses owned by `principal`.
    pub fn generate_licenses(
        &self,
        principal: &Principal,
        params: GenerateLicenses,
    ) -> LicenseResult<Vec<License>> {
        principal.require(Role::Reseller)?;

        if params.batch_count == 0 || params.batch_count > MAX_BATCH {
            return Err(LicenseError::InvalidRequest(format!(
                "batchCount must be between 1 and {MAX_BATCH}"
            )));
        }
        if params.max_devices == 0 {
            return Err(LicenseError::InvalidRequest(
                "maxDevices must be at least 1".to_string(),
            ));
        }
        let tier = params.tier.trim();
        if tier.is_empty() {
            return Err(LicenseError::InvalidRequest("tier must not be empty".to_string()));
        }

        let mut licenses = Vec::with_capacity(params.batch_count as usize);
        for _ in 0..params.batch_count {
            let license = self.insert_with_fresh_key(principal, tier, &params)?;
            licenses.push(license);
        }

        info!(
            user_id = %principal.user_id,
            count = licenses.len(),
            tier,
            "licenses generated"
        );
        Ok(licenses)
    }

    fn insert_with_fresh_key(
        &self,
        principal: &Principal,
        tier: &str,
        params: &GenerateLicenses,
    ) -> LicenseResult<License> {
        let mut last_conflict = None;
        for _ in 0..KEY_ATTEMPTS {
            let now = Utc::now();
            let license = License {
                id: LicenseId::new(),
                license_key: generate_license_key(now),
                tier: tier.to_string(),
                max_devices: params.max_devices,
                status: LicenseStatus::Active,
                expires_at: params.expires_at,
                created_by: principal.user_id,
                created_at: now,
            };
            match self.store.insert_license(&license) {
                Ok(()) => return Ok(license),
                Err(StorageError::Conflict(msg)) => {
                    warn!(key = %license.license_key, "license key collision, retrying");
                    last_conflict = Some(StorageError::Conflict(msg));
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(last_conflict
            .unwrap_or_else(|| StorageError::Conflict("license key".to_string()))
            .into())
    }

    /// Applies `update` to the license with `license_key`.
    pub fn update_license(
        &self,
        principal: &Principal,
        license_key: &str,
        update: LicenseUpdate,
    ) -> LicenseResult<License> {
        if update.is_empty() {
            return Err(LicenseError::InvalidRequest(
                "update must change at least one field".to_string(),
            ));
        }
        if update.max_devices == Some(0) {
            return Err(LicenseError::InvalidRequest(
                "maxDevices must be at least 1".to_string(),
            ));
        }
        if update.tier.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(LicenseError::InvalidRequest("tier must not be empty".to_string()));
        }

        let license = self.managed_license(principal, license_key)?;
        let updated = self
            .store
            .update_license(license.id, &update)?
            .ok_or(LicenseError::LicenseNotFound)?;

        info!(license_id = %updated.id, user_id = %principal.user_id, "license updated");
        Ok(updated)
    }

    /// Returns the license with `license_key` and its active bindings.
    pub fn license_info(
        &self,
        principal: &Principal,
        license_key: &str,
    ) -> LicenseResult<LicenseInfo> {
        let license = self.managed_license(principal, license_key)?;
        let devices = self.store.active_bindings_for_license(license.id)?;
        Ok(LicenseInfo {
            device_count: devices.len(),
            license,
            devices,
        })
    }

    /// Looks up a license the principal is allowed to manage. Resellers only
    /// manage licenses they issued.
    fn managed_license(&self, principal: &Principal, license_key: &str) -> LicenseResult<License> {
        principal.require(Role::Reseller)?;

        let license = self
            .store
            .license_by_key(license_key.trim())?
            .ok_or(LicenseError::LicenseNotFound)?;

        if !principal.is_admin() && license.created_by != principal.user_id {
            return Err(LicenseError::NotOwner(
                "resellers may only manage licenses they issued".to_string(),
            ));
        }
        Ok(license)
    }
}
