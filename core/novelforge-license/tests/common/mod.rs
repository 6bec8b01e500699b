//! Shared test helpers for license tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use novelforge_license::BindRequest;
use novelforge_storage::{LicenseStore, SqliteStore};
use novelforge_types::{
    DeviceFingerprint, DeviceInfo, License, LicenseId, LicenseStatus, Principal, Role, UserId,
};
use std::sync::Arc;

/// Returns a fresh in-memory store.
pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().unwrap())
}

pub fn user() -> Principal {
    Principal::new(UserId::new(), Role::User)
}

pub fn reseller() -> Principal {
    Principal::new(UserId::new(), Role::Reseller)
}

pub fn admin() -> Principal {
    Principal::new(UserId::new(), Role::Admin)
}

pub fn fingerprint(raw: &str) -> DeviceFingerprint {
    DeviceFingerprint::parse(raw).unwrap()
}

/// Inserts an active, never-expiring license with the given key and cap.
pub fn seed_license(store: &SqliteStore, key: &str, max_devices: u32) -> License {
    seed_license_with(store, key, max_devices, LicenseStatus::Active, None, UserId::new())
}

/// Inserts a license whose expiry lies `days_ago` days in the past.
pub fn seed_expired_license(store: &SqliteStore, key: &str, days_ago: i64) -> License {
    let expires = Utc::now() - Duration::days(days_ago);
    seed_license_with(store, key, 5, LicenseStatus::Active, Some(expires), UserId::new())
}

pub fn seed_license_with(
    store: &SqliteStore,
    key: &str,
    max_devices: u32,
    status: LicenseStatus,
    expires_at: Option<DateTime<Utc>>,
    created_by: UserId,
) -> License {
    let license = License {
        id: LicenseId::new(),
        license_key: key.to_string(),
        tier: "pro".to_string(),
        max_devices,
        status,
        expires_at,
        created_by,
        created_at: Utc::now(),
    };
    store.insert_license(&license).unwrap();
    license
}

pub fn bind_request(key: &str, fp: &str) -> BindRequest {
    BindRequest {
        license_key: key.to_string(),
        fingerprint: fingerprint(fp),
        device_info: DeviceInfo::default(),
    }
}
