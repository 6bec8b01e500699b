//! Shared test helpers for account tests.

#![allow(dead_code)]

use chrono::Utc;
use novelforge_accounts::{AccountService, IssuedAccount, NewAccount};
use novelforge_storage::{BindingLedger, LicenseStore, SqliteStore};
use novelforge_types::{
    DeviceBinding, DeviceFingerprint, DeviceInfo, License, LicenseId, LicenseStatus, Principal,
    Role, UserId,
};
use std::sync::Arc;

pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().unwrap())
}

/// Bootstraps an admin and returns its principal and token.
pub fn bootstrap(service: &AccountService<SqliteStore>) -> (Principal, String) {
    let IssuedAccount { profile, token } = service
        .bootstrap_admin("root@example.com", "Root Admin")
        .unwrap();
    (Principal::new(profile.id, profile.role), token)
}

pub fn new_account(email: &str, role: Role) -> NewAccount {
    NewAccount {
        email: email.to_string(),
        full_name: "Test Account".to_string(),
        role,
    }
}

/// Gives `user` one active binding on a fresh license.
pub fn bind_device_for(store: &SqliteStore, user: UserId) {
    let license = License {
        id: LicenseId::new(),
        license_key: format!("NF-{}", LicenseId::new()),
        tier: "basic".to_string(),
        max_devices: 1,
        status: LicenseStatus::Active,
        expires_at: None,
        created_by: UserId::new(),
        created_at: Utc::now(),
    };
    store.insert_license(&license).unwrap();
    let binding = DeviceBinding::activate(
        license.id,
        user,
        DeviceFingerprint::parse(&format!("fp-{user}")).unwrap(),
        DeviceInfo::default(),
        Utc::now(),
    );
    store.bind_if_capacity(&binding, 1).unwrap();
}
