//! Shared test helpers for monitoring tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use novelforge_storage::{
    BindOutcome, BindingLedger, LicenseStore, ProfileDirectory, SecurityEventLog, SqliteStore,
    UsageLog,
};
use novelforge_types::security::LOGIN_FAILURE;
use novelforge_types::{
    AiUsageRecord, DeviceBinding, DeviceFingerprint, DeviceInfo, License, LicenseId,
    LicenseStatus, NewSecurityEvent, Principal, Profile, Role, Severity, UsageId, UserId,
};
use std::sync::Arc;

pub fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().unwrap())
}

/// Inserts an admin profile and returns its principal.
pub fn seed_admin(store: &SqliteStore, email: &str) -> Principal {
    let profile = Profile::new(email, "Admin", Role::Admin);
    store.insert_profile(&profile).unwrap();
    Principal::new(profile.id, Role::Admin)
}

pub fn login_failures(store: &SqliteStore, ip: Option<&str>, count: usize, at: DateTime<Utc>) {
    for _ in 0..count {
        store
            .append_event(
                NewSecurityEvent::new(LOGIN_FAILURE, Severity::Low)
                    .with_source_ip(ip.map(str::to_string))
                    .at(at),
            )
            .unwrap();
    }
}

pub fn ai_calls(store: &SqliteStore, user: UserId, count: usize, at: DateTime<Utc>) {
    for _ in 0..count {
        store
            .record_usage(&AiUsageRecord {
                id: UsageId::new(),
                user_id: user,
                provider: "openai".to_string(),
                model: "gpt-4o".to_string(),
                tokens_used: 120,
                cost_estimate: 0.002,
                created_at: at,
            })
            .unwrap();
    }
}

/// Binds `count` devices for `user`, each on its own license.
pub fn activations(store: &SqliteStore, user: UserId, count: usize, at: DateTime<Utc>) {
    for _ in 0..count {
        let license = License {
            id: LicenseId::new(),
            license_key: format!("NF-{}", LicenseId::new()),
            tier: "basic".to_string(),
            max_devices: 1,
            status: LicenseStatus::Active,
            expires_at: None,
            created_by: UserId::new(),
            created_at: at,
        };
        store.insert_license(&license).unwrap();
        let binding = DeviceBinding::activate(
            license.id,
            user,
            DeviceFingerprint::parse(&format!("fp-{}", license.id)).unwrap(),
            DeviceInfo::default(),
            at,
        );
        assert_eq!(store.bind_if_capacity(&binding, 1).unwrap(), BindOutcome::Bound);
    }
}
