mod common;

use chrono::{Duration, Utc};
use common::{admin, bind_request, reseller, seed_license, store, user};
use novelforge_license::{
    DeviceBinder, GenerateLicenses, LicenseError, LicenseIssuer, MAX_BATCH, is_well_formed,
};
use novelforge_types::{DEFAULT_TIER, LicenseStatus, LicenseUpdate};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

// ── Generate ─────────────────────────────────────────────────────

#[test]
fn defaults_produce_one_basic_license() {
    let store = store();
    let principal = reseller();
    let licenses = LicenseIssuer::new(store)
        .generate_licenses(&principal, GenerateLicenses::default())
        .unwrap();

    assert_eq!(licenses.len(), 1);
    let license = &licenses[0];
    assert_eq!(license.tier, DEFAULT_TIER);
    assert_eq!(license.max_devices, 1);
    assert_eq!(license.status, LicenseStatus::Active);
    assert_eq!(license.created_by, principal.user_id);
    assert!(license.expires_at.is_none());
    assert!(is_well_formed(&license.license_key));
}

#[test]
fn batch_keys_are_unique_and_persisted() {
    let store = store();
    let principal = admin();
    let issuer = LicenseIssuer::new(store);
    let licenses = issuer
        .generate_licenses(
            &principal,
            GenerateLicenses {
                tier: "pro".to_string(),
                max_devices: 3,
                expires_at: Some(Utc::now() + Duration::days(365)),
                batch_count: 25,
            },
        )
        .unwrap();

    let keys: HashSet<_> = licenses.iter().map(|l| l.license_key.clone()).collect();
    assert_eq!(keys.len(), 25);
    for license in &licenses {
        let info = issuer.license_info(&principal, &license.license_key).unwrap();
        assert_eq!(info.license.id, license.id);
        assert_eq!(info.license.max_devices, 3);
    }
}

#[test]
fn users_cannot_generate() {
    let store = store();
    let err = LicenseIssuer::new(store)
        .generate_licenses(&user(), GenerateLicenses::default())
        .unwrap_err();
    assert!(matches!(err, LicenseError::Forbidden(_)));
    assert_eq!(err.code(), "FORBIDDEN");
}

#[test]
fn batch_count_bounds() {
    let store = store();
    let issuer = LicenseIssuer::new(store);
    for batch_count in [0, MAX_BATCH + 1] {
        let err = issuer
            .generate_licenses(
                &admin(),
                GenerateLicenses {
                    batch_count,
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, LicenseError::InvalidRequest(_)));
    }
}

#[test]
fn zero_devices_and_blank_tier_rejected() {
    let store = store();
    let issuer = LicenseIssuer::new(store);
    let zero = issuer.generate_licenses(
        &admin(),
        GenerateLicenses {
            max_devices: 0,
            ..Default::default()
        },
    );
    let blank = issuer.generate_licenses(
        &admin(),
        GenerateLicenses {
            tier: "   ".to_string(),
            ..Default::default()
        },
    );
    assert!(matches!(zero, Err(LicenseError::InvalidRequest(_))));
    assert!(matches!(blank, Err(LicenseError::InvalidRequest(_))));
}

#[test]
fn generate_params_deserialize_camel_case_with_defaults() {
    let params: GenerateLicenses =
        serde_json::from_str(r#"{"maxDevices": 4, "batchCount": 2}"#).unwrap();
    assert_eq!(params.max_devices, 4);
    assert_eq!(params.batch_count, 2);
    assert_eq!(params.tier, DEFAULT_TIER);
    assert!(params.expires_at.is_none());
}

// ── Update ───────────────────────────────────────────────────────

#[test]
fn reseller_updates_own_license() {
    let store = store();
    let principal = reseller();
    let issuer = LicenseIssuer::new(store);
    let license = issuer
        .generate_licenses(&principal, GenerateLicenses::default())
        .unwrap()
        .remove(0);

    let updated = issuer
        .update_license(
            &principal,
            &license.license_key,
            LicenseUpdate {
                status: Some(LicenseStatus::Suspended),
                max_devices: Some(5),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, LicenseStatus::Suspended);
    assert_eq!(updated.max_devices, 5);
}

#[test]
fn reseller_cannot_touch_foreign_license() {
    let store = store();
    seed_license(&store, "NF-FOREIGN", 1);
    let issuer = LicenseIssuer::new(store);

    let update = LicenseUpdate {
        tier: Some("pro".to_string()),
        ..Default::default()
    };
    let err = issuer
        .update_license(&reseller(), "NF-FOREIGN", update.clone())
        .unwrap_err();
    assert!(matches!(err, LicenseError::NotOwner(_)));

    let info_err = issuer.license_info(&reseller(), "NF-FOREIGN").unwrap_err();
    assert!(matches!(info_err, LicenseError::NotOwner(_)));

    assert!(issuer.update_license(&admin(), "NF-FOREIGN", update).is_ok());
}

#[test]
fn update_unknown_key_is_not_found() {
    let store = store();
    let err = LicenseIssuer::new(store)
        .update_license(
            &admin(),
            "NF-MISSING",
            LicenseUpdate {
                status: Some(LicenseStatus::Revoked),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, LicenseError::LicenseNotFound));
    assert_eq!(err.code(), "LICENSE_NOT_FOUND");
}

#[test]
fn invalid_updates_rejected() {
    let store = store();
    seed_license(&store, "NF-VALID", 1);
    let issuer = LicenseIssuer::new(store);

    let empty = issuer.update_license(&admin(), "NF-VALID", LicenseUpdate::default());
    let zero = issuer.update_license(
        &admin(),
        "NF-VALID",
        LicenseUpdate {
            max_devices: Some(0),
            ..Default::default()
        },
    );
    assert!(matches!(empty, Err(LicenseError::InvalidRequest(_))));
    assert!(matches!(zero, Err(LicenseError::InvalidRequest(_))));
}

// ── Info ─────────────────────────────────────────────────────────

#[test]
fn info_lists_active_devices() {
    let store = store();
    seed_license(&store, "NF-INFO", 3);
    let binder = DeviceBinder::new(store.clone());
    let owner = user();
    binder.bind_device(bind_request("NF-INFO", "fp-1"), &owner).unwrap();
    let second = binder.bind_device(bind_request("NF-INFO", "fp-2"), &owner).unwrap();
    binder.unbind_device(second.binding.id, &owner).unwrap();

    let info = LicenseIssuer::new(store)
        .license_info(&admin(), "NF-INFO")
        .unwrap();
    assert_eq!(info.device_count, 1);
    assert_eq!(info.devices[0].device_fingerprint.as_str(), "fp-1");

    let json = serde_json::to_value(&info).unwrap();
    assert_eq!(json["deviceCount"], 1);
}
