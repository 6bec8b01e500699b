//! Store traits.
//!
//! The service crates depend only on these traits. Every method is a
//! single round-trip; methods that must preserve a multi-row invariant
//! (`bind_if_capacity`, `resolve_event`, `insert_first_admin`) are atomic in
//! the implementation and report their outcome instead of failing.

use crate::error::StorageResult;
use chrono::{DateTime, Utc};
use novelforge_types::{
    AiUsageRecord, BindingId, DeviceBinding, DeviceFingerprint, EventId, License, LicenseId,
    LicenseUpdate, NewSecurityEvent, Notification, Profile, Role, SecurityEvent, UserId,
};

/// Result of an atomic bind attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// The binding was inserted.
    Bound,
    /// The license already has `active` active bindings, which is at or
    /// above its cap.
    CapacityReached { active: u32 },
    /// The fingerprint already has an active binding.
    FingerprintTaken,
    /// The license row no longer exists.
    LicenseMissing,
    /// The license is no longer active.
    LicenseInactive,
    /// The license expired before the binding's activation time.
    LicenseExpired,
}

/// Result of resolving a security event.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveOutcome {
    Resolved(SecurityEvent),
    AlreadyResolved,
    NotFound,
}

/// Persists license records.
pub trait LicenseStore: Send + Sync {
    /// Inserts a license. Fails with `Conflict` on a duplicate key.
    fn insert_license(&self, license: &License) -> StorageResult<()>;

    fn license_by_id(&self, id: LicenseId) -> StorageResult<Option<License>>;

    fn license_by_key(&self, license_key: &str) -> StorageResult<Option<License>>;

    /// Applies a partial update and returns the updated record, or `None`
    /// if no license has that id.
    fn update_license(
        &self,
        id: LicenseId,
        update: &LicenseUpdate,
    ) -> StorageResult<Option<License>>;
}

/// Persists device-to-license associations.
pub trait BindingLedger: Send + Sync {
    /// Inserts `binding` if, atomically, its license has fewer than
    /// `max_devices` active bindings and its fingerprint is not actively
    /// bound anywhere. The capacity check is evaluated first.
    fn bind_if_capacity(
        &self,
        binding: &DeviceBinding,
        max_devices: u32,
    ) -> StorageResult<BindOutcome>;

    fn binding_by_id(&self, id: BindingId) -> StorageResult<Option<DeviceBinding>>;

    fn active_binding_for_fingerprint(
        &self,
        fingerprint: &DeviceFingerprint,
    ) -> StorageResult<Option<DeviceBinding>>;

    fn active_bindings_for_license(&self, license_id: LicenseId)
    -> StorageResult<Vec<DeviceBinding>>;

    fn active_bindings_for_user(&self, user_id: UserId) -> StorageResult<Vec<DeviceBinding>>;

    fn touch_binding(&self, id: BindingId, seen_at: DateTime<Utc>) -> StorageResult<()>;

    /// Soft-deletes an active binding. Returns false if it was not active.
    fn deactivate_binding(&self, id: BindingId) -> StorageResult<bool>;

    /// Owners of every binding activated at or after `cutoff`, one entry per
    /// binding.
    fn activation_users_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UserId>>;
}

/// Append-only security event store.
pub trait SecurityEventLog: Send + Sync {
    fn append_event(&self, event: NewSecurityEvent) -> StorageResult<SecurityEvent>;

    fn event_by_id(&self, id: EventId) -> StorageResult<Option<SecurityEvent>>;

    /// Source IPs of every event of `event_type` created at or after
    /// `cutoff`, one entry per event.
    fn source_ips_since(
        &self,
        event_type: &str,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<Option<String>>>;

    /// Returns true if an unresolved event with `correlation_key` was created
    /// at or after `cutoff`.
    fn has_open_correlated(
        &self,
        correlation_key: &str,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<bool>;

    /// Marks an unresolved event as resolved. Only one caller can win.
    fn resolve_event(
        &self,
        id: EventId,
        resolved_by: UserId,
        resolved_at: DateTime<Utc>,
    ) -> StorageResult<ResolveOutcome>;
}

/// Append-only AI usage log.
pub trait UsageLog: Send + Sync {
    fn record_usage(&self, record: &AiUsageRecord) -> StorageResult<()>;

    /// Users of every usage record created at or after `cutoff`, one entry
    /// per record.
    fn usage_users_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UserId>>;
}

/// User profiles and bearer tokens.
pub trait ProfileDirectory: Send + Sync {
    /// Inserts a profile. Fails with `Conflict` on a duplicate email.
    fn insert_profile(&self, profile: &Profile) -> StorageResult<()>;

    /// Inserts `profile` only if no admin exists yet. Returns false if one
    /// already does.
    fn insert_first_admin(&self, profile: &Profile) -> StorageResult<bool>;

    fn profile_by_id(&self, id: UserId) -> StorageResult<Option<Profile>>;

    fn profiles_with_role(&self, role: Role) -> StorageResult<Vec<Profile>>;

    fn update_role(&self, id: UserId, role: Role) -> StorageResult<Option<Profile>>;

    /// Stores the hash of a bearer token issued to `user_id`.
    fn store_token(
        &self,
        token_hash: &str,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> StorageResult<()>;

    fn profile_for_token(&self, token_hash: &str) -> StorageResult<Option<Profile>>;
}

/// Per-recipient system notifications.
pub trait NotificationOutbox: Send + Sync {
    fn push_notification(&self, notification: &Notification) -> StorageResult<()>;

    fn notifications_for(&self, recipient_id: UserId) -> StorageResult<Vec<Notification>>;
}
