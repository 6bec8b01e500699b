use super::licenses::select_by_id;
use super::{SqliteStore, json_col, map_conflict, to_millis, ts_col, uuid_col};
use crate::error::{StorageError, StorageResult};
use crate::repository::{BindOutcome, BindingLedger};
use chrono::{DateTime, Utc};
use novelforge_types::{
    BindingId, DeviceBinding, DeviceFingerprint, LicenseId, LicenseStatus, UserId,
};
use rusqlite::{OptionalExtension, Row, TransactionBehavior, params};
use tracing::debug;

const BINDING_COLUMNS: &str = "id, license_id, user_id, device_fingerprint, device_info, \
                               is_active, activated_at, last_seen_at";

fn binding_from_row(row: &Row<'_>) -> rusqlite::Result<DeviceBinding> {
    let fingerprint: String = row.get(3)?;
    let device_fingerprint = DeviceFingerprint::parse(&fingerprint).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(DeviceBinding {
        id: BindingId::from_uuid(uuid_col(row, 0)?),
        license_id: LicenseId::from_uuid(uuid_col(row, 1)?),
        user_id: UserId::from_uuid(uuid_col(row, 2)?),
        device_fingerprint,
        device_info: json_col(row, 4)?,
        is_active: row.get(5)?,
        activated_at: ts_col(row, 6)?,
        last_seen_at: ts_col(row, 7)?,
    })
}

impl SqliteStore {
    fn select_bindings(&self, filter: &str, param: String) -> StorageResult<Vec<DeviceBinding>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BINDING_COLUMNS} FROM device_bindings WHERE {filter} ORDER BY activated_at"
        ))?;
        let bindings = stmt
            .query_map(params![param], binding_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bindings)
    }
}

impl BindingLedger for SqliteStore {
    fn bind_if_capacity(
        &self,
        binding: &DeviceBinding,
        max_devices: u32,
    ) -> StorageResult<BindOutcome> {
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock up front, so no other connection can
        // insert between the count and the insert.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Status and expiry are re-read under the lock so a suspension
        // committed after the caller's read still blocks the bind.
        let Some(license) = select_by_id(&tx, binding.license_id)? else {
            return Ok(BindOutcome::LicenseMissing);
        };
        if license.status != LicenseStatus::Active {
            debug!(license_id = %license.id, status = %license.status, "license no longer active");
            return Ok(BindOutcome::LicenseInactive);
        }
        if license.is_expired_at(binding.activated_at) {
            return Ok(BindOutcome::LicenseExpired);
        }

        let active: u32 = tx.query_row(
            "SELECT COUNT(*) FROM device_bindings WHERE license_id = ?1 AND is_active = 1",
            params![binding.license_id.to_string()],
            |row| row.get(0),
        )?;
        if active >= max_devices {
            debug!(license_id = %binding.license_id, active, max_devices, "device cap reached");
            return Ok(BindOutcome::CapacityReached { active });
        }

        let taken: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM device_bindings WHERE device_fingerprint = ?1 AND is_active = 1)",
            params![binding.device_fingerprint.as_str()],
            |row| row.get(0),
        )?;
        if taken {
            return Ok(BindOutcome::FingerprintTaken);
        }

        let inserted = tx.execute(
            "INSERT INTO device_bindings (id, license_id, user_id, device_fingerprint, device_info, is_active, activated_at, last_seen_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                binding.id.to_string(),
                binding.license_id.to_string(),
                binding.user_id.to_string(),
                binding.device_fingerprint.as_str(),
                serde_json::to_string(&binding.device_info)?,
                binding.is_active,
                to_millis(binding.activated_at),
                to_millis(binding.last_seen_at),
            ],
        );
        match inserted.map_err(|e| map_conflict(e, "fingerprint already bound")) {
            Ok(_) => {}
            Err(StorageError::Conflict(_)) => return Ok(BindOutcome::FingerprintTaken),
            Err(e) => return Err(e),
        }
        tx.commit()?;
        Ok(BindOutcome::Bound)
    }

    fn binding_by_id(&self, id: BindingId) -> StorageResult<Option<DeviceBinding>> {
        let conn = self.conn()?;
        let binding = conn
            .query_row(
                &format!("SELECT {BINDING_COLUMNS} FROM device_bindings WHERE id = ?1"),
                params![id.to_string()],
                binding_from_row,
            )
            .optional()?;
        Ok(binding)
    }

    fn active_binding_for_fingerprint(
        &self,
        fingerprint: &DeviceFingerprint,
    ) -> StorageResult<Option<DeviceBinding>> {
        let conn = self.conn()?;
        let binding = conn
            .query_row(
                &format!(
                    "SELECT {BINDING_COLUMNS} FROM device_bindings
                     WHERE device_fingerprint = ?1 AND is_active = 1"
                ),
                params![fingerprint.as_str()],
                binding_from_row,
            )
            .optional()?;
        Ok(binding)
    }

    fn active_bindings_for_license(
        &self,
        license_id: LicenseId,
    ) -> StorageResult<Vec<DeviceBinding>> {
        self.select_bindings("license_id = ?1 AND is_active = 1", license_id.to_string())
    }

    fn active_bindings_for_user(&self, user_id: UserId) -> StorageResult<Vec<DeviceBinding>> {
        self.select_bindings("user_id = ?1 AND is_active = 1", user_id.to_string())
    }

    fn touch_binding(&self, id: BindingId, seen_at: DateTime<Utc>) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE device_bindings SET last_seen_at = ?2 WHERE id = ?1",
            params![id.to_string(), to_millis(seen_at)],
        )?;
        Ok(())
    }

    fn deactivate_binding(&self, id: BindingId) -> StorageResult<bool> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE device_bindings SET is_active = 0 WHERE id = ?1 AND is_active = 1",
            params![id.to_string()],
        )?;
        Ok(changed == 1)
    }

    fn activation_users_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UserId>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT user_id FROM device_bindings WHERE activated_at >= ?1")?;
        let users = stmt
            .query_map(params![to_millis(cutoff)], |row| {
                Ok(UserId::from_uuid(uuid_col(row, 0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
