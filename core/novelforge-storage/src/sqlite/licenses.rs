use super::{SqliteStore, map_conflict, opt_ts_col, parsed_col, to_millis, ts_col, uuid_col};
use crate::error::StorageResult;
use crate::repository::LicenseStore;
use novelforge_types::{License, LicenseId, LicenseUpdate, UserId};
use rusqlite::{Connection, OptionalExtension, Row, params};

const LICENSE_COLUMNS: &str =
    "id, license_key, tier, max_devices, status, expires_at, created_by, created_at";

fn license_from_row(row: &Row<'_>) -> rusqlite::Result<License> {
    Ok(License {
        id: LicenseId::from_uuid(uuid_col(row, 0)?),
        license_key: row.get(1)?,
        tier: row.get(2)?,
        max_devices: row.get(3)?,
        status: parsed_col(row, 4)?,
        expires_at: opt_ts_col(row, 5)?,
        created_by: UserId::from_uuid(uuid_col(row, 6)?),
        created_at: ts_col(row, 7)?,
    })
}

pub(super) fn select_by_id(conn: &Connection, id: LicenseId) -> StorageResult<Option<License>> {
    let license = conn
        .query_row(
            &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE id = ?1"),
            params![id.to_string()],
            license_from_row,
        )
        .optional()?;
    Ok(license)
}

impl LicenseStore for SqliteStore {
    fn insert_license(&self, license: &License) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO licenses (id, license_key, tier, max_devices, status, expires_at, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                license.id.to_string(),
                license.license_key,
                license.tier,
                license.max_devices,
                license.status.as_str(),
                license.expires_at.map(to_millis),
                license.created_by.to_string(),
                to_millis(license.created_at),
            ],
        )
        .map_err(|e| map_conflict(e, "license key already exists"))?;
        Ok(())
    }

    fn license_by_id(&self, id: LicenseId) -> StorageResult<Option<License>> {
        let conn = self.conn()?;
        select_by_id(&conn, id)
    }

    fn license_by_key(&self, license_key: &str) -> StorageResult<Option<License>> {
        let conn = self.conn()?;
        let license = conn
            .query_row(
                &format!("SELECT {LICENSE_COLUMNS} FROM licenses WHERE license_key = ?1"),
                params![license_key],
                license_from_row,
            )
            .optional()?;
        Ok(license)
    }

    fn update_license(
        &self,
        id: LicenseId,
        update: &LicenseUpdate,
    ) -> StorageResult<Option<License>> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let Some(mut license) = select_by_id(&tx, id)? else {
            return Ok(None);
        };
        update.apply_to(&mut license);
        tx.execute(
            "UPDATE licenses SET tier = ?2, max_devices = ?3, status = ?4, expires_at = ?5 WHERE id = ?1",
            params![
                id.to_string(),
                license.tier,
                license.max_devices,
                license.status.as_str(),
                license.expires_at.map(to_millis),
            ],
        )?;
        tx.commit()?;
        Ok(Some(license))
    }
}
