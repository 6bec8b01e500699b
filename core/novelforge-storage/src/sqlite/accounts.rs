use super::{
    SqliteStore, json_col, map_conflict, opt_uuid_col, parsed_col, to_millis, ts_col, uuid_col,
};
use crate::error::StorageResult;
use crate::repository::{NotificationOutbox, ProfileDirectory};
use chrono::{DateTime, Utc};
use novelforge_types::{Notification, NotificationId, Profile, Role, UserId};
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};

const PROFILE_COLUMNS: &str = "id, email, full_name, role, reseller_id, device_limit, created_at";

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        id: UserId::from_uuid(uuid_col(row, 0)?),
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: parsed_col(row, 3)?,
        reseller_id: opt_uuid_col(row, 4)?.map(UserId::from_uuid),
        device_limit: row.get(5)?,
        created_at: ts_col(row, 6)?,
    })
}

fn notification_from_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    Ok(Notification {
        id: NotificationId::from_uuid(uuid_col(row, 0)?),
        recipient_id: UserId::from_uuid(uuid_col(row, 1)?),
        title: row.get(2)?,
        message: row.get(3)?,
        kind: parsed_col(row, 4)?,
        data: json_col(row, 5)?,
        created_at: ts_col(row, 6)?,
        read: row.get(7)?,
    })
}

fn insert_profile_row(conn: &Connection, profile: &Profile) -> StorageResult<()> {
    conn.execute(
        "INSERT INTO profiles (id, email, full_name, role, reseller_id, device_limit, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            profile.id.to_string(),
            profile.email,
            profile.full_name,
            profile.role.as_str(),
            profile.reseller_id.map(|r| r.to_string()),
            profile.device_limit,
            to_millis(profile.created_at),
        ],
    )
    .map_err(|e| map_conflict(e, "email already registered"))?;
    Ok(())
}

fn select_profile(conn: &Connection, id: UserId) -> StorageResult<Option<Profile>> {
    let profile = conn
        .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?1"),
            params![id.to_string()],
            profile_from_row,
        )
        .optional()?;
    Ok(profile)
}

impl ProfileDirectory for SqliteStore {
    fn insert_profile(&self, profile: &Profile) -> StorageResult<()> {
        let conn = self.conn()?;
        insert_profile_row(&conn, profile)
    }

    fn insert_first_admin(&self, profile: &Profile) -> StorageResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM profiles WHERE role = ?1)",
            params![Role::Admin.as_str()],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(false);
        }
        insert_profile_row(&tx, profile)?;
        tx.commit()?;
        Ok(true)
    }

    fn profile_by_id(&self, id: UserId) -> StorageResult<Option<Profile>> {
        let conn = self.conn()?;
        select_profile(&conn, id)
    }

    fn profiles_with_role(&self, role: Role) -> StorageResult<Vec<Profile>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = ?1 ORDER BY created_at"
        ))?;
        let profiles = stmt
            .query_map(params![role.as_str()], profile_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(profiles)
    }

    fn update_role(&self, id: UserId, role: Role) -> StorageResult<Option<Profile>> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE profiles SET role = ?2 WHERE id = ?1",
            params![id.to_string(), role.as_str()],
        )?;
        if changed == 0 {
            return Ok(None);
        }
        select_profile(&conn, id)
    }

    fn store_token(
        &self,
        token_hash: &str,
        user_id: UserId,
        issued_at: DateTime<Utc>,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO api_tokens (token_hash, user_id, issued_at) VALUES (?1, ?2, ?3)",
            params![token_hash, user_id.to_string(), to_millis(issued_at)],
        )
        .map_err(|e| map_conflict(e, "token already issued"))?;
        Ok(())
    }

    fn profile_for_token(&self, token_hash: &str) -> StorageResult<Option<Profile>> {
        let conn = self.conn()?;
        let profile = conn
            .query_row(
                "SELECT p.id, p.email, p.full_name, p.role, p.reseller_id, p.device_limit, p.created_at
                 FROM api_tokens t JOIN profiles p ON p.id = t.user_id
                 WHERE t.token_hash = ?1",
                params![token_hash],
                profile_from_row,
            )
            .optional()?;
        Ok(profile)
    }
}

impl NotificationOutbox for SqliteStore {
    fn push_notification(&self, notification: &Notification) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO notifications (id, recipient_id, title, message, kind, data, created_at, read)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                notification.id.to_string(),
                notification.recipient_id.to_string(),
                notification.title,
                notification.message,
                notification.kind.as_str(),
                serde_json::to_string(&notification.data)?,
                to_millis(notification.created_at),
                notification.read,
            ],
        )?;
        Ok(())
    }

    fn notifications_for(&self, recipient_id: UserId) -> StorageResult<Vec<Notification>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, recipient_id, title, message, kind, data, created_at, read
             FROM notifications WHERE recipient_id = ?1 ORDER BY created_at, id",
        )?;
        let notifications = stmt
            .query_map(params![recipient_id.to_string()], notification_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(notifications)
    }
}
