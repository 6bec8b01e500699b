use super::{
    SqliteStore, json_col, opt_ts_col, opt_uuid_col, parsed_col, to_millis, ts_col, uuid_col,
};
use crate::error::{StorageError, StorageResult};
use crate::repository::{ResolveOutcome, SecurityEventLog};
use chrono::{DateTime, Utc};
use novelforge_types::{EventId, NewSecurityEvent, SecurityEvent, UserId};
use rusqlite::{Connection, OptionalExtension, Row, params};

const EVENT_COLUMNS: &str = "id, event_type, severity, actor, source_ip, description, details, \
                             correlation_key, created_at, resolved, resolved_by, resolved_at";

fn event_from_row(row: &Row<'_>) -> rusqlite::Result<SecurityEvent> {
    Ok(SecurityEvent {
        id: EventId::from_uuid(uuid_col(row, 0)?),
        event_type: row.get(1)?,
        severity: parsed_col(row, 2)?,
        actor: opt_uuid_col(row, 3)?.map(UserId::from_uuid),
        source_ip: row.get(4)?,
        description: row.get(5)?,
        details: json_col(row, 6)?,
        correlation_key: row.get(7)?,
        created_at: ts_col(row, 8)?,
        resolved: row.get(9)?,
        resolved_by: opt_uuid_col(row, 10)?.map(UserId::from_uuid),
        resolved_at: opt_ts_col(row, 11)?,
    })
}

fn select_event(conn: &Connection, id: EventId) -> StorageResult<Option<SecurityEvent>> {
    let event = conn
        .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM security_events WHERE id = ?1"),
            params![id.to_string()],
            event_from_row,
        )
        .optional()?;
    Ok(event)
}

impl SecurityEventLog for SqliteStore {
    fn append_event(&self, event: NewSecurityEvent) -> StorageResult<SecurityEvent> {
        let event = event.into_event();
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO security_events (id, event_type, severity, actor, source_ip, description, details, correlation_key, created_at, resolved)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0)",
            params![
                event.id.to_string(),
                event.event_type,
                event.severity.as_str(),
                event.actor.map(|a| a.to_string()),
                event.source_ip,
                event.description,
                serde_json::to_string(&event.details)?,
                event.correlation_key,
                to_millis(event.created_at),
            ],
        )?;
        Ok(event)
    }

    fn event_by_id(&self, id: EventId) -> StorageResult<Option<SecurityEvent>> {
        let conn = self.conn()?;
        select_event(&conn, id)
    }

    fn source_ips_since(
        &self,
        event_type: &str,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<Vec<Option<String>>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT source_ip FROM security_events WHERE event_type = ?1 AND created_at >= ?2",
        )?;
        let ips = stmt
            .query_map(params![event_type, to_millis(cutoff)], |row| row.get(0))?
            .collect::<Result<Vec<Option<String>>, _>>()?;
        Ok(ips)
    }

    fn has_open_correlated(
        &self,
        correlation_key: &str,
        cutoff: DateTime<Utc>,
    ) -> StorageResult<bool> {
        let conn = self.conn()?;
        let open = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM security_events
                           WHERE correlation_key = ?1 AND resolved = 0 AND created_at >= ?2)",
            params![correlation_key, to_millis(cutoff)],
            |row| row.get(0),
        )?;
        Ok(open)
    }

    fn resolve_event(
        &self,
        id: EventId,
        resolved_by: UserId,
        resolved_at: DateTime<Utc>,
    ) -> StorageResult<ResolveOutcome> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE security_events SET resolved = 1, resolved_by = ?2, resolved_at = ?3
             WHERE id = ?1 AND resolved = 0",
            params![id.to_string(), resolved_by.to_string(), to_millis(resolved_at)],
        )?;
        let current = select_event(&conn, id)?;
        match (changed, current) {
            (1, Some(event)) => Ok(ResolveOutcome::Resolved(event)),
            (0, Some(_)) => Ok(ResolveOutcome::AlreadyResolved),
            (0, None) => Ok(ResolveOutcome::NotFound),
            (n, _) => Err(StorageError::InvalidData(format!(
                "resolve touched {n} rows for event {id}"
            ))),
        }
    }
}
