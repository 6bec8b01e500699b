use super::{SqliteStore, to_millis, uuid_col};
use crate::error::StorageResult;
use crate::repository::UsageLog;
use chrono::{DateTime, Utc};
use novelforge_types::{AiUsageRecord, UserId};
use rusqlite::params;

impl UsageLog for SqliteStore {
    fn record_usage(&self, record: &AiUsageRecord) -> StorageResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO ai_usage_logs (id, user_id, provider, model, tokens_used, cost_estimate, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.user_id.to_string(),
                record.provider,
                record.model,
                i64::try_from(record.tokens_used).unwrap_or(i64::MAX),
                record.cost_estimate,
                to_millis(record.created_at),
            ],
        )?;
        Ok(())
    }

    fn usage_users_since(&self, cutoff: DateTime<Utc>) -> StorageResult<Vec<UserId>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT user_id FROM ai_usage_logs WHERE created_at >= ?1")?;
        let users = stmt
            .query_map(params![to_millis(cutoff)], |row| {
                Ok(UserId::from_uuid(uuid_col(row, 0)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
