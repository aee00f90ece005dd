use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::SqliteRepository;
use super::mapping::map_snapshot_row;
use crate::repository::{Snapshot, SnapshotKey, SnapshotRepository, StorageError};

#[async_trait]
impl SnapshotRepository for SqliteRepository {
    async fn put_snapshot(
        &self,
        key: SnapshotKey,
        payload: String,
        saved_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO snapshots (key, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            ",
        )
        .bind(key.as_str())
        .bind(payload)
        .bind(saved_at)
        .execute(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(())
    }

    async fn get_snapshot(&self, key: SnapshotKey) -> Result<Option<Snapshot>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT key, payload, saved_at
            FROM snapshots
            WHERE key = ?1
            ",
        )
        .bind(key.as_str())
        .fetch_optional(self.pool())
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        row.as_ref().map(map_snapshot_row).transpose()
    }
}
