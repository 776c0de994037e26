use async_trait::async_trait;
use brain_core::model::{BestRecord, ChallengeKind};
use chrono::Utc;

use super::SqliteStore;
use super::mapping::{map_best_record_row, u64_to_i64};
use crate::repository::{BestRecordRepository, StorageError};

#[async_trait]
impl BestRecordRepository for SqliteStore {
    async fn get_best(&self, challenge: ChallengeKind) -> Result<BestRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT challenge, value
                FROM best_records
                WHERE challenge = ?1
            ",
        )
        .bind(challenge.id())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_best_record_row(&row),
            None => Ok(BestRecord::new(challenge)),
        }
    }

    // a stored record is only replaced by a better one
    async fn save_best(&self, record: &BestRecord) -> Result<(), StorageError> {
        let value = record
            .value()
            .map(|v| u64_to_i64("value", v))
            .transpose()?;

        sqlx::query(
            r"
                INSERT INTO best_records (challenge, kind, value, updated_at)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT(challenge) DO UPDATE SET
                    kind = excluded.kind,
                    value = excluded.value,
                    updated_at = excluded.updated_at
                WHERE excluded.value IS NOT NULL
                  AND (
                    best_records.value IS NULL
                    OR (excluded.kind = 'lowest_time' AND excluded.value < best_records.value)
                    OR (excluded.kind <> 'lowest_time' AND excluded.value > best_records.value)
                  )
            ",
        )
        .bind(record.challenge().id())
        .bind(record.kind().as_str())
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(())
    }

    async fn list_best(&self) -> Result<Vec<BestRecord>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT challenge, value
                FROM best_records
                WHERE value IS NOT NULL
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_best_record_row(&row)?);
        }
        // catalog order, matching the dashboard
        out.sort_by_key(|record| {
            ChallengeKind::ALL
                .iter()
                .position(|kind| *kind == record.challenge())
        });
        Ok(out)
    }
}
