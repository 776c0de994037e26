use brain_core::model::{ChallengeKind, SessionSummary};

use super::SqliteStore;
use super::mapping::{map_summary_row, map_summary_row_with_id, u64_to_i64};
use crate::repository::{SessionSummaryRepository, SessionSummaryRow, StorageError};

#[async_trait::async_trait]
impl SessionSummaryRepository for SqliteStore {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let stats = summary.stats();
        let previous_best = summary
            .previous_best()
            .map(|v| u64_to_i64("previous_best", v))
            .transpose()?;

        let res = sqlx::query(
            r"
                INSERT INTO session_summaries (
                    challenge, score, streak, best_streak, level,
                    answered, correct, elapsed_ms, reaction_total_ms, reactions,
                    reason, outcome, previous_best, started_at, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ",
        )
        .bind(summary.challenge().id())
        .bind(i64::from(stats.score))
        .bind(i64::from(stats.streak))
        .bind(i64::from(stats.best_streak))
        .bind(i64::from(stats.level))
        .bind(i64::from(stats.answered))
        .bind(i64::from(stats.correct))
        .bind(u64_to_i64("elapsed_ms", stats.elapsed_ms)?)
        .bind(u64_to_i64("reaction_total_ms", stats.reaction_total_ms)?)
        .bind(i64::from(stats.reactions))
        .bind(summary.reason().as_str())
        .bind(summary.outcome().as_str())
        .bind(previous_best)
        .bind(summary.started_at())
        .bind(summary.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let row = sqlx::query(
            r"
                SELECT *
                FROM session_summaries
                WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_summary_row(&row)
    }

    async fn list_summaries(
        &self,
        challenge: Option<ChallengeKind>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let mut sql = String::from(
            r"
                SELECT *
                FROM session_summaries
            ",
        );
        if challenge.is_some() {
            sql.push_str(" WHERE challenge = ?1");
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?2");
        } else {
            sql.push_str(" ORDER BY completed_at DESC, id DESC LIMIT ?1");
        }

        let mut query = sqlx::query(&sql);
        if let Some(challenge) = challenge {
            query = query.bind(challenge.id());
        }
        query = query.bind(i64::from(limit));

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_summary_row_with_id(&row)?);
        }
        Ok(out)
    }
}
