use std::sync::Arc;

use brain_core::Clock;
use brain_core::model::{BestRecord, ChallengeKind, ChallengeSettings, SessionSummary};
use storage::repository::{BestRecordRepository, SessionSummaryRepository, Storage};

use super::view::{SessionSummaryId, SessionSummaryListItem};
use crate::error::SessionError;
use crate::playable::{PlayableSession, build_session_with_clock};

/// Connects challenge sessions to persistence: loads the best record before a
/// session starts and stores the outcome after it ends.
#[derive(Clone)]
pub struct SessionLoopService {
    clock: Clock,
    records: Arc<dyn BestRecordRepository>,
    summaries: Arc<dyn SessionSummaryRepository>,
}

impl SessionLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        records: Arc<dyn BestRecordRepository>,
        summaries: Arc<dyn SessionSummaryRepository>,
    ) -> Self {
        Self {
            clock,
            records,
            summaries,
        }
    }

    #[must_use]
    pub fn from_storage(clock: Clock, storage: &Storage) -> Self {
        Self::new(clock, storage.records.clone(), storage.summaries.clone())
    }

    /// Build an idle session for `kind` that already knows its best record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the record cannot be read.
    pub async fn prepare(
        &self,
        kind: ChallengeKind,
        settings: &ChallengeSettings,
        seed: Option<u64>,
    ) -> Result<Box<dyn PlayableSession>, SessionError> {
        let record = self.records.get_best(kind).await?;
        let mut session = build_session_with_clock(kind, settings, seed, self.clock);
        session.load_best_record(record);
        tracing::debug!(challenge = kind.id(), best = ?record.value(), "session prepared");
        Ok(session)
    }

    /// Persist a finished session.
    ///
    /// The best record is written only when the summary reports a new record.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if either write fails.
    pub async fn complete(
        &self,
        summary: &SessionSummary,
        record: &BestRecord,
    ) -> Result<SessionSummaryId, SessionError> {
        if summary.is_new_record() {
            self.records.save_best(record).await?;
        }
        let id = self.summaries.append_summary(summary).await?;
        tracing::info!(
            challenge = summary.challenge().id(),
            summary_id = id,
            new_record = summary.is_new_record(),
            "session stored"
        );
        Ok(id)
    }

    /// Every challenge that has a record, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if records cannot be read.
    pub async fn records(&self) -> Result<Vec<BestRecord>, SessionError> {
        Ok(self.records.list_best().await?)
    }

    /// Most recent sessions first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if summaries cannot be read.
    pub async fn recent(
        &self,
        challenge: Option<ChallengeKind>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryListItem>, SessionError> {
        let rows = self.summaries.list_summaries(challenge, limit).await?;
        Ok(rows.iter().map(SessionSummaryListItem::from_row).collect())
    }
}
