use async_trait::async_trait;
use brain_core::model::{BestRecord, ChallengeKind, SessionSummary};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A stored session summary together with its row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryRow {
    pub id: i64,
    pub summary: SessionSummary,
}

impl SessionSummaryRow {
    #[must_use]
    pub fn new(id: i64, summary: SessionSummary) -> Self {
        Self { id, summary }
    }
}

/// Repository contract for per-challenge best records.
#[async_trait]
pub trait BestRecordRepository: Send + Sync {
    /// Fetch the best record for a challenge.
    ///
    /// A challenge that was never played yields an empty record, not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be read.
    async fn get_best(&self, challenge: ChallengeKind) -> Result<BestRecord, StorageError>;

    /// Persist a best record, keeping the stored one when it is better.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_best(&self, record: &BestRecord) -> Result<(), StorageError>;

    /// All records that hold a value, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if records cannot be read.
    async fn list_best(&self) -> Result<Vec<BestRecord>, StorageError>;
}

/// Repository contract for finished session summaries.
#[async_trait]
pub trait SessionSummaryRepository: Send + Sync {
    /// Append a summary and return its row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the summary cannot be stored.
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError>;

    /// Fetch a summary by row id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError>;

    /// Most recent summaries first, optionally filtered by challenge.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if summaries cannot be read.
    async fn list_summaries(
        &self,
        challenge: Option<ChallengeKind>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError>;
}

/// In-memory repository; contents are lost when the process exits.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<HashMap<ChallengeKind, BestRecord>>>,
    summaries: Arc<Mutex<Vec<SessionSummaryRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BestRecordRepository for InMemoryRepository {
    async fn get_best(&self, challenge: ChallengeKind) -> Result<BestRecord, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard
            .get(&challenge)
            .copied()
            .unwrap_or_else(|| BestRecord::new(challenge)))
    }

    async fn save_best(&self, record: &BestRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let Some(candidate) = record.value() else {
            return Ok(());
        };
        guard
            .entry(record.challenge())
            .or_insert_with(|| BestRecord::new(record.challenge()))
            .offer(candidate);
        Ok(())
    }

    async fn list_best(&self) -> Result<Vec<BestRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(ChallengeKind::ALL
            .iter()
            .filter_map(|kind| guard.get(kind).copied())
            .filter(|record| record.value().is_some())
            .collect())
    }
}

#[async_trait]
impl SessionSummaryRepository for InMemoryRepository {
    async fn append_summary(&self, summary: &SessionSummary) -> Result<i64, StorageError> {
        let mut guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let id = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("summary id overflow".into()))?
            + 1;
        guard.push(SessionSummaryRow::new(id, summary.clone()));
        Ok(id)
    }

    async fn get_summary(&self, id: i64) -> Result<SessionSummary, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.summary.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_summaries(
        &self,
        challenge: Option<ChallengeKind>,
        limit: u32,
    ) -> Result<Vec<SessionSummaryRow>, StorageError> {
        let guard = self
            .summaries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows: Vec<SessionSummaryRow> = guard
            .iter()
            .filter(|row| challenge.is_none_or(|c| row.summary.challenge() == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            b.summary
                .completed_at()
                .cmp(&a.summary.completed_at())
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(limit as usize);
        Ok(rows)
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub records: Arc<dyn BestRecordRepository>,
    pub summaries: Arc<dyn SessionSummaryRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let records: Arc<dyn BestRecordRepository> = Arc::new(repo.clone());
        let summaries: Arc<dyn SessionSummaryRepository> = Arc::new(repo);
        Self { records, summaries }
    }
}
