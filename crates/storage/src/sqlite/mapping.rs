use brain_core::model::{
    BestRecord, ChallengeKind, EndReason, Outcome, SessionStats, SessionSummary,
};
use sqlx::Row;

use crate::repository::{SessionSummaryRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn u64_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn parse_challenge(s: &str) -> Result<ChallengeKind, StorageError> {
    s.parse().map_err(ser)
}

pub(crate) fn parse_end_reason(s: &str) -> Result<EndReason, StorageError> {
    match s {
        "time_up" => Ok(EndReason::TimeUp),
        "out_of_lives" => Ok(EndReason::OutOfLives),
        "mistake" => Ok(EndReason::Mistake),
        "finished" => Ok(EndReason::Finished),
        "stopped" => Ok(EndReason::Stopped),
        _ => Err(StorageError::Serialization(format!("invalid end reason: {s}"))),
    }
}

pub(crate) fn parse_outcome(s: &str) -> Result<Outcome, StorageError> {
    match s {
        "new_record" => Ok(Outcome::NewRecord),
        "completed" => Ok(Outcome::Completed),
        "abandoned" => Ok(Outcome::Abandoned),
        _ => Err(StorageError::Serialization(format!("invalid outcome: {s}"))),
    }
}

pub(crate) fn map_best_record_row(row: &sqlx::sqlite::SqliteRow) -> Result<BestRecord, StorageError> {
    let challenge = parse_challenge(row.try_get::<String, _>("challenge").map_err(ser)?.as_str())?;
    let value = row
        .try_get::<Option<i64>, _>("value")
        .map_err(ser)?
        .map(|v| i64_to_u64("value", v))
        .transpose()?;
    Ok(BestRecord::from_persisted(challenge, value))
}

fn u32_col(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    u32_from_i64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

fn u64_col(row: &sqlx::sqlite::SqliteRow, field: &'static str) -> Result<u64, StorageError> {
    i64_to_u64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

pub(crate) fn map_summary_row(row: &sqlx::sqlite::SqliteRow) -> Result<SessionSummary, StorageError> {
    let challenge = parse_challenge(row.try_get::<String, _>("challenge").map_err(ser)?.as_str())?;
    let stats = SessionStats {
        score: u32_col(row, "score")?,
        streak: u32_col(row, "streak")?,
        best_streak: u32_col(row, "best_streak")?,
        level: u32_col(row, "level")?,
        answered: u32_col(row, "answered")?,
        correct: u32_col(row, "correct")?,
        elapsed_ms: u64_col(row, "elapsed_ms")?,
        reaction_total_ms: u64_col(row, "reaction_total_ms")?,
        reactions: u32_col(row, "reactions")?,
    };
    let reason = parse_end_reason(row.try_get::<String, _>("reason").map_err(ser)?.as_str())?;
    let outcome = parse_outcome(row.try_get::<String, _>("outcome").map_err(ser)?.as_str())?;
    let previous_best = row
        .try_get::<Option<i64>, _>("previous_best")
        .map_err(ser)?
        .map(|v| i64_to_u64("previous_best", v))
        .transpose()?;

    SessionSummary::from_stats(
        challenge,
        stats,
        reason,
        outcome,
        previous_best,
        row.try_get("started_at").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_summary_row_with_id(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SessionSummaryRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(SessionSummaryRow::new(id, map_summary_row(row)?))
}
