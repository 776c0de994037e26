use chrono::{DateTime, Utc};
use std::fmt;

use brain_core::i18n::{Catalog, LanguageCode, TextKey};
use brain_core::model::{ChallengeKind, EndReason, Outcome, RecordKind, SessionSummary};
use brain_core::time::{format_clock, format_tenths};
use storage::repository::SessionSummaryRow;

/// Storage identifier for a persisted session summary.
pub type SessionSummaryId = i64;

/// Text of the end-of-session dialog.
///
/// The title announces the outcome; the lines show what the challenge measures
/// followed by its current best.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryMessage {
    pub title: String,
    pub lines: Vec<String>,
}

impl SummaryMessage {
    #[must_use]
    pub fn render(summary: &SessionSummary, catalog: &dyn Catalog, language: LanguageCode) -> Self {
        let text = move |key| catalog.text(language, key);
        let title = match (summary.outcome(), summary.reason()) {
            (Outcome::NewRecord, _) => text(TextKey::NewRecord),
            (_, EndReason::TimeUp) => text(TextKey::TimeUp),
            (_, EndReason::OutOfLives | EndReason::Mistake) => text(TextKey::GameOver),
            _ => text(TextKey::Completed),
        }
        .to_string();

        let kind = summary.challenge().record_kind();
        let stats = summary.stats();
        let mut lines = Vec::new();
        match kind {
            RecordKind::HighestScore => {
                lines.push(format!("{}: {}", text(TextKey::Score), summary.score()));
            }
            RecordKind::HighestLevel => {
                lines.push(format!("{}: {}", text(TextKey::Level), summary.level()));
            }
            RecordKind::HighestStreak => {
                lines.push(format!("{}: {}", text(TextKey::Streak), summary.best_streak()));
                lines.push(format!(
                    "{}: {}%",
                    text(TextKey::Accuracy),
                    stats.accuracy_percent()
                ));
            }
            RecordKind::LowestTime => {
                lines.push(format!(
                    "{}: {}",
                    text(TextKey::Time),
                    format_tenths(summary.elapsed_ms())
                ));
            }
            RecordKind::LongestTime => {
                lines.push(format!(
                    "{}: {}",
                    text(TextKey::Time),
                    format_clock(summary.elapsed_ms())
                ));
                lines.push(format!("{}: {}", text(TextKey::Score), summary.score()));
            }
        }
        if summary.challenge() == ChallengeKind::ReflexRush {
            if let Some(avg) = stats.average_reaction_ms() {
                lines.push(format!("{}: {avg}ms", text(TextKey::Reaction)));
            }
        }

        let best = if summary.is_new_record() {
            Some(summary.record_value())
        } else {
            summary.previous_best()
        };
        if let Some(best) = best {
            lines.push(format!("{}: {}", text(TextKey::Best), format_record(kind, best)));
        }

        Self { title, lines }
    }
}

impl fmt::Display for SummaryMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)?;
        for line in &self.lines {
            write!(f, "\n{line}")?;
        }
        Ok(())
    }
}

/// Record value as shown to the player.
#[must_use]
pub fn format_record(kind: RecordKind, value: u64) -> String {
    match kind {
        RecordKind::LowestTime => format_tenths(value),
        RecordKind::LongestTime => format_clock(value),
        RecordKind::HighestScore | RecordKind::HighestLevel | RecordKind::HighestStreak => {
            value.to_string()
        }
    }
}

/// Presentation-agnostic history entry; the caller formats timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummaryListItem {
    pub id: SessionSummaryId,
    pub challenge: ChallengeKind,
    pub completed_at: DateTime<Utc>,
    pub outcome: Outcome,
    pub reason: EndReason,
    pub record_value: u64,
}

impl SessionSummaryListItem {
    #[must_use]
    pub fn from_row(row: &SessionSummaryRow) -> Self {
        let summary = &row.summary;
        Self {
            id: row.id,
            challenge: summary.challenge(),
            completed_at: summary.completed_at(),
            outcome: summary.outcome(),
            reason: summary.reason(),
            record_value: summary.record_value(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::i18n::{EnglishCatalog, TableCatalog};
    use brain_core::model::SessionStats;
    use brain_core::time::fixed_now;
    use chrono::Duration;

    fn summary(
        challenge: ChallengeKind,
        stats: SessionStats,
        reason: EndReason,
        outcome: Outcome,
        previous_best: Option<u64>,
    ) -> SessionSummary {
        let started = fixed_now();
        SessionSummary::from_stats(
            challenge,
            stats,
            reason,
            outcome,
            previous_best,
            started,
            started + Duration::seconds(60),
        )
        .unwrap()
    }

    #[test]
    fn score_challenge_after_time_up() {
        let stats = SessionStats {
            score: 17,
            ..SessionStats::fresh()
        };
        let s = summary(
            ChallengeKind::MathSprint,
            stats,
            EndReason::TimeUp,
            Outcome::Completed,
            Some(20),
        );
        let message = SummaryMessage::render(&s, &EnglishCatalog, LanguageCode::En);
        assert_eq!(message.title, "Time's Up!");
        assert_eq!(message.lines, vec!["Score: 17", "Best: 20"]);
        assert_eq!(message.to_string(), "Time's Up!\nScore: 17\nBest: 20");
    }

    #[test]
    fn new_time_record_shows_itself_as_best() {
        let stats = SessionStats {
            score: 25,
            elapsed_ms: 14_230,
            ..SessionStats::fresh()
        };
        let s = summary(
            ChallengeKind::NumberTap,
            stats,
            EndReason::Finished,
            Outcome::NewRecord,
            Some(16_000),
        );
        let message = SummaryMessage::render(&s, &EnglishCatalog, LanguageCode::En);
        assert_eq!(message.title, "New Record!");
        assert_eq!(message.lines, vec!["Time: 14.2s", "Best: 14.2s"]);
    }

    #[test]
    fn lost_lives_is_game_over_in_the_chosen_language() {
        let stats = SessionStats {
            score: 40,
            elapsed_ms: 95_000,
            ..SessionStats::fresh()
        };
        let s = summary(
            ChallengeKind::MathStream,
            stats,
            EndReason::OutOfLives,
            Outcome::Completed,
            None,
        );
        let catalog = TableCatalog::new()
            .with(LanguageCode::Es, TextKey::GameOver, "Fin del juego")
            .with(LanguageCode::Es, TextKey::Time, "Tiempo");
        let message = SummaryMessage::render(&s, &catalog, LanguageCode::Es);
        assert_eq!(message.title, "Fin del juego");
        assert_eq!(message.lines, vec!["Tiempo: 1:35", "Score: 40"]);
    }

    #[test]
    fn builtin_catalog_translates_the_title() {
        let stats = SessionStats {
            score: 25,
            elapsed_ms: 9_100,
            ..SessionStats::fresh()
        };
        let s = summary(
            ChallengeKind::NumberTap,
            stats,
            EndReason::Finished,
            Outcome::NewRecord,
            None,
        );
        let message = SummaryMessage::render(&s, &TableCatalog::builtin(), LanguageCode::De);
        assert_eq!(message.title, "Neuer Rekord!");
        assert_eq!(message.lines, vec!["Zeit: 9.1s", "Beste: 9.1s"]);
    }

    #[test]
    fn formats_record_values_by_kind() {
        assert_eq!(format_record(RecordKind::LowestTime, 9_950), "9.9s");
        assert_eq!(format_record(RecordKind::LongestTime, 61_000), "1:01");
        assert_eq!(format_record(RecordKind::HighestLevel, 7), "7");
    }
}
