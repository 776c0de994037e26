mod challenge;
mod ids;
mod record;
mod session;
mod settings;

pub use challenge::{Category, ChallengeKind, ParseChallengeError};
pub use ids::{ParseIdError, RoundId};
pub use record::{BestRecord, RecordKind, STARTING_LEVEL};
pub use session::{
    EndReason, Feedback, Outcome, SessionStats, SessionStatus, SessionSummary, SessionSummaryError,
};
pub use settings::{ChallengeSettings, ChallengeSettingsDraft, Difficulty, SettingsError};
