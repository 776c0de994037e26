#![forbid(unsafe_code)]

pub mod challenges;
pub mod engine;
pub mod error;
pub mod playable;
pub mod runner;
pub mod screen;
pub mod sessions;

pub use brain_core::Clock;
pub use sessions as session;

pub use engine::{ChallengeRules, Judgement, RoundState, Verdict};
pub use error::SessionError;
pub use playable::{PlayableSession, build_session, build_session_with_clock};
pub use runner::{ActiveChallenge, SessionEvent};
pub use screen::{ChallengeScreen, ScreenProps};

pub use sessions::{
    AnswerResult, ChallengeSession, SessionLoopService, SessionProgress, SessionSummaryId,
    SessionSummaryListItem, SummaryMessage, TickOutcome,
};
