mod progress;
mod session;
mod view;
mod workflow;

pub use crate::error::SessionError;
pub use progress::{AnswerResult, SessionProgress};
pub use session::{ChallengeSession, TickOutcome};
pub use view::{SessionSummaryId, SessionSummaryListItem, SummaryMessage, format_record};
pub use workflow::SessionLoopService;
