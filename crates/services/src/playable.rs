//! Type-erased access to any challenge session, for callers that pick the
//! challenge at runtime.

use brain_core::Clock;
use brain_core::model::{
    BestRecord, ChallengeKind, ChallengeSettings, SessionStatus, SessionSummary,
};

use crate::challenges::{
    DivisionRules, MathFactsRules, MathSprintRules, MathStreamRules, MathZenRules,
    MemoryRules, MentalArithmeticRules, NumberTapRules, PatternMatchRules, PatternPathRules,
    PrimeHunterRules, ReflexRushRules, SequenceMasterRules,
};
use crate::engine::ChallengeRules;
use crate::error::SessionError;
use crate::sessions::{AnswerResult, ChallengeSession, SessionProgress, TickOutcome};

/// A challenge session driven through text input.
pub trait PlayableSession: Send {
    fn kind(&self) -> ChallengeKind;

    fn status(&self) -> SessionStatus;

    fn tick_ms(&self) -> u64;

    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if the session is running.
    fn start(&mut self) -> Result<(), SessionError>;

    /// # Errors
    ///
    /// Returns `SessionError` if ending the session fails.
    fn tick(&mut self, dt_ms: u64) -> Result<TickOutcome, SessionError>;

    /// # Errors
    ///
    /// Returns `SessionError` if the input cannot be accepted right now.
    fn submit_text(&mut self, input: &str) -> Result<Option<AnswerResult>, SessionError>;

    /// # Errors
    ///
    /// Returns `SessionError` if ending the session fails.
    fn stop(&mut self) -> Result<(), SessionError>;

    fn prompt(&self) -> Option<String>;

    /// Current counters and clocks.
    fn snapshot(&self) -> SessionProgress;

    fn summary(&self) -> Option<&SessionSummary>;

    fn best_record(&self) -> BestRecord;

    fn load_best_record(&mut self, record: BestRecord);
}

impl<R> PlayableSession for ChallengeSession<R>
where
    R: ChallengeRules,
{
    fn kind(&self) -> ChallengeKind {
        ChallengeSession::kind(self)
    }

    fn status(&self) -> SessionStatus {
        ChallengeSession::status(self)
    }

    fn tick_ms(&self) -> u64 {
        ChallengeSession::tick_ms(self)
    }

    fn start(&mut self) -> Result<(), SessionError> {
        ChallengeSession::start(self).map(|_| ())
    }

    fn tick(&mut self, dt_ms: u64) -> Result<TickOutcome, SessionError> {
        ChallengeSession::tick(self, dt_ms)
    }

    fn submit_text(&mut self, input: &str) -> Result<Option<AnswerResult>, SessionError> {
        ChallengeSession::submit_text(self, input)
    }

    fn stop(&mut self) -> Result<(), SessionError> {
        ChallengeSession::stop(self)
    }

    fn prompt(&self) -> Option<String> {
        ChallengeSession::prompt(self)
    }

    fn snapshot(&self) -> SessionProgress {
        ChallengeSession::progress(self)
    }

    fn summary(&self) -> Option<&SessionSummary> {
        ChallengeSession::summary(self)
    }

    fn best_record(&self) -> BestRecord {
        ChallengeSession::best_record(self)
    }

    fn load_best_record(&mut self, record: BestRecord) {
        self.set_best_record(record);
    }
}

fn boxed<R>(rules: R, seed: Option<u64>, clock: Clock) -> Box<dyn PlayableSession>
where
    R: ChallengeRules + 'static,
{
    let session = match seed {
        Some(seed) => ChallengeSession::with_seed(rules, seed),
        None => ChallengeSession::new(rules),
    };
    Box::new(session.with_clock(clock))
}

/// Build an idle session for `kind` on the system clock.
///
/// `settings` supplies the Division difficulty and the Math Facts table; other
/// challenges ignore it. A `seed` makes the problem stream reproducible.
#[must_use]
pub fn build_session(
    kind: ChallengeKind,
    settings: &ChallengeSettings,
    seed: Option<u64>,
) -> Box<dyn PlayableSession> {
    build_session_with_clock(kind, settings, seed, Clock::default_clock())
}

/// [`build_session`] with an explicit wall clock.
#[must_use]
pub fn build_session_with_clock(
    kind: ChallengeKind,
    settings: &ChallengeSettings,
    seed: Option<u64>,
    clock: Clock,
) -> Box<dyn PlayableSession> {
    match kind {
        ChallengeKind::NumberTap => boxed(NumberTapRules::new(), seed, clock),
        ChallengeKind::MathSprint => boxed(MathSprintRules, seed, clock),
        ChallengeKind::ReflexRush => boxed(ReflexRushRules, seed, clock),
        ChallengeKind::MemoryMatrix => boxed(MemoryRules::matrix(), seed, clock),
        ChallengeKind::MemoryNumbers => boxed(MemoryRules::numbers(), seed, clock),
        ChallengeKind::PatternMatch => boxed(PatternMatchRules, seed, clock),
        ChallengeKind::PatternPath => boxed(PatternPathRules, seed, clock),
        ChallengeKind::SequenceMaster => boxed(SequenceMasterRules, seed, clock),
        ChallengeKind::PrimeHunter => boxed(PrimeHunterRules::new(), seed, clock),
        ChallengeKind::DivisionChallenge => {
            boxed(DivisionRules::new(settings.difficulty()), seed, clock)
        }
        ChallengeKind::MentalArithmetic => boxed(MentalArithmeticRules, seed, clock),
        ChallengeKind::MathFactMaster => boxed(MathFactsRules::new(settings.table()), seed, clock),
        ChallengeKind::InfiniteMathZen => boxed(MathZenRules, seed, clock),
        ChallengeKind::MathStream => boxed(MathStreamRules::new(), seed, clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::time::fixed_clock;

    #[test]
    fn every_challenge_builds_and_starts() {
        let settings = ChallengeSettings::default();
        for kind in ChallengeKind::ALL {
            let mut session = build_session_with_clock(kind, &settings, Some(3), fixed_clock());
            assert_eq!(session.kind(), kind);
            assert_eq!(session.status(), SessionStatus::Idle);
            session.start().unwrap();
            assert!(session.prompt().is_some(), "{kind}");
            assert_eq!(session.snapshot().score, 0);
            assert_eq!(session.snapshot().streak, 0);
            session.stop().unwrap();
            assert_eq!(session.status(), SessionStatus::Ended);
            assert!(session.summary().is_some());
        }
    }

    #[test]
    fn loaded_record_must_match_the_challenge() {
        let mut session =
            build_session(ChallengeKind::MathSprint, &ChallengeSettings::default(), Some(1));
        session.load_best_record(BestRecord::from_persisted(ChallengeKind::NumberTap, Some(9)));
        assert_eq!(session.best_record().value(), None);
        session.load_best_record(BestRecord::from_persisted(ChallengeKind::MathSprint, Some(9)));
        assert_eq!(session.best_record().value(), Some(9));
    }
}
