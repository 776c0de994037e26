use brain_core::Clock;
use brain_core::model::{
    BestRecord, ChallengeKind, EndReason, Outcome, RoundId, SessionStats, SessionStatus,
    SessionSummary,
};
use brain_core::time::SessionClock;
use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::progress::{AnswerResult, SessionProgress};
use crate::engine::{ChallengeRules, Judgement, RoundState, Verdict};
use crate::error::SessionError;

//
// ─── ROUND ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct Round<P> {
    id: RoundId,
    problem: P,
    elapsed_ms: u64,
}

/// What a single tick did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The session is not running; nothing changed.
    Inactive,
    Running,
    RoundTimedOut(AnswerResult),
    Ended(EndReason),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One play-through of a challenge, driven by its [`ChallengeRules`].
///
/// `Idle --start--> Active --(time up | out of lives | mistake | finished | stop)--> Ended`,
/// and `Ended --start--> Active` again. The status is checked first by every
/// operation, so a tick and a submission racing each other can never both score
/// or end the session twice.
pub struct ChallengeSession<R: ChallengeRules> {
    rules: R,
    rng: StdRng,
    clock: Clock,
    status: SessionStatus,
    stats: SessionStats,
    lives: Option<u32>,
    game_clock: SessionClock,
    last_round: RoundId,
    round: Option<Round<R::Problem>>,
    best: BestRecord,
    started_at: Option<DateTime<Utc>>,
    summary: Option<SessionSummary>,
}

impl<R: ChallengeRules> ChallengeSession<R> {
    /// Create an idle session seeded from the operating system.
    #[must_use]
    pub fn new(rules: R) -> Self {
        Self::with_rng(rules, StdRng::from_os_rng())
    }

    /// Create an idle session whose problems are reproducible from `seed`.
    #[must_use]
    pub fn with_seed(rules: R, seed: u64) -> Self {
        Self::with_rng(rules, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rules: R, rng: StdRng) -> Self {
        let kind = rules.kind();
        let game_clock = rules.clock().build();
        Self {
            rules,
            rng,
            clock: Clock::default_clock(),
            status: SessionStatus::Idle,
            stats: SessionStats::fresh(),
            lives: None,
            game_clock,
            last_round: RoundId::default(),
            round: None,
            best: BestRecord::new(kind),
            started_at: None,
            summary: None,
        }
    }

    /// Use the given wall clock for `started_at` / `completed_at`.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Start from a previously stored best record.
    #[must_use]
    pub fn with_best_record(mut self, record: BestRecord) -> Self {
        self.set_best_record(record);
        self
    }

    pub(crate) fn set_best_record(&mut self, record: BestRecord) {
        if record.challenge() == self.kind() {
            self.best = record;
        } else {
            tracing::warn!(
                expected = self.kind().id(),
                got = record.challenge().id(),
                "ignoring best record of another challenge"
            );
        }
    }

    #[must_use]
    pub fn kind(&self) -> ChallengeKind {
        self.rules.kind()
    }

    #[must_use]
    pub fn rules(&self) -> &R {
        &self.rules
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn lives(&self) -> Option<u32> {
        self.lives
    }

    #[must_use]
    pub fn game_clock(&self) -> &SessionClock {
        &self.game_clock
    }

    #[must_use]
    pub fn tick_ms(&self) -> u64 {
        self.rules.tick_ms()
    }

    #[must_use]
    pub fn best_record(&self) -> BestRecord {
        self.best
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Id of the open round, if any.
    #[must_use]
    pub fn round_id(&self) -> Option<RoundId> {
        self.round.as_ref().map(|round| round.id)
    }

    #[must_use]
    pub fn problem(&self) -> Option<&R::Problem> {
        self.round.as_ref().map(|round| &round.problem)
    }

    /// Text for the open round.
    #[must_use]
    pub fn prompt(&self) -> Option<String> {
        if self.status != SessionStatus::Active {
            return None;
        }
        let state = self.round_state();
        self.round
            .as_ref()
            .map(|round| self.rules.describe(&round.problem, &state))
    }

    #[must_use]
    pub fn is_input_locked(&self) -> bool {
        self.round
            .as_ref()
            .is_some_and(|round| round.elapsed_ms < self.rules.reveal_ms(&round.problem))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let round_remaining_ms = self.round.as_ref().and_then(|round| {
            self.rules
                .round_limit_ms(&round.problem)
                .map(|limit| limit.saturating_sub(round.elapsed_ms))
        });
        SessionProgress {
            status: self.status,
            round: self.last_round,
            score: self.stats.score,
            streak: self.stats.streak,
            best_streak: self.stats.best_streak,
            level: self.stats.level,
            lives: self.lives,
            elapsed_ms: self.game_clock.elapsed_ms(),
            remaining_ms: self.game_clock.remaining_ms(),
            round_remaining_ms,
            accuracy_percent: self.stats.accuracy_percent(),
            input_locked: self.is_input_locked(),
        }
    }

    fn round_state(&self) -> RoundState {
        RoundState {
            score: self.stats.score,
            streak: self.stats.streak,
            level: self.stats.level,
            lives: self.lives,
            round_elapsed_ms: self.round.as_ref().map_or(0, |round| round.elapsed_ms),
        }
    }

    /// Begin a session, resetting all counters and generating the first problem.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if the session is running.
    pub fn start(&mut self) -> Result<RoundId, SessionError> {
        if self.status == SessionStatus::Active {
            return Err(SessionError::AlreadyActive);
        }
        self.rules.reset();
        self.stats = SessionStats::fresh();
        self.lives = self.rules.starting_lives();
        self.game_clock = self.rules.clock().build();
        self.summary = None;
        self.started_at = Some(self.clock.now());
        self.status = SessionStatus::Active;
        tracing::info!(challenge = self.kind().id(), "session started");
        Ok(self.next_round())
    }

    fn next_round(&mut self) -> RoundId {
        let state = RoundState {
            round_elapsed_ms: 0,
            ..self.round_state()
        };
        let problem = self.rules.generate(&state, &mut self.rng);
        self.last_round = self.last_round.next();
        self.round = Some(Round {
            id: self.last_round,
            problem,
            elapsed_ms: 0,
        });
        self.last_round
    }

    /// Advance the game clock by `dt_ms`.
    ///
    /// A countdown reaching zero ends the session; a per-round deadline passing
    /// hands the round to the rules' timeout handler.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the summary cannot be built.
    pub fn tick(&mut self, dt_ms: u64) -> Result<TickOutcome, SessionError> {
        if self.status != SessionStatus::Active {
            return Ok(TickOutcome::Inactive);
        }
        self.game_clock.tick(dt_ms);
        self.stats.elapsed_ms = self.game_clock.elapsed_ms();
        // an expired clock keeps ending the session until the summary is built
        if self.game_clock.is_expired() {
            self.finish(EndReason::TimeUp)?;
            return Ok(TickOutcome::Ended(EndReason::TimeUp));
        }

        let Some(round) = self.round.as_mut() else {
            return Ok(TickOutcome::Running);
        };
        round.elapsed_ms = round.elapsed_ms.saturating_add(dt_ms);
        let timed_out = self
            .rules
            .round_limit_ms(&round.problem)
            .is_some_and(|limit| round.elapsed_ms >= limit);
        if !timed_out {
            return Ok(TickOutcome::Running);
        }

        let state = self.round_state();
        let judgement = self.rules.on_round_timeout(&state);
        tracing::debug!(challenge = self.kind().id(), "round timed out");
        let result = self.apply(judgement)?;
        Ok(TickOutcome::RoundTimedOut(result))
    }

    /// Submit an answer to the round `round`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotActive` outside an active session,
    /// `SessionError::StaleRound` if `round` is no longer open, and
    /// `SessionError::InputLocked` during a reveal phase.
    pub fn submit(&mut self, round: RoundId, answer: R::Answer) -> Result<AnswerResult, SessionError> {
        self.ensure_accepting(Some(round))?;
        let state = self.round_state();
        let Some(open) = self.round.as_ref() else {
            return Err(SessionError::NotActive);
        };
        let judgement = self.rules.judge(&open.problem, answer, &state);
        self.apply(judgement)
    }

    /// Parse and submit free text for the open round.
    ///
    /// Empty or unparsable input is ignored and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Same as [`ChallengeSession::submit`].
    pub fn submit_text(&mut self, input: &str) -> Result<Option<AnswerResult>, SessionError> {
        self.ensure_accepting(None)?;
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let Some(open) = self.round.as_ref() else {
            return Err(SessionError::NotActive);
        };
        let round = open.id;
        match self.rules.parse_answer(&open.problem, trimmed) {
            Some(answer) => self.submit(round, answer).map(Some),
            None => Ok(None),
        }
    }

    fn ensure_accepting(&self, round: Option<RoundId>) -> Result<(), SessionError> {
        if self.status != SessionStatus::Active {
            return Err(SessionError::NotActive);
        }
        let Some(open) = self.round.as_ref() else {
            return Err(SessionError::NotActive);
        };
        if let Some(submitted) = round.filter(|submitted| *submitted != open.id) {
            tracing::debug!(%submitted, current = %open.id, "stale submission rejected");
            return Err(SessionError::StaleRound {
                submitted,
                current: open.id,
            });
        }
        if self.is_input_locked() {
            return Err(SessionError::InputLocked);
        }
        Ok(())
    }

    fn apply(&mut self, judgement: Judgement) -> Result<AnswerResult, SessionError> {
        let reaction_ms = self.round.as_ref().map_or(0, |round| round.elapsed_ms);
        let stats = &mut self.stats;
        match judgement.verdict() {
            Verdict::Correct => {
                stats.answered += 1;
                stats.correct += 1;
                stats.score = stats.score.saturating_add(judgement.points());
                stats.streak += 1;
                stats.best_streak = stats.best_streak.max(stats.streak);
                stats.reaction_total_ms = stats.reaction_total_ms.saturating_add(reaction_ms);
                stats.reactions += 1;
            }
            Verdict::Wrong => stats.answered += 1,
            Verdict::Step | Verdict::Timeout => {}
        }
        if judgement.resets_streak() {
            stats.streak = 0;
        }
        if judgement.levels_up() {
            stats.level += 1;
        }

        let mut end = judgement.end();
        if judgement.penalty_ms() > 0 && self.game_clock.penalize(judgement.penalty_ms()) {
            end = end.or(Some(EndReason::TimeUp));
        }
        self.stats.elapsed_ms = self.game_clock.elapsed_ms();
        if judgement.loses_life() {
            if let Some(lives) = self.lives.as_mut() {
                *lives = lives.saturating_sub(1);
                if *lives == 0 {
                    end = end.or(Some(EndReason::OutOfLives));
                }
            }
        }

        if let Some(reason) = end {
            self.finish(reason)?;
        } else if judgement.advances() {
            self.next_round();
        }

        Ok(AnswerResult {
            feedback: judgement.verdict().feedback(),
            points: judgement.points(),
            round: self.last_round,
            ended: end.is_some(),
        })
    }

    /// End the session on the player's request.
    ///
    /// Reports `Abandoned` and leaves the best record untouched, unless the rules
    /// record a stop as a normal finish. Does nothing if the session is not running.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Summary` if the summary cannot be built.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        let reason = self.rules.stop_reason();
        self.finish(reason)
    }

    fn finish(&mut self, reason: EndReason) -> Result<(), SessionError> {
        if self.status != SessionStatus::Active {
            return Ok(());
        }
        let mut stats = self.stats;
        stats.elapsed_ms = self.game_clock.elapsed_ms();

        // nothing is committed until the summary is built
        let previous_best = self.best.value();
        let mut best = self.best;
        let outcome = if reason == EndReason::Stopped {
            Outcome::Abandoned
        } else if best.offer(stats.record_value(best.kind())) {
            Outcome::NewRecord
        } else {
            Outcome::Completed
        };

        let completed_at = self.clock.now();
        let summary = SessionSummary::from_stats(
            self.kind(),
            stats,
            reason,
            outcome,
            previous_best,
            self.started_at.unwrap_or(completed_at),
            completed_at,
        )?;

        self.status = SessionStatus::Ended;
        self.stats = stats;
        self.best = best;
        tracing::info!(
            challenge = self.kind().id(),
            reason = reason.as_str(),
            outcome = outcome.as_str(),
            score = summary.score(),
            "session ended"
        );
        if outcome == Outcome::NewRecord {
            tracing::info!(challenge = self.kind().id(), value = ?self.best.value(), "new record");
        }
        self.summary = Some(summary);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brain_core::model::{Feedback, SessionSummaryError};
    use brain_core::time::{ClockSpec, fixed_clock, fixed_now};
    use chrono::Duration;
    use rand::Rng;

    /// Answer the shown number back; countdown of three seconds.
    struct EchoRules {
        lives: Option<u32>,
        round_limit: Option<u64>,
        reveal: u64,
    }

    impl EchoRules {
        fn plain() -> Self {
            Self {
                lives: None,
                round_limit: None,
                reveal: 0,
            }
        }
    }

    impl ChallengeRules for EchoRules {
        type Problem = i64;
        type Answer = i64;

        fn kind(&self) -> ChallengeKind {
            ChallengeKind::MathSprint
        }

        fn clock(&self) -> ClockSpec {
            ClockSpec::Countdown { limit_ms: 3_000 }
        }

        fn tick_ms(&self) -> u64 {
            1_000
        }

        fn starting_lives(&self) -> Option<u32> {
            self.lives
        }

        fn generate<G: Rng + ?Sized>(&mut self, _state: &RoundState, rng: &mut G) -> i64 {
            rng.random_range(1..100)
        }

        fn parse_answer(&self, _problem: &i64, input: &str) -> Option<i64> {
            input.parse().ok()
        }

        fn judge(&mut self, problem: &i64, answer: i64, state: &RoundState) -> Judgement {
            if *problem == answer {
                Judgement::correct(1 + state.streak.min(2))
            } else if self.lives.is_some() {
                Judgement::wrong().losing_life()
            } else {
                Judgement::wrong().with_penalty(1_000)
            }
        }

        fn round_limit_ms(&self, _problem: &i64) -> Option<u64> {
            self.round_limit
        }

        fn reveal_ms(&self, _problem: &i64) -> u64 {
            self.reveal
        }

        fn describe(&self, problem: &i64, _state: &RoundState) -> String {
            problem.to_string()
        }
    }

    fn session(rules: EchoRules) -> ChallengeSession<EchoRules> {
        ChallengeSession::with_seed(rules, 7).with_clock(fixed_clock())
    }

    fn answer(session: &ChallengeSession<EchoRules>) -> i64 {
        *session.problem().unwrap()
    }

    #[test]
    fn start_resets_counters() {
        let mut s = session(EchoRules::plain());
        assert_eq!(s.status(), SessionStatus::Idle);
        assert!(matches!(s.submit_text("1"), Err(SessionError::NotActive)));

        s.start().unwrap();
        let round = s.round_id().unwrap();
        s.submit(round, answer(&s)).unwrap();
        assert_eq!(s.stats().score, 1);
        assert!(matches!(s.start(), Err(SessionError::AlreadyActive)));

        s.stop().unwrap();
        s.start().unwrap();
        assert_eq!(s.stats().score, 0);
        assert_eq!(s.stats().streak, 0);
        assert_eq!(s.status(), SessionStatus::Active);
    }

    #[test]
    fn one_correct_answer_consumes_one_round() {
        let mut s = session(EchoRules::plain());
        let first = s.start().unwrap();
        let value = answer(&s);

        let result = s.submit(first, value).unwrap();
        assert_eq!(result.feedback, Feedback::Success);
        assert!(result.round > first);

        let err = s.submit(first, value).unwrap_err();
        assert!(matches!(err, SessionError::StaleRound { .. }));
        assert_eq!(s.stats().score, 1);
        assert_eq!(s.stats().correct, 1);
    }

    #[test]
    fn wrong_answer_resets_streak_and_keeps_round() {
        let mut s = session(EchoRules::plain());
        let round = s.start().unwrap();
        s.submit(round, answer(&s)).unwrap();
        let round = s.round_id().unwrap();
        s.submit(round, answer(&s)).unwrap();
        assert_eq!(s.stats().streak, 2);
        assert_eq!(s.stats().score, 3);

        let round = s.round_id().unwrap();
        let result = s.submit(round, -1).unwrap();
        assert_eq!(result.feedback, Feedback::Error);
        assert_eq!(result.round, round);
        assert_eq!(s.stats().streak, 0);
        assert_eq!(s.stats().best_streak, 2);
        assert_eq!(s.game_clock().remaining_ms(), Some(2_000));
    }

    #[test]
    fn ignored_text_does_not_judge() {
        let mut s = session(EchoRules::plain());
        s.start().unwrap();
        assert_eq!(s.submit_text("   ").unwrap(), None);
        assert_eq!(s.submit_text("abc").unwrap(), None);
        assert_eq!(s.stats().answered, 0);
        let value = answer(&s).to_string();
        assert_eq!(
            s.submit_text(&value).unwrap().map(|r| r.feedback),
            Some(Feedback::Success)
        );
    }

    #[test]
    fn countdown_ends_exactly_once() {
        let mut s = session(EchoRules::plain());
        s.start().unwrap();
        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Running);
        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Running);
        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Ended(EndReason::TimeUp));
        assert_eq!(s.game_clock().remaining_ms(), Some(0));
        assert_eq!(s.status(), SessionStatus::Ended);

        let summary = s.summary().cloned().unwrap();
        assert_eq!(summary.reason(), EndReason::TimeUp);
        assert_eq!(summary.outcome(), Outcome::Completed);

        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Inactive);
        assert!(matches!(s.submit_text("5"), Err(SessionError::NotActive)));
        s.stop().unwrap();
        assert_eq!(s.summary(), Some(&summary));
    }

    #[test]
    fn penalty_can_end_the_session() {
        let mut s = session(EchoRules::plain());
        s.start().unwrap();
        s.tick(1_000).unwrap();
        s.tick(1_000).unwrap();
        let result = s.submit_text("-5").unwrap().unwrap();
        assert!(result.ended);
        assert_eq!(s.summary().unwrap().reason(), EndReason::TimeUp);
    }

    #[test]
    fn improved_score_is_a_new_record() {
        let mut record = BestRecord::new(ChallengeKind::MathSprint);
        record.offer(1);
        let mut s = session(EchoRules::plain()).with_best_record(record);
        let round = s.start().unwrap();
        s.submit(round, answer(&s)).unwrap();
        let round = s.round_id().unwrap();
        s.submit(round, answer(&s)).unwrap();
        for _ in 0..3 {
            s.tick(1_000).unwrap();
        }
        let summary = s.summary().unwrap();
        assert_eq!(summary.outcome(), Outcome::NewRecord);
        assert_eq!(summary.previous_best(), Some(1));
        assert_eq!(s.best_record().value(), Some(3));
    }

    #[test]
    fn stopping_is_abandoned_and_keeps_record() {
        let mut s = session(EchoRules::plain());
        let round = s.start().unwrap();
        s.submit(round, answer(&s)).unwrap();
        s.stop().unwrap();
        assert_eq!(s.summary().unwrap().outcome(), Outcome::Abandoned);
        assert_eq!(s.best_record().value(), None);
    }

    #[test]
    fn losing_every_life_ends_the_session() {
        let mut s = session(EchoRules {
            lives: Some(2),
            ..EchoRules::plain()
        });
        s.start().unwrap();
        s.submit_text("-1").unwrap();
        assert_eq!(s.lives(), Some(1));
        let result = s.submit_text("-1").unwrap().unwrap();
        assert!(result.ended);
        assert_eq!(s.lives(), Some(0));
        assert_eq!(s.summary().unwrap().reason(), EndReason::OutOfLives);
    }

    #[test]
    fn round_deadline_moves_on_with_a_warning() {
        let mut s = session(EchoRules {
            round_limit: Some(2_000),
            ..EchoRules::plain()
        });
        let first = s.start().unwrap();
        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Running);
        let TickOutcome::RoundTimedOut(result) = s.tick(1_000).unwrap() else {
            panic!("expected a round timeout");
        };
        assert_eq!(result.feedback, Feedback::Warning);
        assert!(result.round > first);
        assert_eq!(s.stats().answered, 0);
    }

    #[test]
    fn reveal_phase_locks_input() {
        let mut s = session(EchoRules {
            reveal: 1_500,
            ..EchoRules::plain()
        });
        let round = s.start().unwrap();
        assert!(s.progress().input_locked);
        assert!(matches!(
            s.submit(round, answer(&s)),
            Err(SessionError::InputLocked)
        ));
        s.tick(1_000).unwrap();
        s.tick(1_000).unwrap();
        assert!(!s.is_input_locked());
        assert_eq!(s.submit(round, answer(&s)).unwrap().feedback, Feedback::Success);
    }

    #[test]
    fn failed_summary_leaves_session_running() {
        let mut s = session(EchoRules::plain());
        let round = s.start().unwrap();
        s.submit(round, answer(&s)).unwrap();
        let round = s.round_id().unwrap();
        s.submit(round, answer(&s)).unwrap();

        // wall clock stepped back behind the start
        s.clock = Clock::fixed(fixed_now() - Duration::seconds(5));
        s.tick(1_000).unwrap();
        s.tick(1_000).unwrap();
        let err = s.tick(1_000).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Summary(SessionSummaryError::InvalidTimeRange)
        ));
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.summary(), None);
        assert_eq!(s.best_record().value(), None);

        s.clock = fixed_clock();
        assert_eq!(s.tick(1_000).unwrap(), TickOutcome::Ended(EndReason::TimeUp));
        assert_eq!(s.summary().unwrap().outcome(), Outcome::NewRecord);
        assert_eq!(s.best_record().value(), Some(3));
    }

    #[test]
    fn seeded_sessions_replay() {
        let mut a = session(EchoRules::plain());
        let mut b = session(EchoRules::plain());
        a.start().unwrap();
        b.start().unwrap();
        assert_eq!(a.problem(), b.problem());
        assert_eq!(a.prompt(), b.prompt());
    }
}
