//! Drives a session on the tokio clock.
//!
//! [`ActiveChallenge`] owns the session and one tick task. Ticks, player input
//! and stop requests all go through the same mutex, and the session's own
//! status check decides which of them lands first. Dropping the handle aborts
//! the tick task.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use brain_core::model::{BestRecord, SessionSummary};

use crate::error::SessionError;
use crate::playable::PlayableSession;
use crate::sessions::{AnswerResult, SessionProgress, TickOutcome};

const EVENT_BUFFER: usize = 64;

type SharedSession = Arc<Mutex<Box<dyn PlayableSession>>>;

/// Published by the tick task.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Clock update; dropped when the receiver falls behind.
    Tick(SessionProgress),
    RoundTimedOut(AnswerResult),
    /// Sent once, whatever ended the session.
    Ended(SessionSummary),
    Failed(String),
}

/// A running challenge and its tick task.
pub struct ActiveChallenge {
    session: SharedSession,
    ticker: JoinHandle<()>,
}

impl ActiveChallenge {
    /// Start `session` and spawn its tick task on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::AlreadyActive` if the session is already running.
    pub fn spawn(
        mut session: Box<dyn PlayableSession>,
    ) -> Result<(Self, mpsc::Receiver<SessionEvent>), SessionError> {
        session.start()?;
        let tick_ms = session.tick_ms().max(1);
        let session: SharedSession = Arc::new(Mutex::new(session));
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let ticker = tokio::spawn(run_ticks(session.clone(), tick_ms, tx));
        Ok((Self { session, ticker }, rx))
    }

    /// # Errors
    ///
    /// Same as [`PlayableSession::submit_text`].
    pub async fn submit_text(&self, input: &str) -> Result<Option<AnswerResult>, SessionError> {
        self.session.lock().await.submit_text(input)
    }

    pub async fn prompt(&self) -> Option<String> {
        self.session.lock().await.prompt()
    }

    pub async fn progress(&self) -> SessionProgress {
        self.session.lock().await.snapshot()
    }

    /// The best record, including any improvement from the finished session.
    pub async fn best_record(&self) -> BestRecord {
        self.session.lock().await.best_record()
    }

    /// End the session; the tick task reports it as `Ended` and exits.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the summary cannot be built.
    pub async fn stop(&self) -> Result<(), SessionError> {
        self.session.lock().await.stop()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ticker.is_finished()
    }

    /// Cancel the tick task, then stop the session if it is still running.
    ///
    /// Returns the final summary, if the session produced one.
    pub async fn leave(self) -> Option<SessionSummary> {
        self.ticker.abort();
        let mut session = self.session.lock().await;
        if let Err(err) = session.stop() {
            tracing::warn!(error = %err, "failed to stop session on leave");
        }
        session.summary().cloned()
    }
}

impl Drop for ActiveChallenge {
    fn drop(&mut self) {
        self.ticker.abort();
    }
}

async fn run_ticks(session: SharedSession, tick_ms: u64, tx: mpsc::Sender<SessionEvent>) {
    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval.tick().await;
    let mut last = Instant::now();

    loop {
        interval.tick().await;
        let now = Instant::now();
        let dt_ms = u64::try_from(now.duration_since(last).as_millis()).unwrap_or(u64::MAX);
        last += Duration::from_millis(dt_ms);

        let event = {
            let mut guard = session.lock().await;
            match guard.tick(dt_ms) {
                Ok(TickOutcome::Running) => {
                    // progress updates are best effort
                    let _ = tx.try_send(SessionEvent::Tick(guard.snapshot()));
                    continue;
                }
                Ok(TickOutcome::RoundTimedOut(result)) => SessionEvent::RoundTimedOut(result),
                Ok(TickOutcome::Ended(_) | TickOutcome::Inactive) => match guard.summary() {
                    Some(summary) => SessionEvent::Ended(summary.clone()),
                    None => break,
                },
                Err(err) => {
                    tracing::error!(error = %err, "session tick failed");
                    SessionEvent::Failed(err.to_string())
                }
            }
        };

        let done = matches!(event, SessionEvent::Ended(_) | SessionEvent::Failed(_));
        if tx.send(event).await.is_err() || done {
            break;
        }
    }
    tracing::debug!("tick task finished");
}
