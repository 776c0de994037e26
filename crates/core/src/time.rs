use chrono::{DateTime, Duration, Utc};

/// A simple clock abstraction for deterministic wall time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    /// Returns the current time according to the clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }

    /// If this is a fixed clock, advance it by the given duration.
    ///
    /// Has no effect on `Clock::Default`.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(t) = self {
            *t += delta;
        }
    }
}

/// Deterministic timestamp for tests (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests.
///
/// Falls back to the Unix epoch if the timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0).unwrap_or_default()
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

// ─── Game clocks ────────────────────────────────────────────────────────────

/// Counts down from a limit in milliseconds and is clamped at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    limit_ms: u64,
    remaining_ms: u64,
}

impl Countdown {
    #[must_use]
    pub fn new(limit_ms: u64) -> Self {
        Self {
            limit_ms,
            remaining_ms: limit_ms,
        }
    }

    /// Advance by `dt_ms`. Returns `true` only on the call that reaches zero.
    pub fn tick(&mut self, dt_ms: u64) -> bool {
        self.consume(dt_ms)
    }

    /// Shorten the remaining time. Returns `true` only if this penalty reached zero.
    pub fn penalize(&mut self, ms: u64) -> bool {
        self.consume(ms)
    }

    fn consume(&mut self, ms: u64) -> bool {
        if self.remaining_ms == 0 {
            return false;
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(ms);
        self.remaining_ms == 0
    }

    #[must_use]
    pub fn remaining_ms(&self) -> u64 {
        self.remaining_ms
    }

    #[must_use]
    pub fn limit_ms(&self) -> u64 {
        self.limit_ms
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.limit_ms - self.remaining_ms
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining_ms == 0
    }
}

/// Counts elapsed milliseconds with no upper bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stopwatch {
    elapsed_ms: u64,
}

impl Stopwatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt_ms: u64) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(dt_ms);
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// Which clock a challenge runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSpec {
    Countdown { limit_ms: u64 },
    Stopwatch,
}

impl ClockSpec {
    #[must_use]
    pub fn build(self) -> SessionClock {
        match self {
            ClockSpec::Countdown { limit_ms } => SessionClock::Countdown(Countdown::new(limit_ms)),
            ClockSpec::Stopwatch => SessionClock::Stopwatch(Stopwatch::new()),
        }
    }
}

/// The clock that gates a whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionClock {
    Countdown(Countdown),
    Stopwatch(Stopwatch),
}

impl SessionClock {
    /// Advance the clock. Returns `true` only when a countdown reaches zero on this call.
    pub fn tick(&mut self, dt_ms: u64) -> bool {
        match self {
            SessionClock::Countdown(countdown) => countdown.tick(dt_ms),
            SessionClock::Stopwatch(stopwatch) => {
                stopwatch.tick(dt_ms);
                false
            }
        }
    }

    /// Apply a time penalty. Stopwatches ignore penalties.
    pub fn penalize(&mut self, ms: u64) -> bool {
        match self {
            SessionClock::Countdown(countdown) => countdown.penalize(ms),
            SessionClock::Stopwatch(_) => false,
        }
    }

    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        match self {
            SessionClock::Countdown(countdown) => countdown.elapsed_ms(),
            SessionClock::Stopwatch(stopwatch) => stopwatch.elapsed_ms(),
        }
    }

    /// Remaining time for a countdown, `None` for a stopwatch.
    #[must_use]
    pub fn remaining_ms(&self) -> Option<u64> {
        match self {
            SessionClock::Countdown(countdown) => Some(countdown.remaining_ms()),
            SessionClock::Stopwatch(_) => None,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, SessionClock::Countdown(countdown) if countdown.is_expired())
    }
}

/// Whole seconds, rounded up, as shown on a countdown.
#[must_use]
pub fn format_seconds(ms: u64) -> String {
    format!("{}s", ms.div_ceil(1000))
}

/// `m:ss` for stopwatch displays.
#[must_use]
pub fn format_clock(ms: u64) -> String {
    let total = ms / 1000;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Seconds with one decimal, e.g. `12.3s`.
#[must_use]
pub fn format_tenths(ms: u64) -> String {
    format!("{}.{}s", ms / 1000, (ms % 1000) / 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_reaches_zero_exactly_once() {
        let mut clock = ClockSpec::Countdown { limit_ms: 60_000 }.build();
        let mut ends = 0;
        for _ in 0..75 {
            if clock.tick(1_000) {
                ends += 1;
            }
        }
        assert_eq!(ends, 1);
        assert_eq!(clock.remaining_ms(), Some(0));
        assert_eq!(clock.elapsed_ms(), 60_000);
    }

    #[test]
    fn penalty_saturates_and_never_resurrects() {
        let mut countdown = Countdown::new(3_000);
        assert!(!countdown.penalize(2_000));
        assert!(countdown.penalize(2_000));
        assert_eq!(countdown.remaining_ms(), 0);
        assert!(!countdown.penalize(2_000));
        assert!(!countdown.tick(50));
        assert!(countdown.is_expired());
    }

    #[test]
    fn stopwatch_never_expires() {
        let mut clock = ClockSpec::Stopwatch.build();
        assert!(!clock.tick(10));
        assert!(!clock.penalize(5_000));
        assert_eq!(clock.elapsed_ms(), 10);
        assert_eq!(clock.remaining_ms(), None);
    }

    #[test]
    fn formats_times() {
        assert_eq!(format_seconds(59_001), "60s");
        assert_eq!(format_clock(125_000), "2:05");
        assert_eq!(format_tenths(12_345), "12.3s");
    }

    #[test]
    fn fixed_clock_advances() {
        let mut clock = fixed_clock();
        clock.advance(Duration::seconds(5));
        assert_eq!(clock.now(), fixed_now() + Duration::seconds(5));
    }
}
