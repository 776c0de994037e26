//! Points per correct answer, streak bonuses and automatic difficulty tiers.

use serde::{Deserialize, Serialize};

use crate::problem::arithmetic::Operation;

/// Bonus that grows with the streak and is capped: `min(streak * step, cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakBonus {
    pub step: u32,
    pub cap: u32,
}

impl StreakBonus {
    #[must_use]
    pub const fn new(step: u32, cap: u32) -> Self {
        Self { step, cap }
    }

    #[must_use]
    pub fn bonus(&self, streak: u32) -> u32 {
        streak.saturating_mul(self.step).min(self.cap)
    }
}

/// Inputs a scoring policy may read when a correct answer lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreContext {
    /// Streak before this answer is counted.
    pub streak: u32,
    pub level: u32,
    /// Time taken to answer the current problem.
    pub reaction_ms: u64,
}

/// How many points one correct answer is worth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
    Flat(u32),
    Streak {
        base: u32,
        bonus: StreakBonus,
    },
    /// Faster answers earn more, never less than one point before the bonus.
    Reaction {
        max_points: u32,
        ms_per_point: u64,
        bonus: StreakBonus,
    },
    PerLevel(u32),
    /// `base + streak / every`.
    Tiered {
        base: u32,
        every: u32,
    },
}

impl ScoringPolicy {
    #[must_use]
    pub fn points(&self, ctx: &ScoreContext) -> u32 {
        match *self {
            ScoringPolicy::Flat(points) => points,
            ScoringPolicy::Streak { base, bonus } => base + bonus.bonus(ctx.streak),
            ScoringPolicy::Reaction {
                max_points,
                ms_per_point,
                bonus,
            } => {
                let max = f64::from(max_points);
                let lost = (ctx.reaction_ms as f64 / ms_per_point.max(1) as f64).min(max);
                let speed = ((max - lost).round() as u32).max(1);
                speed + bonus.bonus(ctx.streak)
            }
            ScoringPolicy::PerLevel(step) => ctx.level.saturating_mul(step),
            ScoringPolicy::Tiered { base, every } => base + ctx.streak / every.max(1),
        }
    }
}

// ─── Math Stream difficulty ─────────────────────────────────────────────────

/// Difficulty tier of Math Stream, escalated automatically by streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamTier {
    #[default]
    Easy,
    Medium,
    Hard,
    Expert,
}

/// Parameters of one stream tier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TierSettings {
    pub max_number: u32,
    pub operations: &'static [Operation],
    pub base_limit_ms: u64,
    pub points: u32,
    /// Per-answer multiplier applied to the time limit.
    pub speedup: f64,
}

const MIN_STREAM_LIMIT_MS: u64 = 1_000;
const MAX_SPEEDUP_STREAK: u32 = 50;

impl StreamTier {
    #[must_use]
    pub fn settings(self) -> TierSettings {
        use Operation::{Add, Divide, Multiply, Subtract};
        match self {
            StreamTier::Easy => TierSettings {
                max_number: 20,
                operations: &[Add, Subtract],
                base_limit_ms: 5_000,
                points: 1,
                speedup: 0.98,
            },
            StreamTier::Medium => TierSettings {
                max_number: 50,
                operations: &[Add, Subtract, Multiply],
                base_limit_ms: 4_000,
                points: 2,
                speedup: 0.975,
            },
            StreamTier::Hard => TierSettings {
                max_number: 100,
                operations: &[Add, Subtract, Multiply, Divide],
                base_limit_ms: 3_000,
                points: 3,
                speedup: 0.97,
            },
            StreamTier::Expert => TierSettings {
                max_number: 200,
                operations: &[Add, Subtract, Multiply, Divide],
                base_limit_ms: 2_000,
                points: 5,
                speedup: 0.965,
            },
        }
    }

    /// Tier a streak qualifies for.
    #[must_use]
    pub fn for_streak(streak: u32) -> Self {
        match streak {
            20.. => StreamTier::Expert,
            15.. => StreamTier::Hard,
            10.. => StreamTier::Medium,
            _ => StreamTier::Easy,
        }
    }

    /// Per-problem time limit: the base limit shrunk per streak, at least one second,
    /// rounded to a tenth of a second.
    #[must_use]
    pub fn problem_limit_ms(self, streak: u32) -> u64 {
        let settings = self.settings();
        let exponent = streak.min(MAX_SPEEDUP_STREAK) as i32;
        let raw = settings.base_limit_ms as f64 * settings.speedup.powi(exponent);
        let tenths = (raw / 100.0).round() as u64 * 100;
        tenths.max(MIN_STREAM_LIMIT_MS)
    }

    /// Points for a correct answer: tier points plus one per five streak.
    #[must_use]
    pub fn points(self, streak: u32) -> u32 {
        ScoringPolicy::Tiered {
            base: self.settings().points,
            every: 5,
        }
        .points(&ScoreContext {
            streak,
            ..ScoreContext::default()
        })
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StreamTier::Easy => "easy",
            StreamTier::Medium => "medium",
            StreamTier::Hard => "hard",
            StreamTier::Expert => "expert",
        }
    }
}

/// Tracks the current stream tier: escalates with the streak, drops back after misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DifficultyLadder {
    tier: StreamTier,
}

impl DifficultyLadder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tier(&self) -> StreamTier {
        self.tier
    }

    /// Never lowers the tier.
    pub fn on_correct(&mut self, streak: u32) {
        self.tier = self.tier.max(StreamTier::for_streak(streak));
    }

    /// `lives_before` is the life count before this miss was charged.
    pub fn on_miss(&mut self, lives_before: u32) {
        if lives_before <= 2 {
            self.tier = StreamTier::Easy;
        }
    }

    pub fn reset(&mut self) {
        self.tier = StreamTier::Easy;
    }
}

const ZEN_LEVEL_STEP: u32 = 10;
const ZEN_MAX_LEVEL: u32 = 5;

/// Math Zen difficulty level for a streak: one level per ten, capped at five.
#[must_use]
pub fn zen_level(streak: u32) -> u32 {
    (streak / ZEN_LEVEL_STEP + 1).min(ZEN_MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_bonus_is_capped() {
        let bonus = StreakBonus::new(2, 20);
        assert_eq!(bonus.bonus(12), 20);
        assert_eq!(bonus.bonus(4), 8);
        assert_eq!(bonus.bonus(0), 0);
    }

    #[test]
    fn reaction_points_floor_at_one() {
        let policy = ScoringPolicy::Reaction {
            max_points: 10,
            ms_per_point: 100,
            bonus: StreakBonus::new(2, 20),
        };
        let quick = ScoreContext {
            reaction_ms: 250,
            ..ScoreContext::default()
        };
        assert_eq!(policy.points(&quick), 8);
        let quick_ish = ScoreContext {
            reaction_ms: 260,
            ..ScoreContext::default()
        };
        assert_eq!(policy.points(&quick_ish), 7);
        let slow = ScoreContext {
            streak: 3,
            reaction_ms: 5_000,
            ..ScoreContext::default()
        };
        assert_eq!(policy.points(&slow), 1 + 6);
    }

    #[test]
    fn per_level_and_tiered() {
        let ctx = ScoreContext {
            streak: 11,
            level: 4,
            reaction_ms: 0,
        };
        assert_eq!(ScoringPolicy::PerLevel(10).points(&ctx), 40);
        assert_eq!(ScoringPolicy::Tiered { base: 3, every: 5 }.points(&ctx), 5);
        assert_eq!(ScoringPolicy::Flat(1).points(&ctx), 1);
    }

    #[test]
    fn ladder_escalates_monotonically() {
        let mut ladder = DifficultyLadder::new();
        ladder.on_correct(10);
        assert_eq!(ladder.tier(), StreamTier::Medium);
        ladder.on_correct(21);
        assert_eq!(ladder.tier(), StreamTier::Expert);
        ladder.on_correct(15);
        assert_eq!(ladder.tier(), StreamTier::Expert);
        ladder.on_miss(3);
        assert_eq!(ladder.tier(), StreamTier::Expert);
        ladder.on_miss(2);
        assert_eq!(ladder.tier(), StreamTier::Easy);
    }

    #[test]
    fn stream_limit_shrinks_but_not_below_a_second() {
        assert_eq!(StreamTier::Easy.problem_limit_ms(0), 5_000);
        assert_eq!(StreamTier::Easy.problem_limit_ms(10), 4_100);
        assert_eq!(StreamTier::Expert.problem_limit_ms(200), 1_000);
    }

    #[test]
    fn zen_level_caps_at_five() {
        assert_eq!(zen_level(0), 1);
        assert_eq!(zen_level(19), 2);
        assert_eq!(zen_level(400), 5);
    }
}
