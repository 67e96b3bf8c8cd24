//! Score and score-rate bookkeeping for collected items.

use railslide_core::Event;
use serde::{Deserialize, Serialize};

/// Score multiplier applied while the rate sits at a given level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelMultiplier {
    /// One-based rate level.
    pub level: u32,
    /// Multiplier scaled by 100; `150` means ×1.5.
    pub rate_x100: u32,
}

/// Tuning for [`ScoreLedger`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Upper bound of the accumulated rate.
    pub max_rate: f32,
    /// Highest reachable level.
    pub max_level: u32,
    /// Multipliers per level. Unlisted levels use ×1.0.
    pub multipliers: Vec<LevelMultiplier>,
    /// Rate lost per second of unpaused time.
    pub decay_per_second: f32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_rate: 5.0,
            max_level: 5,
            multipliers: vec![
                LevelMultiplier {
                    level: 1,
                    rate_x100: 100,
                },
                LevelMultiplier {
                    level: 2,
                    rate_x100: 150,
                },
                LevelMultiplier {
                    level: 3,
                    rate_x100: 200,
                },
                LevelMultiplier {
                    level: 4,
                    rate_x100: 300,
                },
                LevelMultiplier {
                    level: 5,
                    rate_x100: 500,
                },
            ],
            decay_per_second: 0.05,
        }
    }
}

const DEFAULT_RATE_X100: u32 = 100;

/// Running score and multiplier rate of one round.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreLedger {
    config: ScoreConfig,
    score: u64,
    rate: f32,
    paused: bool,
}

impl ScoreLedger {
    /// Creates a paused ledger with zero score and rate.
    #[must_use]
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            score: 0,
            rate: 0.0,
            paused: true,
        }
    }

    /// Clears score and rate and pauses decay.
    pub fn reset(&mut self) {
        self.score = 0;
        self.rate = 0.0;
        self.paused = true;
    }

    /// Suspends rate decay.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes rate decay.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether rate decay is suspended.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Raw accumulated rate.
    #[must_use]
    pub const fn rate(&self) -> f32 {
        self.rate
    }

    /// Adds `delta` to the rate, clamped to `[0, max_rate]`.
    pub fn add_rate(&mut self, delta: f32) {
        self.rate = (self.rate + delta).clamp(0.0, self.config.max_rate);
    }

    /// Current level, `floor(rate) + 1` clamped to `[1, max_level]`.
    #[must_use]
    pub fn level(&self) -> u32 {
        let level = (self.rate.max(0.0) as u32).saturating_add(1);
        level.clamp(1, self.config.max_level.max(1))
    }

    /// Progress toward the next level in `[0, 1)`, or `1.0` at the cap.
    #[must_use]
    pub fn clamped_rate(&self) -> f32 {
        if self.rate < self.config.max_rate {
            self.rate % 1.0
        } else {
            1.0
        }
    }

    /// Multiplier for `level`, scaled by 100.
    #[must_use]
    pub fn multiplier_x100(&self, level: u32) -> u32 {
        self.config
            .multipliers
            .iter()
            .find(|entry| entry.level == level)
            .map_or(DEFAULT_RATE_X100, |entry| entry.rate_x100)
    }

    /// Records a collected item and returns the points added.
    ///
    /// Items worth no points change neither the score nor the rate.
    pub fn collect(&mut self, score: u32, score_rate: f32) -> u64 {
        if score == 0 {
            return 0;
        }
        self.add_rate(score_rate);
        let multiplier = self.multiplier_x100(self.level());
        let added = u64::from(score) * u64::from(multiplier) / 100;
        self.score = self.score.saturating_add(added);
        added
    }

    /// Decays the rate by the time carried in `TimeAdvanced` events.
    pub fn handle(&mut self, events: &[Event]) {
        if self.paused {
            return;
        }
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.add_rate(-self.config.decay_per_second * dt.as_secs_f32());
            }
        }
    }
}

impl Default for ScoreLedger {
    fn default() -> Self {
        Self::new(ScoreConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn collecting_raises_level_and_multiplier() {
        let mut ledger = ScoreLedger::default();
        assert_eq!(ledger.level(), 1);

        assert_eq!(ledger.collect(100, 0.5), 100);
        assert_eq!(ledger.level(), 1);
        assert_eq!(ledger.collect(100, 0.5), 150);
        assert_eq!(ledger.level(), 2);
        assert_eq!(ledger.score(), 250);
    }

    #[test]
    fn zero_score_items_are_ignored() {
        let mut ledger = ScoreLedger::default();
        assert_eq!(ledger.collect(0, 3.0), 0);
        assert_eq!(ledger.rate(), 0.0);
        assert_eq!(ledger.score(), 0);
    }

    #[test]
    fn rate_saturates_at_the_cap() {
        let mut ledger = ScoreLedger::default();
        let _ = ledger.collect(10, 20.0);
        assert_eq!(ledger.rate(), 5.0);
        assert_eq!(ledger.level(), 5);
        assert_eq!(ledger.clamped_rate(), 1.0);

        ledger.add_rate(-4.75);
        assert!((ledger.clamped_rate() - 0.25).abs() < 1.0e-6);
        assert_eq!(ledger.level(), 1);
    }

    #[test]
    fn unlisted_levels_use_unit_multiplier() {
        let ledger = ScoreLedger::new(ScoreConfig {
            multipliers: Vec::new(),
            ..ScoreConfig::default()
        });
        assert_eq!(ledger.multiplier_x100(3), 100);
    }

    #[test]
    fn decay_applies_only_while_running() {
        let mut ledger = ScoreLedger::default();
        ledger.add_rate(1.0);
        let tick = [Event::TimeAdvanced {
            dt: Duration::from_secs(10),
        }];

        ledger.handle(&tick);
        assert_eq!(ledger.rate(), 1.0);

        ledger.resume();
        ledger.handle(&tick);
        assert!((ledger.rate() - 0.5).abs() < 1.0e-6);

        ledger.handle(&tick);
        ledger.handle(&tick);
        assert_eq!(ledger.rate(), 0.0);
    }
}
