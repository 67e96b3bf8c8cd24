#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave-based item spawning driven by weighted lotteries.
//!
//! Every wave walks the grid row by row, draws a [`SpawnPattern`] per cell,
//! trims the pattern's areas with the [`CornerCalibration`] and draws an
//! [`ItemKind`] per remaining area. Placement itself belongs to an external
//! spawner, which receives [`SpawnRequest`] values.

mod pattern;
mod score;

use std::time::Duration;

use glam::Vec3;
use log::debug;
use railslide_core::{Event, GridCoord, LotteryError, TimerState, WeightedLottery};
use railslide_grid::TileGrid;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use pattern::{CornerCalibration, SpawnArea, SpawnPattern};
pub use score::{LevelMultiplier, ScoreConfig, ScoreLedger};

/// Items that can be placed on the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// Low-value pickup.
    ScoreSmall,
    /// Mid-value pickup.
    ScoreMedium,
    /// High-value pickup.
    ScoreLarge,
    /// Speed boost marker.
    SpeedUp,
    /// Speed penalty marker.
    SpeedDown,
}

/// Draw weight and scoring of one item kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnItemDef {
    /// Item described by the entry.
    pub kind: ItemKind,
    /// Relative draw weight.
    pub weight: u32,
    /// Base score awarded on collection.
    pub score: u32,
    /// Score-rate contribution awarded on collection.
    pub score_rate: f32,
    /// Maximum placements per wave; `None` is unlimited.
    pub max_per_wave: Option<u32>,
}

/// Draw weight of one spawn pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternWeight {
    /// Pattern described by the entry.
    pub pattern: SpawnPattern,
    /// Relative draw weight.
    pub weight: u32,
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Time between waves.
    pub spawn_interval: Duration,
    /// Pattern draw table.
    pub patterns: Vec<PatternWeight>,
    /// Item draw table.
    pub items: Vec<SpawnItemDef>,
    /// Areas removed from specific cells.
    pub calibration: CornerCalibration,
}

impl Default for Config {
    fn default() -> Self {
        use SpawnPattern as P;
        let patterns = [
            (P::Center, 30),
            (P::UpLeft, 6),
            (P::UpRight, 6),
            (P::DownLeft, 6),
            (P::DownRight, 6),
            (P::Horizontal2, 8),
            (P::Vertical2, 8),
            (P::UpLeft2, 4),
            (P::UpRight2, 4),
            (P::DownLeft2, 4),
            (P::DownRight2, 4),
            (P::Horizontal3, 4),
            (P::Vertical3, 4),
            (P::UpLeft3, 2),
            (P::UpRight3, 2),
            (P::DownLeft3, 2),
            (P::DownRight3, 2),
        ]
        .into_iter()
        .map(|(pattern, weight)| PatternWeight { pattern, weight })
        .collect();

        let item = |kind, weight, score, score_rate, max_per_wave| SpawnItemDef {
            kind,
            weight,
            score,
            score_rate,
            max_per_wave,
        };
        let items = vec![
            item(ItemKind::ScoreSmall, 60, 10, 0.1, None),
            item(ItemKind::ScoreMedium, 25, 50, 0.25, Some(4)),
            item(ItemKind::ScoreLarge, 8, 200, 0.5, Some(1)),
            item(ItemKind::SpeedUp, 4, 0, 0.0, Some(1)),
            item(ItemKind::SpeedDown, 3, 0, 0.0, Some(1)),
        ];

        Self {
            spawn_interval: Duration::from_secs(10),
            patterns,
            items,
            calibration: CornerCalibration::four_by_four(),
        }
    }
}

/// Reasons the spawning system rejected its configuration or failed a draw.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SpawnError {
    /// Every pattern weight is zero.
    #[error("pattern weights sum to zero")]
    DegeneratePatterns,
    /// Every item weight is zero.
    #[error("item weights sum to zero")]
    DegenerateItems,
    /// The same item kind is listed twice.
    #[error("item {kind:?} is listed more than once")]
    DuplicateItem {
        /// Repeated kind.
        kind: ItemKind,
    },
    /// A weighted draw failed.
    #[error(transparent)]
    Lottery(#[from] LotteryError),
}

/// Placement requested for the external spawner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Wave the placement belongs to.
    pub wave: u32,
    /// Grid cell receiving the item.
    pub cell: GridCoord,
    /// Slot inside the cell.
    pub area: SpawnArea,
    /// Item to place.
    pub kind: ItemKind,
}

impl SpawnRequest {
    /// World-space placement of the request on `grid`.
    #[must_use]
    pub fn world_position(&self, grid: &TileGrid) -> Vec3 {
        let config = grid.config();
        grid.tile_world_position(self.cell) + self.area.offset(config.tile_width, config.tile_height)
    }
}

/// Pure system that emits spawn waves on a fixed cadence.
#[derive(Debug)]
pub struct SpawnSelector<R = ChaCha8Rng> {
    config: Config,
    lottery: WeightedLottery<R>,
    pattern_weights: Vec<u32>,
    item_weights: Vec<u32>,
    wave_counts: Vec<u32>,
    accumulator: Duration,
    timer: TimerState,
    paused: bool,
    wave: u32,
}

impl SpawnSelector<ChaCha8Rng> {
    /// Creates a selector backed by a ChaCha stream seeded with `seed`.
    pub fn seeded(config: Config, seed: u64) -> Result<Self, SpawnError> {
        Self::new(config, WeightedLottery::seeded(seed))
    }
}

impl<R: Rng> SpawnSelector<R> {
    /// Creates a stopped selector after validating the draw tables.
    pub fn new(config: Config, lottery: WeightedLottery<R>) -> Result<Self, SpawnError> {
        let pattern_weights: Vec<u32> = config.patterns.iter().map(|entry| entry.weight).collect();
        if pattern_weights.iter().all(|weight| *weight == 0) {
            return Err(SpawnError::DegeneratePatterns);
        }
        let item_weights: Vec<u32> = config.items.iter().map(|entry| entry.weight).collect();
        if item_weights.iter().all(|weight| *weight == 0) {
            return Err(SpawnError::DegenerateItems);
        }
        for (index, item) in config.items.iter().enumerate() {
            if config.items[..index].iter().any(|other| other.kind == item.kind) {
                return Err(SpawnError::DuplicateItem { kind: item.kind });
            }
        }

        Ok(Self {
            wave_counts: vec![0; config.items.len()],
            config,
            lottery,
            pattern_weights,
            item_weights,
            accumulator: Duration::ZERO,
            timer: TimerState::Idle,
            paused: true,
            wave: 0,
        })
    }

    /// Resets the wave counter, emits the first wave immediately and starts
    /// the timer paused.
    pub fn initialize(
        &mut self,
        grid: &TileGrid,
        requests: &mut Vec<SpawnRequest>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpawnError> {
        self.wave = 0;
        self.accumulator = Duration::ZERO;
        self.paused = true;
        self.trigger_wave(grid, requests, out_events)?;
        self.timer = TimerState::Running;
        Ok(())
    }

    /// Draws one wave across every cell of `grid`.
    pub fn trigger_wave(
        &mut self,
        grid: &TileGrid,
        requests: &mut Vec<SpawnRequest>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpawnError> {
        self.wave = self.wave.saturating_add(1);
        self.wave_counts.fill(0);
        let before = requests.len();

        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let cell = GridCoord::new(column, row);
                let pattern_index = self.lottery.sample(&self.pattern_weights)?;
                let pattern = self.config.patterns[pattern_index].pattern;
                for area in self.config.calibration.adjust(cell, pattern.areas()) {
                    if let Some(kind) = self.draw_item()? {
                        requests.push(SpawnRequest {
                            wave: self.wave,
                            cell,
                            area,
                            kind,
                        });
                    }
                }
            }
        }

        debug!(
            "wave {} placed {} items",
            self.wave,
            requests.len() - before
        );
        out_events.push(Event::WaveSpawned { wave: self.wave });
        Ok(())
    }

    /// Consumes grid events, emitting one wave per elapsed interval while the
    /// timer runs unpaused.
    pub fn handle(
        &mut self,
        events: &[Event],
        grid: &TileGrid,
        requests: &mut Vec<SpawnRequest>,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SpawnError> {
        if self.timer != TimerState::Running || self.paused {
            return Ok(());
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }

        for _ in 0..self.resolve_wave_attempts() {
            self.trigger_wave(grid, requests, out_events)?;
        }
        Ok(())
    }

    /// Stops counting toward the next wave without discarding progress.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resumes counting toward the next wave.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Reports whether the timer is paused.
    #[must_use]
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stops the spawn cycle. Stopping an idle selector is a no-op.
    pub fn stop(&mut self) {
        self.timer = TimerState::Idle;
        self.accumulator = Duration::ZERO;
    }

    /// Timer lifecycle.
    #[must_use]
    pub const fn timer_state(&self) -> TimerState {
        self.timer
    }

    /// Number of waves emitted since the last initialization.
    #[must_use]
    pub const fn wave(&self) -> u32 {
        self.wave
    }

    /// Base score of `kind`; zero when unlisted.
    #[must_use]
    pub fn score_for(&self, kind: ItemKind) -> u32 {
        self.item(kind).map_or(0, |item| item.score)
    }

    /// Score-rate contribution of `kind`; zero when unlisted.
    #[must_use]
    pub fn score_rate_for(&self, kind: ItemKind) -> f32 {
        self.item(kind).map_or(0.0, |item| item.score_rate)
    }

    fn item(&self, kind: ItemKind) -> Option<&SpawnItemDef> {
        self.config.items.iter().find(|item| item.kind == kind)
    }

    fn draw_item(&mut self) -> Result<Option<ItemKind>, SpawnError> {
        let index = self.lottery.sample(&self.item_weights)?;
        let item = self.config.items[index];
        let placed = &mut self.wave_counts[index];
        if item.max_per_wave.is_some_and(|cap| *placed >= cap) {
            return Ok(None);
        }
        *placed += 1;
        Ok(Some(item.kind))
    }

    fn resolve_wave_attempts(&mut self) -> usize {
        if self.config.spawn_interval.is_zero() {
            return 0;
        }

        let mut attempts = 0;
        while self.accumulator >= self.config.spawn_interval {
            self.accumulator -= self.config.spawn_interval;
            attempts += 1;
        }
        attempts
    }
}
