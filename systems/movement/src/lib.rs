#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Path-following system that drives the runner along the rail network.
//!
//! The mover never caches cross-tile state: at every segment end it asks the
//! grid for the tile linked across the exit side, so it stays correct across
//! any sequence of slides as long as the grid rebuilt its connections first.

use std::f32::consts::PI;
use std::time::Duration;

use glam::{Quat, Vec3};
use log::{debug, info, warn};
use railslide_core::{Curve, Event, GridCoord, Side, TraversalDirection};
use railslide_grid::{query, PathDirectionInfo, TileGrid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle of the mover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoverPhase {
    /// Holding position; speed is zero or the mover was never launched.
    #[default]
    Stopped,
    /// Advancing along the active edge every tick.
    Moving,
    /// Reached a segment end with nowhere to go. Cleared only by
    /// [`PathMover::initialize`].
    NoPath,
}

/// Reasons the mover could not be placed on the grid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MoverError {
    /// The start coordinate holds no tile.
    #[error("no tile occupies {coord:?}")]
    NoTileAt {
        /// Requested start coordinate.
        coord: GridCoord,
    },
    /// The start tile has no authored rail.
    #[error("tile at {coord:?} has no rail to start on")]
    NoConnectedSide {
        /// Requested start coordinate.
        coord: GridCoord,
    },
}

/// Speed ramp applied as spawn waves accumulate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Speed applied by [`PathMover::launch`], in curve units per second.
    pub initial: f32,
    /// Lower speed clamp.
    pub min: f32,
    /// Upper speed clamp.
    pub max: f32,
    /// Speed added at every ramp step.
    pub increase: f32,
    /// Number of waves between ramp steps. Zero disables the ramp.
    pub every_waves: u32,
}

impl SpeedProfile {
    /// Creates a profile from its raw parts.
    #[must_use]
    pub const fn new(initial: f32, min: f32, max: f32, increase: f32, every_waves: u32) -> Self {
        Self {
            initial,
            min,
            max,
            increase,
            every_waves,
        }
    }

    /// Clamps `speed` into the profile's range.
    #[must_use]
    pub fn clamp(&self, speed: f32) -> f32 {
        speed.clamp(self.min, self.max)
    }

    fn ramps_at(&self, wave: u32) -> bool {
        wave != 0 && wave.is_multiple_of(self.every_waves)
    }
}

impl Default for SpeedProfile {
    fn default() -> Self {
        Self::new(0.2, 0.01, 1.0, 0.05, 3)
    }
}

/// World-space placement of the mover.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    /// Position on the XZ plane.
    pub position: Vec3,
    /// Orientation whose `+Z` axis faces the direction of travel.
    pub orientation: Quat,
}

/// State machine advancing continuously along connected rails.
#[derive(Debug)]
pub struct PathMover {
    profile: SpeedProfile,
    segment: Option<PathDirectionInfo>,
    position: f32,
    speed: f32,
    phase: MoverPhase,
}

impl PathMover {
    /// Creates a stopped mover that is not yet placed on the grid.
    #[must_use]
    pub const fn new(profile: SpeedProfile) -> Self {
        Self {
            profile,
            segment: None,
            position: 0.0,
            speed: 0.0,
            phase: MoverPhase::Stopped,
        }
    }

    /// Places the mover on the first rail of the tile at `start`.
    ///
    /// Sides are scanned in [`Side::ALL`] order. The mover is left stopped
    /// with zero speed and any previous `NoPath` flag is cleared.
    pub fn initialize(&mut self, grid: &TileGrid, start: GridCoord) -> Result<(), MoverError> {
        let tile = grid
            .find_tile(start)
            .ok_or(MoverError::NoTileAt { coord: start })?;
        let segment = Side::ALL
            .into_iter()
            .find_map(|side| tile.connection().path_direction_info(tile.id(), side))
            .ok_or(MoverError::NoConnectedSide { coord: start })?;
        let edge = query::edge(grid, &segment).ok_or(MoverError::NoConnectedSide { coord: start })?;

        self.position = entry_bound(edge.curve(), segment.direction);
        self.segment = Some(segment);
        self.speed = 0.0;
        self.phase = MoverPhase::Stopped;
        debug!("mover placed on {:?} entering {:?}", start, segment.entry);
        Ok(())
    }

    /// Sets speed to the profile's initial value.
    pub fn launch(&mut self) {
        self.set_speed(self.profile.initial);
    }

    /// Sets the speed. Non-positive values stop the mover; positive values
    /// start it unless `NoPath` has been flagged.
    pub fn set_speed(&mut self, speed: f32) {
        let speed = if speed.is_finite() { speed.max(0.0) } else { 0.0 };
        self.speed = speed;
        if self.phase == MoverPhase::NoPath {
            return;
        }
        self.phase = if speed > 0.0 && self.segment.is_some() {
            MoverPhase::Moving
        } else {
            if speed > 0.0 {
                warn!("mover speed set before initialization");
            }
            MoverPhase::Stopped
        };
    }

    /// Current speed in curve units per second.
    #[must_use]
    pub const fn speed(&self) -> f32 {
        self.speed
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> MoverPhase {
        self.phase
    }

    /// Reports whether the mover is not advancing. `NoPath` counts as stopped.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.phase != MoverPhase::Moving
    }

    /// Reports whether the mover ran out of rail.
    #[must_use]
    pub fn is_no_path(&self) -> bool {
        self.phase == MoverPhase::NoPath
    }

    /// Edge currently being traversed.
    #[must_use]
    pub const fn segment(&self) -> Option<PathDirectionInfo> {
        self.segment
    }

    /// Parameter on the active edge's curve.
    #[must_use]
    pub const fn position(&self) -> f32 {
        self.position
    }

    /// Coordinate of the tile owning the active edge.
    #[must_use]
    pub fn current_tile_coord(&self, grid: &TileGrid) -> Option<GridCoord> {
        query::tile_coord(grid, self.segment?.tile)
    }

    /// World-space placement on the active edge.
    ///
    /// Reverse traversal faces opposite to the curve's own orientation.
    #[must_use]
    pub fn pose(&self, grid: &TileGrid) -> Option<Pose> {
        let segment = self.segment?;
        let curve = query::edge(grid, &segment)?.curve();
        let coord = query::tile_coord(grid, segment.tile)?;

        let position = grid.tile_world_position(coord) + curve.evaluate_position(self.position);
        let raw = curve.evaluate_orientation(self.position);
        let orientation = match segment.direction {
            TraversalDirection::Forward => raw,
            TraversalDirection::Reverse => Quat::from_rotation_y(PI) * raw,
        };
        Some(Pose {
            position,
            orientation,
        })
    }

    /// Consumes grid and spawner events.
    ///
    /// `TimeAdvanced` advances the mover; `WaveSpawned` may ramp its speed.
    pub fn handle(&mut self, events: &[Event], grid: &TileGrid) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(grid, *dt),
                Event::WaveSpawned { wave } => self.on_wave(*wave),
                _ => {}
            }
        }
    }

    /// Moves along the active edge by `speed * dt`.
    ///
    /// At a segment end the mover hands off to the linked tile, carrying any
    /// leftover distance, or flags `NoPath` within the same call. At most one
    /// hand-off per tile happens per call.
    pub fn advance(&mut self, grid: &TileGrid, dt: Duration) {
        if self.phase != MoverPhase::Moving {
            return;
        }
        let Some(mut segment) = self.segment else {
            return;
        };

        let mut remaining = self.speed * dt.as_secs_f32();
        let mut handoffs = 0;
        let handoff_limit = grid.tiles().len().max(1);

        loop {
            let Some(edge) = query::edge(grid, &segment) else {
                self.flag_no_path(grid);
                break;
            };
            let curve = edge.curve();

            let (raw, exit_bound) = match segment.direction {
                TraversalDirection::Forward => (self.position + remaining, curve.max_parameter()),
                TraversalDirection::Reverse => (self.position - remaining, curve.min_parameter()),
            };
            let next = curve.standardize_parameter(raw);
            remaining = (remaining - (next - self.position).abs()).max(0.0);
            self.position = next;

            let reached = match segment.direction {
                TraversalDirection::Forward => self.position >= exit_bound,
                TraversalDirection::Reverse => self.position <= exit_bound,
            };
            if !reached {
                break;
            }

            let Some(following) = query::next_segment(grid, segment.tile, segment.exit) else {
                self.flag_no_path(grid);
                break;
            };
            let Some(following_edge) = query::edge(grid, &following) else {
                self.flag_no_path(grid);
                break;
            };

            self.position = entry_bound(following_edge.curve(), following.direction);
            segment = following;
            self.segment = Some(segment);
            handoffs += 1;
            if remaining <= 0.0 || handoffs >= handoff_limit {
                break;
            }
        }
    }

    fn on_wave(&mut self, wave: u32) {
        if self.phase != MoverPhase::Moving || !self.profile.ramps_at(wave) {
            return;
        }
        self.speed = self.profile.clamp(self.speed + self.profile.increase);
        debug!("wave {wave} raised mover speed to {}", self.speed);
    }

    fn flag_no_path(&mut self, grid: &TileGrid) {
        self.phase = MoverPhase::NoPath;
        info!(
            "mover ran out of rail at {:?}",
            self.current_tile_coord(grid)
        );
    }
}

impl Default for PathMover {
    fn default() -> Self {
        Self::new(SpeedProfile::default())
    }
}

fn entry_bound(curve: &dyn Curve, direction: TraversalDirection) -> f32 {
    match direction {
        TraversalDirection::Forward => curve.min_parameter(),
        TraversalDirection::Reverse => curve.max_parameter(),
    }
}
