#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Rail Slide engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative tile grid, and pure systems. Adapters submit [`Command`]
//! values describing desired mutations, the grid executes those commands via
//! its `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query the grid
//! through read-only accessors, and emit their own requests into caller-owned
//! buffers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod curve;
pub mod lottery;

pub use curve::{Curve, CurveError, PolylineCurve};
pub use lottery::{LotteryError, WeightedLottery};

/// Commands that express all permissible grid mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Slides every tile between the blank slot and `origin` one step toward
    /// the blank without requesting any animation.
    SlideTile {
        /// Tile coordinate the player selected.
        origin: GridCoord,
    },
    /// Slides like [`Command::SlideTile`] and additionally requests a visual
    /// transition for each shifted tile.
    AnimateSlide {
        /// Tile coordinate the player selected.
        origin: GridCoord,
    },
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the grid after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tile moved one step toward the previous blank slot.
    TileShifted {
        /// Tile that moved.
        tile: TileId,
        /// Coordinate the tile occupied before the slide.
        from: GridCoord,
        /// Coordinate the tile occupies after the slide.
        to: GridCoord,
    },
    /// Asks an external animator to tween a tile between two coordinates.
    TransitionRequested {
        /// Tile that should be animated.
        tile: TileId,
        /// Coordinate the animation starts from.
        from: GridCoord,
        /// Coordinate the animation ends at.
        to: GridCoord,
        /// Expected duration of the transition.
        duration: Duration,
    },
    /// Confirms that a slide finished and reports the new blank slot.
    SlideCompleted {
        /// Coordinate the player selected.
        origin: GridCoord,
        /// Blank slot after the slide. Always equal to `origin`.
        blank: GridCoord,
    },
    /// Reports that a slide request was rejected.
    SlideRejected {
        /// Coordinate provided in the slide request.
        origin: GridCoord,
        /// Specific reason the slide failed.
        reason: SlideError,
    },
    /// Signals that every tile's side-to-neighbor map was rebuilt.
    ConnectionsRebuilt,
    /// Signals that the in-flight slide transition finished.
    TransitionsSettled,
    /// Announces that a spawn wave was emitted.
    WaveSpawned {
        /// One-based index of the wave since the spawner was initialized.
        wave: u32,
    },
}

/// Reasons a slide request may be rejected by the grid.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlideError {
    /// The requested coordinate lies outside the grid.
    #[error("coordinate lies outside the grid")]
    OutOfBounds,
    /// The requested coordinate is the blank slot itself.
    #[error("coordinate is the blank slot")]
    IsBlank,
    /// The requested coordinate shares neither the blank's row nor its column.
    #[error("coordinate shares neither row nor column with the blank slot")]
    NotAligned,
    /// An animated slide is still settling.
    #[error("a slide transition is still in flight")]
    TransitionInFlight,
}

/// Lifecycle of a tick-driven timer polled by the external loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerState {
    /// The timer is not counting.
    #[default]
    Idle,
    /// The timer accumulates elapsed time every tick.
    Running,
    /// The timer reached its deadline and awaits a reset.
    Finished,
}

/// Side of a square tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Edge facing decreasing row indices.
    Up,
    /// Edge facing increasing row indices.
    Down,
    /// Edge facing decreasing column indices.
    Left,
    /// Edge facing increasing column indices.
    Right,
}

impl Side {
    /// Every side in the fixed scan order used by connection rebuilds and
    /// mover initialization.
    pub const ALL: [Side; 4] = [Side::Up, Side::Down, Side::Left, Side::Right];

    /// Returns the side facing this one across a shared tile boundary.
    #[must_use]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Up => Side::Down,
            Side::Down => Side::Up,
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Dense index of the side, suitable for side-keyed arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::Up => 0,
            Side::Down => 1,
            Side::Left => 2,
            Side::Right => 3,
        }
    }
}

/// Direction in which a mover traverses a path edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TraversalDirection {
    /// Entered through the edge's first declared end; parameter increases.
    Forward,
    /// Entered through the edge's second declared end; parameter decreases.
    Reverse,
}

/// Unique identifier assigned to a tile for the lifetime of a grid layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// Rows grow downward, matching screen-space conventions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Reports whether the coordinate lies inside a grid of the given size.
    #[must_use]
    pub const fn within(&self, columns: u32, rows: u32) -> bool {
        self.column < columns && self.row < rows
    }

    /// Returns the neighboring coordinate across `side`, or `None` when it
    /// would leave a grid of the given size.
    #[must_use]
    pub fn offset(self, side: Side, columns: u32, rows: u32) -> Option<GridCoord> {
        let neighbor = match side {
            Side::Up => GridCoord::new(self.column, self.row.checked_sub(1)?),
            Side::Down => GridCoord::new(self.column, self.row.checked_add(1)?),
            Side::Left => GridCoord::new(self.column.checked_sub(1)?, self.row),
            Side::Right => GridCoord::new(self.column.checked_add(1)?, self.row),
        };
        neighbor.within(columns, rows).then_some(neighbor)
    }

    /// Reports whether two coordinates share a row or a column.
    #[must_use]
    pub const fn is_aligned_with(&self, other: GridCoord) -> bool {
        self.column == other.column || self.row == other.row
    }
}
