//! Sub-cell spawn areas, the patterns grouping them, and corner calibration.

use glam::Vec3;
use railslide_core::GridCoord;
use serde::{Deserialize, Serialize};

const CARDINAL_OFFSET: f32 = 0.32;
const DIAGONAL_OFFSET: f32 = 0.16;

/// Placement slot inside a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnArea {
    /// Cell centre.
    Center,
    /// Toward the upper side.
    Up,
    /// Toward the lower side.
    Down,
    /// Toward the left side.
    Left,
    /// Toward the right side.
    Right,
    /// Toward the upper-left corner.
    UpLeft,
    /// Toward the upper-right corner.
    UpRight,
    /// Toward the lower-left corner.
    DownLeft,
    /// Toward the lower-right corner.
    DownRight,
}

impl SpawnArea {
    /// Tile-local offset of the area for a tile of the given extent.
    ///
    /// Cardinal areas sit at 32% of the tile extent from the centre, diagonal
    /// areas at 16% along both axes.
    #[must_use]
    pub fn offset(self, tile_width: f32, tile_height: f32) -> Vec3 {
        let cardinal_x = tile_width * CARDINAL_OFFSET;
        let cardinal_z = tile_height * CARDINAL_OFFSET;
        let diagonal_x = tile_width * DIAGONAL_OFFSET;
        let diagonal_z = tile_height * DIAGONAL_OFFSET;
        match self {
            Self::Center => Vec3::ZERO,
            Self::Up => Vec3::new(0.0, 0.0, cardinal_z),
            Self::Down => Vec3::new(0.0, 0.0, -cardinal_z),
            Self::Left => Vec3::new(-cardinal_x, 0.0, 0.0),
            Self::Right => Vec3::new(cardinal_x, 0.0, 0.0),
            Self::UpLeft => Vec3::new(-diagonal_x, 0.0, diagonal_z),
            Self::UpRight => Vec3::new(diagonal_x, 0.0, diagonal_z),
            Self::DownLeft => Vec3::new(-diagonal_x, 0.0, -diagonal_z),
            Self::DownRight => Vec3::new(diagonal_x, 0.0, -diagonal_z),
        }
    }
}

/// Named arrangement of spawn areas drawn once per cell per wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnPattern {
    /// Single item in the centre.
    Center,
    /// Single item toward the upper-left.
    UpLeft,
    /// Single item toward the upper-right.
    UpRight,
    /// Single item toward the lower-left.
    DownLeft,
    /// Single item toward the lower-right.
    DownRight,
    /// Pair on the left and right.
    Horizontal2,
    /// Pair above and below.
    Vertical2,
    /// Pair above and left.
    UpLeft2,
    /// Pair above and right.
    UpRight2,
    /// Pair below and left.
    DownLeft2,
    /// Pair below and right.
    DownRight2,
    /// Row of three through the centre.
    Horizontal3,
    /// Column of three through the centre.
    Vertical3,
    /// Upper-left corner cluster.
    UpLeft3,
    /// Upper-right corner cluster.
    UpRight3,
    /// Lower-left corner cluster.
    DownLeft3,
    /// Lower-right corner cluster.
    DownRight3,
}

impl SpawnPattern {
    /// Every pattern in declaration order.
    pub const ALL: [SpawnPattern; 17] = [
        Self::Center,
        Self::UpLeft,
        Self::UpRight,
        Self::DownLeft,
        Self::DownRight,
        Self::Horizontal2,
        Self::Vertical2,
        Self::UpLeft2,
        Self::UpRight2,
        Self::DownLeft2,
        Self::DownRight2,
        Self::Horizontal3,
        Self::Vertical3,
        Self::UpLeft3,
        Self::UpRight3,
        Self::DownLeft3,
        Self::DownRight3,
    ];

    /// Areas covered by the pattern.
    #[must_use]
    pub const fn areas(self) -> &'static [SpawnArea] {
        use SpawnArea as A;
        match self {
            Self::Center => &[A::Center],
            Self::UpLeft => &[A::UpLeft],
            Self::UpRight => &[A::UpRight],
            Self::DownLeft => &[A::DownLeft],
            Self::DownRight => &[A::DownRight],
            Self::Horizontal2 => &[A::Left, A::Right],
            Self::Vertical2 => &[A::Up, A::Down],
            Self::UpLeft2 => &[A::Up, A::Left],
            Self::UpRight2 => &[A::Up, A::Right],
            Self::DownLeft2 => &[A::Down, A::Left],
            Self::DownRight2 => &[A::Down, A::Right],
            Self::Horizontal3 => &[A::Left, A::Center, A::Right],
            Self::Vertical3 => &[A::Up, A::Center, A::Down],
            Self::UpLeft3 => &[A::Up, A::UpLeft, A::Left],
            Self::UpRight3 => &[A::Up, A::UpRight, A::Right],
            Self::DownLeft3 => &[A::Down, A::DownLeft, A::Left],
            Self::DownRight3 => &[A::Down, A::DownRight, A::Right],
        }
    }
}

/// Areas removed from specific cells before items are drawn.
///
/// The entries are calibration data for one board size rather than a rule
/// derived from the grid's shape.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerCalibration {
    entries: Vec<(GridCoord, Vec<SpawnArea>)>,
}

impl CornerCalibration {
    /// Calibration that removes nothing.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Calibration for the standard 4×4 board. Each interior cell drops the
    /// areas facing the board centre.
    #[must_use]
    pub fn four_by_four() -> Self {
        use SpawnArea as A;
        Self::none()
            .with_entry(GridCoord::new(1, 1), [A::Right, A::DownRight, A::Down])
            .with_entry(GridCoord::new(2, 1), [A::Left, A::DownLeft, A::Down])
            .with_entry(GridCoord::new(1, 2), [A::Up, A::UpRight, A::Right])
            .with_entry(GridCoord::new(2, 2), [A::Up, A::UpLeft, A::Left])
    }

    /// Adds or replaces the areas removed from `cell`.
    #[must_use]
    pub fn with_entry(mut self, cell: GridCoord, removed: impl IntoIterator<Item = SpawnArea>) -> Self {
        let removed: Vec<SpawnArea> = removed.into_iter().collect();
        match self.entries.iter_mut().find(|(coord, _)| *coord == cell) {
            Some((_, existing)) => *existing = removed,
            None => self.entries.push((cell, removed)),
        }
        self
    }

    /// Reports whether `area` is removed from `cell`.
    #[must_use]
    pub fn removes(&self, cell: GridCoord, area: SpawnArea) -> bool {
        self.entries
            .iter()
            .any(|(coord, removed)| *coord == cell && removed.contains(&area))
    }

    /// `areas` with every area removed from `cell` filtered out.
    #[must_use]
    pub fn adjust(&self, cell: GridCoord, areas: &[SpawnArea]) -> Vec<SpawnArea> {
        areas
            .iter()
            .copied()
            .filter(|area| !self.removes(cell, *area))
            .collect()
    }
}
