//! Authored tile templates and the geometry of their embedded rails.

use glam::Vec3;
use railslide_core::{CurveError, PolylineCurve, Side};
use serde::{Deserialize, Serialize};

use crate::connection::PathEdge;

const ARC_SEGMENTS: u32 = 12;

/// Rail layouts a tile can be authored with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Straight rail from left to right.
    Horizontal,
    /// Straight rail from top to bottom.
    Vertical,
    /// Horizontal and vertical rails crossing in the centre.
    Cross,
    /// Quarter turn joining the top and left sides.
    UpLeft,
    /// Quarter turn joining the top and right sides.
    UpRight,
    /// Quarter turn joining the bottom and left sides.
    DownLeft,
    /// Quarter turn joining the bottom and right sides.
    DownRight,
    /// Two turns: top to left and bottom to right.
    DoubleUpLeft,
    /// Two turns: top to right and bottom to left.
    DoubleUpRight,
}

impl TileKind {
    /// Declared ends of every rail, in authoring order.
    #[must_use]
    pub const fn edge_sides(self) -> &'static [(Side, Side)] {
        match self {
            Self::Horizontal => &[(Side::Left, Side::Right)],
            Self::Vertical => &[(Side::Up, Side::Down)],
            Self::Cross => &[(Side::Left, Side::Right), (Side::Up, Side::Down)],
            Self::UpLeft => &[(Side::Up, Side::Left)],
            Self::UpRight => &[(Side::Up, Side::Right)],
            Self::DownLeft => &[(Side::Down, Side::Left)],
            Self::DownRight => &[(Side::Down, Side::Right)],
            Self::DoubleUpLeft => &[(Side::Up, Side::Left), (Side::Down, Side::Right)],
            Self::DoubleUpRight => &[(Side::Up, Side::Right), (Side::Down, Side::Left)],
        }
    }

    /// Builds the tile's rails for a tile of the given extent.
    ///
    /// Rails that join opposite sides are straight; rails that join adjacent
    /// sides are quarter arcs around the shared corner.
    pub fn build_edges(self, tile_width: f32, tile_height: f32) -> Result<Vec<PathEdge>, CurveError> {
        self.edge_sides()
            .iter()
            .map(|&(first, second)| -> Result<PathEdge, CurveError> {
                let start = side_anchor(first, tile_width, tile_height);
                let end = side_anchor(second, tile_width, tile_height);
                let curve = if first.opposite() == second {
                    PolylineCurve::straight(start, end)?
                } else {
                    PolylineCurve::quarter_arc(start, end, start + end, ARC_SEGMENTS)?
                };
                Ok(PathEdge::new(first, second, Box::new(curve)))
            })
            .collect()
    }
}

/// Tile-local midpoint of `side`.
#[must_use]
pub fn side_anchor(side: Side, tile_width: f32, tile_height: f32) -> Vec3 {
    let half_width = tile_width * 0.5;
    let half_height = tile_height * 0.5;
    match side {
        Side::Up => Vec3::new(0.0, 0.0, half_height),
        Side::Down => Vec3::new(0.0, 0.0, -half_height),
        Side::Left => Vec3::new(-half_width, 0.0, 0.0),
        Side::Right => Vec3::new(half_width, 0.0, 0.0),
    }
}

/// Sixteen templates for the standard 4×4 board, in row-major order.
///
/// The outer ring forms a closed loop before shuffling; the interior mixes
/// crossings and double turns.
#[must_use]
pub fn standard_layout() -> Vec<TileKind> {
    use TileKind::*;
    vec![
        DownRight, Horizontal, Horizontal, DownLeft, //
        Vertical, Cross, DoubleUpRight, Vertical, //
        Vertical, DoubleUpLeft, Cross, Vertical, //
        UpRight, Horizontal, Horizontal, UpLeft, //
    ]
}
