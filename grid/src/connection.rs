//! Authored path edges and the derived side-to-neighbor map of a tile.

use railslide_core::{Curve, Side, TileId, TraversalDirection};

/// Authored curve joining two sides of a tile.
///
/// The edge itself has no direction: a mover entering through `first` walks
/// the curve forward, a mover entering through `second` walks it in reverse.
#[derive(Debug)]
pub struct PathEdge {
    first: Side,
    second: Side,
    curve: Box<dyn Curve>,
}

impl PathEdge {
    /// Binds a curve to its two declared ends.
    #[must_use]
    pub fn new(first: Side, second: Side, curve: Box<dyn Curve>) -> Self {
        Self {
            first,
            second,
            curve,
        }
    }

    /// Side evaluated at the curve's minimum parameter.
    #[must_use]
    pub const fn first(&self) -> Side {
        self.first
    }

    /// Side evaluated at the curve's maximum parameter.
    #[must_use]
    pub const fn second(&self) -> Side {
        self.second
    }

    /// Curve traversed between the two ends.
    #[must_use]
    pub fn curve(&self) -> &dyn Curve {
        self.curve.as_ref()
    }

    /// Reports whether either declared end equals `side`.
    #[must_use]
    pub fn touches(&self, side: Side) -> bool {
        self.first == side || self.second == side
    }
}

/// Describes how a mover traverses one edge of one tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PathDirectionInfo {
    /// Tile owning the edge.
    pub tile: TileId,
    /// Index of the edge inside the tile's authored edge list.
    pub edge: usize,
    /// Side the mover entered through.
    pub entry: Side,
    /// Side the mover leaves through.
    pub exit: Side,
    /// Traversal direction derived from the entry side.
    pub direction: TraversalDirection,
}

/// Per-tile authored edges plus the neighbor links derived from the current
/// grid arrangement.
///
/// The neighbor links are only written by the grid's connection rebuild and
/// are cleared at the start of every rebuild.
#[derive(Debug)]
pub struct TileConnection {
    edges: Vec<PathEdge>,
    neighbors: [Option<TileId>; 4],
}

impl TileConnection {
    /// Creates a connection record with no neighbor links.
    #[must_use]
    pub fn new(edges: Vec<PathEdge>) -> Self {
        Self {
            edges,
            neighbors: [None; 4],
        }
    }

    /// Authored edges in declaration order.
    #[must_use]
    pub fn edges(&self) -> &[PathEdge] {
        &self.edges
    }

    /// Index of the first edge touching `side`.
    #[must_use]
    pub fn edge_index(&self, side: Side) -> Option<usize> {
        self.edges.iter().position(|edge| edge.touches(side))
    }

    /// Reports whether an authored edge ends at `side`.
    #[must_use]
    pub fn has_connection(&self, side: Side) -> bool {
        self.edge_index(side).is_some()
    }

    /// Edge ending at `side`, if any.
    #[must_use]
    pub fn edge(&self, side: Side) -> Option<&PathEdge> {
        self.edge_index(side).map(|index| &self.edges[index])
    }

    /// `Forward` when `side` is the edge's first declared end, `Reverse` when
    /// it is the second, `None` when no edge ends there.
    #[must_use]
    pub fn direction_from(&self, side: Side) -> Option<TraversalDirection> {
        self.edge(side).map(|edge| {
            if edge.first == side {
                TraversalDirection::Forward
            } else {
                TraversalDirection::Reverse
            }
        })
    }

    /// Other end of the edge ending at `side`.
    #[must_use]
    pub fn opposite_side(&self, side: Side) -> Option<Side> {
        self.edge(side).map(|edge| {
            if edge.first == side {
                edge.second
            } else {
                edge.first
            }
        })
    }

    /// Tile linked across `side` by the most recent rebuild.
    #[must_use]
    pub fn neighbor(&self, side: Side) -> Option<TileId> {
        if !self.has_connection(side) {
            return None;
        }
        self.neighbors[side.index()]
    }

    /// Snapshot of every side's link, indexed by [`Side::index`].
    #[must_use]
    pub const fn neighbors(&self) -> [Option<TileId>; 4] {
        self.neighbors
    }

    /// Traversal description for a mover entering this tile through `side`.
    #[must_use]
    pub fn path_direction_info(&self, tile: TileId, side: Side) -> Option<PathDirectionInfo> {
        let edge = self.edge_index(side)?;
        let exit = self.opposite_side(side)?;
        let direction = self.direction_from(side)?;
        Some(PathDirectionInfo {
            tile,
            edge,
            entry: side,
            exit,
            direction,
        })
    }

    pub(crate) fn clear_neighbors(&mut self) {
        self.neighbors = [None; 4];
    }

    pub(crate) fn link(&mut self, side: Side, neighbor: TileId) {
        self.neighbors[side.index()] = Some(neighbor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use railslide_core::PolylineCurve;

    fn edge(first: Side, second: Side) -> PathEdge {
        let curve = PolylineCurve::straight(Vec3::ZERO, Vec3::X).expect("valid segment");
        PathEdge::new(first, second, Box::new(curve))
    }

    #[test]
    fn sides_resolve_to_declared_ends() {
        let connection = TileConnection::new(vec![edge(Side::Left, Side::Up)]);

        assert!(connection.has_connection(Side::Left));
        assert!(connection.has_connection(Side::Up));
        assert!(!connection.has_connection(Side::Down));

        assert_eq!(
            connection.direction_from(Side::Left),
            Some(TraversalDirection::Forward)
        );
        assert_eq!(
            connection.direction_from(Side::Up),
            Some(TraversalDirection::Reverse)
        );
        assert_eq!(connection.direction_from(Side::Right), None);

        assert_eq!(connection.opposite_side(Side::Left), Some(Side::Up));
        assert_eq!(connection.opposite_side(Side::Up), Some(Side::Left));
        assert_eq!(connection.opposite_side(Side::Right), None);
    }

    #[test]
    fn crossing_edges_keep_independent_sides() {
        let connection = TileConnection::new(vec![
            edge(Side::Left, Side::Right),
            edge(Side::Up, Side::Down),
        ]);

        assert_eq!(connection.edge_index(Side::Right), Some(0));
        assert_eq!(connection.edge_index(Side::Down), Some(1));
        assert_eq!(connection.opposite_side(Side::Down), Some(Side::Up));
    }

    #[test]
    fn neighbor_requires_an_authored_edge() {
        let mut connection = TileConnection::new(vec![edge(Side::Left, Side::Right)]);
        connection.link(Side::Left, TileId::new(4));
        connection.link(Side::Up, TileId::new(5));

        assert_eq!(connection.neighbor(Side::Left), Some(TileId::new(4)));
        assert_eq!(connection.neighbor(Side::Up), None);

        connection.clear_neighbors();
        assert_eq!(connection.neighbor(Side::Left), None);
    }

    #[test]
    fn direction_info_describes_entry_and_exit() {
        let connection = TileConnection::new(vec![edge(Side::Down, Side::Right)]);
        let info = connection
            .path_direction_info(TileId::new(2), Side::Right)
            .expect("edge touches right");

        assert_eq!(info.tile, TileId::new(2));
        assert_eq!(info.edge, 0);
        assert_eq!(info.entry, Side::Right);
        assert_eq!(info.exit, Side::Down);
        assert_eq!(info.direction, TraversalDirection::Reverse);
        assert!(connection
            .path_direction_info(TileId::new(2), Side::Up)
            .is_none());
    }
}
