#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative tile grid for the Rail Slide engine.
//!
//! The grid owns every tile coordinate and the single blank slot. It is the
//! only component allowed to mutate either; systems observe it through the
//! read-only accessors and the [`query`] module. Every slide rebuilds the
//! connection graph before returning, so a query issued after any mutation
//! always sees fresh neighbor links.

pub mod catalog;
pub mod connection;
mod transition;

use std::time::Duration;

use glam::{Vec2, Vec3};
use log::{debug, warn};
use railslide_core::{Command, CurveError, Event, GridCoord, Side, SlideError, TileId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use catalog::TileKind;
pub use connection::{PathDirectionInfo, PathEdge, TileConnection};
pub use transition::SlideTransition;

/// Strategy used to choose which cell starts out blank.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlankPlacement {
    /// A random cell on the outer ring of the grid.
    Perimeter,
    /// The provided coordinate.
    Fixed(GridCoord),
}

/// Parameters controlling how a grid is laid out and shuffled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of columns.
    pub columns: u32,
    /// Number of rows.
    pub rows: u32,
    /// World-space width of one tile.
    pub tile_width: f32,
    /// World-space depth of one tile.
    pub tile_height: f32,
    /// Random pair swaps applied to the perimeter before the blank is chosen.
    pub shuffle_swaps: u32,
    /// How the blank slot is chosen.
    pub blank: BlankPlacement,
    /// Expected length of one animated slide.
    pub transition_duration: Duration,
}

impl GridConfig {
    /// Unshuffled layout with the blank at `(1, 2)`, used by the title board.
    #[must_use]
    pub fn title() -> Self {
        Self {
            shuffle_swaps: 0,
            blank: BlankPlacement::Fixed(GridCoord::new(1, 2)),
            ..Self::default()
        }
    }

    fn validate(&self, templates: usize) -> Result<usize, GridError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(GridError::EmptyDimensions {
                columns: self.columns,
                rows: self.rows,
            });
        }
        let valid_extent = |extent: f32| extent.is_finite() && extent > 0.0;
        if !valid_extent(self.tile_width) || !valid_extent(self.tile_height) {
            return Err(GridError::InvalidTileExtent {
                width: self.tile_width,
                height: self.tile_height,
            });
        }

        let required = u64::from(self.columns) * u64::from(self.rows);
        let required = usize::try_from(required).unwrap_or(usize::MAX);
        if templates < required {
            return Err(GridError::InsufficientTemplates {
                required,
                provided: templates,
            });
        }
        if let BlankPlacement::Fixed(blank) = self.blank {
            if !blank.within(self.columns, self.rows) {
                return Err(GridError::BlankOutOfBounds { blank });
            }
        }
        Ok(required)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 4,
            rows: 4,
            tile_width: 5.0,
            tile_height: 5.0,
            shuffle_swaps: 128,
            blank: BlankPlacement::Perimeter,
            transition_duration: Duration::from_millis(250),
        }
    }
}

/// Configuration problems detected while building a grid.
#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    /// One of the dimensions was zero.
    #[error("grid dimensions must be non-zero, got {columns}x{rows}")]
    EmptyDimensions {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Fewer tile templates than grid cells were provided.
    #[error("grid needs {required} tile templates but only {provided} were provided")]
    InsufficientTemplates {
        /// Number of cells in the grid.
        required: usize,
        /// Number of templates supplied.
        provided: usize,
    },
    /// The fixed blank slot lies outside the grid.
    #[error("blank slot {blank:?} lies outside the grid")]
    BlankOutOfBounds {
        /// Requested blank coordinate.
        blank: GridCoord,
    },
    /// Tile extents must be finite and positive.
    #[error("tile extent {width}x{height} must be finite and positive")]
    InvalidTileExtent {
        /// Requested tile width.
        width: f32,
        /// Requested tile height.
        height: f32,
    },
    /// A rail curve could not be built.
    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// A movable tile together with its authored rails.
#[derive(Debug)]
pub struct Tile {
    id: TileId,
    kind: TileKind,
    coord: GridCoord,
    connection: TileConnection,
}

impl Tile {
    /// Identifier of the tile.
    #[must_use]
    pub const fn id(&self) -> TileId {
        self.id
    }

    /// Template the tile was built from.
    #[must_use]
    pub const fn kind(&self) -> TileKind {
        self.kind
    }

    /// Coordinate the tile currently occupies.
    #[must_use]
    pub const fn coord(&self) -> GridCoord {
        self.coord
    }

    /// Authored rails and neighbor links of the tile.
    #[must_use]
    pub const fn connection(&self) -> &TileConnection {
        &self.connection
    }
}

/// One tile moving one step toward the previous blank slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileShift {
    /// Tile that moved.
    pub tile: TileId,
    /// Coordinate before the slide.
    pub from: GridCoord,
    /// Coordinate after the slide.
    pub to: GridCoord,
}

/// Receiver for visual transition requests emitted by animated slides.
pub trait TileAnimator {
    /// Requests that `tile` be tweened from `from` to `to` over `duration`.
    fn request_transition(
        &mut self,
        tile: TileId,
        from: GridCoord,
        to: GridCoord,
        duration: Duration,
    );
}

impl TileAnimator for Vec<Event> {
    fn request_transition(
        &mut self,
        tile: TileId,
        from: GridCoord,
        to: GridCoord,
        duration: Duration,
    ) {
        self.push(Event::TransitionRequested {
            tile,
            from,
            to,
            duration,
        });
    }
}

/// Snapshot of every tile's neighbor links, ordered by tile identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionTable {
    entries: Vec<(TileId, [Option<TileId>; 4])>,
}

impl ConnectionTable {
    /// Neighbor links of `tile`, indexed by [`Side::index`].
    #[must_use]
    pub fn links(&self, tile: TileId) -> Option<[Option<TileId>; 4]> {
        self.entries
            .iter()
            .find(|(id, _)| *id == tile)
            .map(|(_, links)| *links)
    }

    /// Total number of directed links in the table.
    #[must_use]
    pub fn link_count(&self) -> usize {
        self.entries
            .iter()
            .map(|(_, links)| links.iter().flatten().count())
            .sum()
    }
}

/// Grid of sliding tiles with exactly one blank slot.
#[derive(Debug)]
pub struct TileGrid {
    config: GridConfig,
    tiles: Vec<Tile>,
    cells: Vec<Option<TileId>>,
    blank: GridCoord,
    transition: SlideTransition,
}

impl TileGrid {
    /// Lays out `templates` row-major, shuffles the perimeter, removes the
    /// blank tile and builds the connection graph.
    pub fn new<R: Rng + ?Sized>(
        config: GridConfig,
        templates: &[TileKind],
        rng: &mut R,
    ) -> Result<Self, GridError> {
        let cell_count = config.validate(templates.len())?;
        let mut kinds = templates[..cell_count].to_vec();

        let perimeter = perimeter_cells(config.columns, config.rows);
        if perimeter.len() > 1 {
            for _ in 0..config.shuffle_swaps {
                let first = perimeter[rng.gen_range(0..perimeter.len())];
                let second = perimeter[rng.gen_range(0..perimeter.len())];
                kinds.swap(first, second);
            }
        }

        let blank = match config.blank {
            BlankPlacement::Fixed(coord) => coord,
            BlankPlacement::Perimeter => {
                let index = perimeter[rng.gen_range(0..perimeter.len())];
                coord_from_index(index, config.columns)
            }
        };

        let mut tiles = Vec::with_capacity(cell_count.saturating_sub(1));
        let mut cells = vec![None; cell_count];
        for (index, kind) in kinds.into_iter().enumerate() {
            let coord = coord_from_index(index, config.columns);
            if coord == blank {
                continue;
            }
            let id = TileId::new(u32::try_from(tiles.len()).unwrap_or(u32::MAX));
            let edges = kind.build_edges(config.tile_width, config.tile_height)?;
            cells[index] = Some(id);
            tiles.push(Tile {
                id,
                kind,
                coord,
                connection: TileConnection::new(edges),
            });
        }

        let mut grid = Self {
            transition: SlideTransition::new(config.transition_duration),
            config,
            tiles,
            cells,
            blank,
        };
        grid.rebuild_connections();
        Ok(grid)
    }

    /// Destroys every tile and lays the grid out again with the same
    /// configuration.
    pub fn reinitialize<R: Rng + ?Sized>(
        &mut self,
        templates: &[TileKind],
        rng: &mut R,
    ) -> Result<(), GridError> {
        *self = Self::new(self.config.clone(), templates, rng)?;
        Ok(())
    }

    /// Configuration the grid was built with.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Number of columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.config.columns
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.config.rows
    }

    /// Current blank slot.
    #[must_use]
    pub const fn blank(&self) -> GridCoord {
        self.blank
    }

    /// Every tile, ordered by identifier.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tile with the provided identifier.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        let index = usize::try_from(id.get()).ok()?;
        self.tiles.get(index)
    }

    /// Identifier of the tile occupying `coord`.
    #[must_use]
    pub fn tile_at(&self, coord: GridCoord) -> Option<TileId> {
        self.index(coord)
            .and_then(|index| self.cells.get(index).copied().flatten())
    }

    /// Tile occupying `coord`.
    #[must_use]
    pub fn find_tile(&self, coord: GridCoord) -> Option<&Tile> {
        self.tile_at(coord).and_then(|id| self.tile(id))
    }

    /// Rails and neighbor links of `id`.
    #[must_use]
    pub fn connection(&self, id: TileId) -> Option<&TileConnection> {
        self.tile(id).map(Tile::connection)
    }

    /// Coordinate currently occupied by `id`.
    #[must_use]
    pub fn coord_of(&self, id: TileId) -> Option<GridCoord> {
        self.tile(id).map(Tile::coord)
    }

    /// Reports whether `coord` shares the blank's row or column without being
    /// the blank itself.
    #[must_use]
    pub fn is_slide_enabled(&self, coord: GridCoord) -> bool {
        self.check_slide(coord).is_ok()
    }

    /// Slides toward the blank without requesting animation.
    ///
    /// An in-flight transition from an earlier animated slide is cancelled.
    pub fn slide(&mut self, origin: GridCoord) -> Result<Vec<TileShift>, SlideError> {
        let shifts = self.shift_toward_blank(origin, &mut |_| {})?;
        self.transition.cancel();
        Ok(shifts)
    }

    /// Slides toward the blank and requests a transition for every shifted
    /// tile.
    ///
    /// Grid state is final on return. Without an animator the slide still
    /// happens but no transition timer is started.
    pub fn slide_animated(
        &mut self,
        origin: GridCoord,
        animator: Option<&mut dyn TileAnimator>,
    ) -> Result<Vec<TileShift>, SlideError> {
        if self.transition.is_running() {
            return Err(SlideError::TransitionInFlight);
        }

        match animator {
            Some(animator) => {
                let duration = self.config.transition_duration;
                let shifts = self.shift_toward_blank(origin, &mut |shift| {
                    animator.request_transition(shift.tile, shift.from, shift.to, duration);
                })?;
                self.transition.start();
                Ok(shifts)
            }
            None => {
                warn!("animated slide at {origin:?} has no animator attached");
                self.shift_toward_blank(origin, &mut |_| {})
            }
        }
    }

    /// Advances the slide transition; returns `true` when it settles.
    pub fn tick(&mut self, dt: Duration) -> bool {
        self.transition.advance(dt)
    }

    /// Reports whether an animated slide is still settling.
    #[must_use]
    pub fn is_in_transition(&self) -> bool {
        self.transition.is_running()
    }

    /// Stops tracking the in-flight transition. Idempotent.
    pub fn cancel_transition(&mut self) {
        self.transition.cancel();
    }

    /// Recomputes every tile's neighbor links from scratch.
    ///
    /// A side is linked only when the geometric neighbor exists and declares
    /// a rail ending on the facing side.
    pub fn rebuild_connections(&mut self) {
        for tile in &mut self.tiles {
            tile.connection.clear_neighbors();
        }

        let mut links = Vec::new();
        for (index, tile) in self.tiles.iter().enumerate() {
            for side in Side::ALL {
                if !tile.connection.has_connection(side) {
                    continue;
                }
                let Some(neighbor) = tile
                    .coord
                    .offset(side, self.config.columns, self.config.rows)
                    .and_then(|coord| self.find_tile(coord))
                else {
                    continue;
                };
                if neighbor.connection.has_connection(side.opposite()) {
                    links.push((index, side, neighbor.id));
                }
            }
        }

        debug!("rebuilt connections: {} links", links.len());
        for (index, side, neighbor) in links {
            self.tiles[index].connection.link(side, neighbor);
        }
    }

    /// Snapshot of the current neighbor links.
    #[must_use]
    pub fn connection_table(&self) -> ConnectionTable {
        ConnectionTable {
            entries: self
                .tiles
                .iter()
                .map(|tile| (tile.id, tile.connection.neighbors()))
                .collect(),
        }
    }

    /// World-space extent of the whole grid on the XZ plane.
    #[must_use]
    pub fn world_size(&self) -> Vec2 {
        Vec2::new(
            self.config.columns as f32 * self.config.tile_width,
            self.config.rows as f32 * self.config.tile_height,
        )
    }

    /// World-space centre of the cell at `coord`.
    ///
    /// The grid is centred on the origin; rows advance toward negative Z.
    #[must_use]
    pub fn tile_world_position(&self, coord: GridCoord) -> Vec3 {
        let size = self.world_size();
        let origin = Vec3::new(
            -size.x * 0.5 + self.config.tile_width * 0.5,
            0.0,
            size.y * 0.5 - self.config.tile_height * 0.5,
        );
        origin
            + Vec3::new(
                coord.column() as f32 * self.config.tile_width,
                0.0,
                -(coord.row() as f32) * self.config.tile_height,
            )
    }

    fn check_slide(&self, origin: GridCoord) -> Result<(), SlideError> {
        if !origin.within(self.config.columns, self.config.rows) {
            return Err(SlideError::OutOfBounds);
        }
        if origin == self.blank {
            return Err(SlideError::IsBlank);
        }
        if !origin.is_aligned_with(self.blank) {
            return Err(SlideError::NotAligned);
        }
        Ok(())
    }

    fn shift_toward_blank(
        &mut self,
        origin: GridCoord,
        hook: &mut dyn FnMut(&TileShift),
    ) -> Result<Vec<TileShift>, SlideError> {
        self.check_slide(origin)?;

        let mut shifts = Vec::new();
        let mut vacated = self.blank;
        for coord in self.slide_path(origin) {
            let (Some(from), Some(to)) = (self.index(coord), self.index(vacated)) else {
                break;
            };
            if let Some(id) = self.cells[from].take() {
                self.cells[to] = Some(id);
                if let Ok(index) = usize::try_from(id.get()) {
                    self.tiles[index].coord = vacated;
                }
                let shift = TileShift {
                    tile: id,
                    from: coord,
                    to: vacated,
                };
                hook(&shift);
                shifts.push(shift);
            }
            vacated = coord;
        }

        debug!(
            "slid {} tiles, blank {:?} -> {:?}",
            shifts.len(),
            self.blank,
            origin
        );
        self.blank = origin;
        self.rebuild_connections();
        Ok(shifts)
    }

    /// Cells from the one next to the blank up to `origin`, nearest first.
    fn slide_path(&self, origin: GridCoord) -> Vec<GridCoord> {
        let side = if origin.column() == self.blank.column() {
            if origin.row() < self.blank.row() {
                Side::Up
            } else {
                Side::Down
            }
        } else if origin.column() < self.blank.column() {
            Side::Left
        } else {
            Side::Right
        };

        let mut path = Vec::new();
        let mut cursor = self.blank;
        while cursor != origin {
            match cursor.offset(side, self.config.columns, self.config.rows) {
                Some(next) => {
                    path.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        path
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if coord.within(self.config.columns, self.config.rows) {
            let row = usize::try_from(coord.row()).ok()?;
            let column = usize::try_from(coord.column()).ok()?;
            let width = usize::try_from(self.config.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

fn coord_from_index(index: usize, columns: u32) -> GridCoord {
    let width = usize::try_from(columns).unwrap_or(1).max(1);
    let column = u32::try_from(index % width).unwrap_or(u32::MAX);
    let row = u32::try_from(index / width).unwrap_or(u32::MAX);
    GridCoord::new(column, row)
}

/// Row-major indices of the cells on the outer ring.
fn perimeter_cells(columns: u32, rows: u32) -> Vec<usize> {
    let width = usize::try_from(columns).unwrap_or(0);
    let height = usize::try_from(rows).unwrap_or(0);
    (0..width * height)
        .filter(|index| {
            let column = index % width;
            let row = index / width;
            column == 0 || row == 0 || column + 1 == width || row + 1 == height
        })
        .collect()
}

/// Applies the provided command to the grid, broadcasting the resulting
/// events.
pub fn apply(grid: &mut TileGrid, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SlideTile { origin } => match grid.slide(origin) {
            Ok(shifts) => push_slide_events(grid, origin, &shifts, Vec::new(), out_events),
            Err(reason) => out_events.push(Event::SlideRejected { origin, reason }),
        },
        Command::AnimateSlide { origin } => {
            let mut requests = Vec::new();
            match grid.slide_animated(origin, Some(&mut requests)) {
                Ok(shifts) => push_slide_events(grid, origin, &shifts, requests, out_events),
                Err(reason) => out_events.push(Event::SlideRejected { origin, reason }),
            }
        }
        Command::Tick { dt } => {
            if grid.tick(dt) {
                out_events.push(Event::TransitionsSettled);
            }
            out_events.push(Event::TimeAdvanced { dt });
        }
    }
}

fn push_slide_events(
    grid: &TileGrid,
    origin: GridCoord,
    shifts: &[TileShift],
    requests: Vec<Event>,
    out_events: &mut Vec<Event>,
) {
    out_events.extend(shifts.iter().map(|shift| Event::TileShifted {
        tile: shift.tile,
        from: shift.from,
        to: shift.to,
    }));
    out_events.extend(requests);
    out_events.push(Event::ConnectionsRebuilt);
    out_events.push(Event::SlideCompleted {
        origin,
        blank: grid.blank(),
    });
}

/// Query functions that resolve rail traversal against the current graph.
pub mod query {
    use railslide_core::{GridCoord, Side, TileId};

    use super::{PathDirectionInfo, PathEdge, TileGrid};

    /// Traversal description for a mover entering `tile` through `entry`.
    #[must_use]
    pub fn path_direction_info(
        grid: &TileGrid,
        tile: TileId,
        entry: Side,
    ) -> Option<PathDirectionInfo> {
        grid.connection(tile)?.path_direction_info(tile, entry)
    }

    /// Traversal description on the tile linked across `exit`, entering
    /// through the facing side. `None` when the link or the reciprocal rail
    /// is missing.
    #[must_use]
    pub fn next_segment(grid: &TileGrid, tile: TileId, exit: Side) -> Option<PathDirectionInfo> {
        let neighbor = grid.connection(tile)?.neighbor(exit)?;
        path_direction_info(grid, neighbor, exit.opposite())
    }

    /// Rail described by `info`.
    #[must_use]
    pub fn edge<'a>(grid: &'a TileGrid, info: &PathDirectionInfo) -> Option<&'a PathEdge> {
        grid.connection(info.tile)?.edges().get(info.edge)
    }

    /// Coordinate currently occupied by `tile`.
    #[must_use]
    pub fn tile_coord(grid: &TileGrid, tile: TileId) -> Option<GridCoord> {
        grid.coord_of(tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn title_grid() -> TileGrid {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        TileGrid::new(GridConfig::title(), &catalog::standard_layout(), &mut rng)
            .expect("title layout is valid")
    }

    fn occupied(grid: &TileGrid) -> Vec<(GridCoord, TileId)> {
        let mut cells: Vec<_> = grid.tiles().iter().map(|tile| (tile.coord(), tile.id())).collect();
        cells.sort();
        cells
    }

    #[test]
    fn new_rejects_empty_dimensions() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = GridConfig {
            columns: 0,
            ..GridConfig::default()
        };
        let result = TileGrid::new(config, &catalog::standard_layout(), &mut rng);
        assert_eq!(
            result.err(),
            Some(GridError::EmptyDimensions {
                columns: 0,
                rows: 4
            })
        );
    }

    #[test]
    fn new_rejects_missing_templates() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let templates = &catalog::standard_layout()[..10];
        let result = TileGrid::new(GridConfig::default(), templates, &mut rng);
        assert_eq!(
            result.err(),
            Some(GridError::InsufficientTemplates {
                required: 16,
                provided: 10
            })
        );
    }

    #[test]
    fn new_rejects_blank_outside_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = GridConfig {
            blank: BlankPlacement::Fixed(GridCoord::new(4, 0)),
            ..GridConfig::default()
        };
        let result = TileGrid::new(config, &catalog::standard_layout(), &mut rng);
        assert_eq!(
            result.err(),
            Some(GridError::BlankOutOfBounds {
                blank: GridCoord::new(4, 0)
            })
        );
    }

    #[test]
    fn new_rejects_degenerate_tile_extent() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let config = GridConfig {
            tile_width: 0.0,
            ..GridConfig::default()
        };
        let result = TileGrid::new(config, &catalog::standard_layout(), &mut rng);
        assert!(matches!(result, Err(GridError::InvalidTileExtent { .. })));
    }

    #[test]
    fn title_layout_places_tiles_row_major_around_fixed_blank() {
        let grid = title_grid();

        assert_eq!(grid.blank(), GridCoord::new(1, 2));
        assert_eq!(grid.tiles().len(), 15);
        assert!(grid.find_tile(GridCoord::new(1, 2)).is_none());

        let corner = grid.find_tile(GridCoord::new(0, 0)).expect("corner tile");
        assert_eq!(corner.id(), TileId::new(0));
        assert_eq!(corner.kind(), TileKind::DownRight);

        let after_blank = grid.find_tile(GridCoord::new(2, 2)).expect("tile after blank");
        assert_eq!(after_blank.id(), TileId::new(9));
        assert_eq!(after_blank.kind(), TileKind::Cross);
    }

    #[test]
    fn perimeter_shuffle_keeps_interior_and_blanks_the_ring() {
        let layout = catalog::standard_layout();
        for seed in 0..16 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let grid = TileGrid::new(GridConfig::default(), &layout, &mut rng).expect("valid");

            let blank = grid.blank();
            assert!(
                blank.column() == 0 || blank.row() == 0 || blank.column() == 3 || blank.row() == 3
            );
            for (column, row) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
                let tile = grid.find_tile(GridCoord::new(column, row)).expect("interior tile");
                assert_eq!(tile.kind(), layout[(row * 4 + column) as usize]);
            }
        }
    }

    #[test]
    fn slide_enabled_only_on_blank_lines() {
        let grid = title_grid();

        assert!(grid.is_slide_enabled(GridCoord::new(1, 0)));
        assert!(grid.is_slide_enabled(GridCoord::new(3, 2)));
        assert!(!grid.is_slide_enabled(GridCoord::new(1, 2)));
        assert!(!grid.is_slide_enabled(GridCoord::new(0, 0)));
        assert!(!grid.is_slide_enabled(GridCoord::new(1, 9)));
    }

    #[test]
    fn slide_shifts_every_tile_on_the_line() {
        let mut grid = title_grid();
        let top = grid.tile_at(GridCoord::new(1, 0)).expect("tile");
        let middle = grid.tile_at(GridCoord::new(1, 1)).expect("tile");

        let shifts = grid.slide(GridCoord::new(1, 0)).expect("aligned");

        assert_eq!(
            shifts,
            vec![
                TileShift {
                    tile: middle,
                    from: GridCoord::new(1, 1),
                    to: GridCoord::new(1, 2),
                },
                TileShift {
                    tile: top,
                    from: GridCoord::new(1, 0),
                    to: GridCoord::new(1, 1),
                },
            ]
        );
        assert_eq!(grid.blank(), GridCoord::new(1, 0));
        assert_eq!(grid.tile_at(GridCoord::new(1, 2)), Some(middle));
        assert_eq!(grid.tile_at(GridCoord::new(1, 1)), Some(top));
        assert_eq!(grid.coord_of(top), Some(GridCoord::new(1, 1)));
    }

    #[test]
    fn horizontal_slide_moves_toward_blank() {
        let mut grid = title_grid();
        let far = grid.tile_at(GridCoord::new(3, 2)).expect("tile");

        let shifts = grid.slide(GridCoord::new(3, 2)).expect("aligned");

        assert_eq!(shifts.len(), 2);
        assert_eq!(grid.tile_at(GridCoord::new(2, 2)), Some(far));
        assert_eq!(grid.blank(), GridCoord::new(3, 2));
    }

    #[test]
    fn rejected_slide_leaves_grid_untouched() {
        let mut grid = title_grid();
        let before = occupied(&grid);

        assert_eq!(grid.slide(GridCoord::new(0, 0)), Err(SlideError::NotAligned));
        assert_eq!(grid.slide(GridCoord::new(1, 2)), Err(SlideError::IsBlank));
        assert_eq!(grid.slide(GridCoord::new(1, 4)), Err(SlideError::OutOfBounds));
        assert_eq!(occupied(&grid), before);
    }

    #[test]
    fn rebuild_links_reciprocal_rails_only() {
        let grid = title_grid();
        let corner = grid.connection(TileId::new(0)).expect("corner");
        assert_eq!(corner.neighbor(Side::Right), Some(TileId::new(1)));
        assert_eq!(corner.neighbor(Side::Down), Some(TileId::new(4)));

        let cross = grid.connection(TileId::new(5)).expect("cross");
        assert_eq!(cross.neighbor(Side::Up), None);
        assert_eq!(cross.neighbor(Side::Left), None);
        assert_eq!(cross.neighbor(Side::Right), Some(TileId::new(6)));
        assert_eq!(cross.neighbor(Side::Down), None);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut grid = title_grid();
        let first = grid.connection_table();
        grid.rebuild_connections();
        assert_eq!(grid.connection_table(), first);

        assert!(first.link_count() > 0);
        assert_eq!(first.link_count() % 2, 0);
        for tile in grid.tiles() {
            assert_eq!(first.links(tile.id()), Some(tile.connection().neighbors()));
        }
        assert_eq!(first.links(TileId::new(u32::MAX)), None);
    }

    #[test]
    fn animated_slide_requests_transitions_and_blocks_until_settled() {
        let mut grid = title_grid();
        let mut requests: Vec<Event> = Vec::new();

        let shifts = grid
            .slide_animated(GridCoord::new(1, 0), Some(&mut requests))
            .expect("aligned");
        assert_eq!(requests.len(), shifts.len());
        assert!(grid.is_in_transition());
        assert_eq!(
            grid.slide_animated(GridCoord::new(1, 2), Some(&mut requests)),
            Err(SlideError::TransitionInFlight)
        );

        assert!(grid.tick(Duration::from_millis(250)));
        assert!(!grid.is_in_transition());
        assert!(grid
            .slide_animated(GridCoord::new(1, 2), Some(&mut requests))
            .is_ok());
    }

    #[test]
    fn animated_slide_without_animator_skips_the_timer() {
        let mut grid = title_grid();
        let shifts = grid
            .slide_animated(GridCoord::new(1, 0), None)
            .expect("aligned");
        assert_eq!(shifts.len(), 2);
        assert!(!grid.is_in_transition());
    }

    #[test]
    fn immediate_slide_cancels_transition() {
        let mut grid = title_grid();
        let mut requests: Vec<Event> = Vec::new();
        let _ = grid
            .slide_animated(GridCoord::new(1, 0), Some(&mut requests))
            .expect("aligned");

        let _ = grid.slide(GridCoord::new(1, 2)).expect("aligned");
        assert!(!grid.is_in_transition());
        grid.cancel_transition();
        assert!(!grid.is_in_transition());
    }

    #[test]
    fn world_positions_centre_the_grid() {
        let grid = title_grid();
        let first = grid.tile_world_position(GridCoord::new(0, 0));
        let last = grid.tile_world_position(GridCoord::new(3, 3));

        assert!(first.abs_diff_eq(Vec3::new(-7.5, 0.0, 7.5), 1.0e-5));
        assert!(last.abs_diff_eq(Vec3::new(7.5, 0.0, -7.5), 1.0e-5));
        assert_eq!(grid.world_size(), Vec2::new(20.0, 20.0));
    }

    #[test]
    fn apply_broadcasts_slide_events_in_order() {
        let mut grid = title_grid();
        let mut events = Vec::new();

        apply(
            &mut grid,
            Command::AnimateSlide {
                origin: GridCoord::new(1, 1),
            },
            &mut events,
        );

        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], Event::TileShifted { .. }));
        assert!(matches!(events[1], Event::TransitionRequested { .. }));
        assert_eq!(events[2], Event::ConnectionsRebuilt);
        assert_eq!(
            events[3],
            Event::SlideCompleted {
                origin: GridCoord::new(1, 1),
                blank: GridCoord::new(1, 1),
            }
        );
    }

    #[test]
    fn apply_tick_settles_before_time_advances() {
        let mut grid = title_grid();
        let mut events = Vec::new();
        apply(
            &mut grid,
            Command::AnimateSlide {
                origin: GridCoord::new(0, 2),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut grid,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![
                Event::TransitionsSettled,
                Event::TimeAdvanced {
                    dt: Duration::from_secs(1)
                },
            ]
        );
    }

    #[test]
    fn apply_reports_rejections() {
        let mut grid = title_grid();
        let mut events = Vec::new();
        apply(
            &mut grid,
            Command::SlideTile {
                origin: GridCoord::new(0, 0),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::SlideRejected {
                origin: GridCoord::new(0, 0),
                reason: SlideError::NotAligned,
            }]
        );
    }

    #[test]
    fn query_resolves_next_segment_through_reciprocal_link() {
        let grid = title_grid();
        let next = query::next_segment(&grid, TileId::new(0), Side::Right).expect("linked");
        assert_eq!(next.tile, TileId::new(1));
        assert_eq!(next.entry, Side::Left);
        assert_eq!(next.exit, Side::Right);
        assert!(query::next_segment(&grid, TileId::new(5), Side::Down).is_none());
    }
}
