use std::collections::HashSet;

use proptest::prelude::*;
use railslide_core::{Command, Event, GridCoord, SlideError, TileId};
use railslide_grid::{self as grid, catalog, GridConfig, TileGrid};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn title_grid() -> TileGrid {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    TileGrid::new(GridConfig::title(), &catalog::standard_layout(), &mut rng)
        .expect("title layout is valid")
}

fn snapshot(grid: &TileGrid) -> Vec<(TileId, GridCoord)> {
    grid.tiles()
        .iter()
        .map(|tile| (tile.id(), tile.coord()))
        .collect()
}

#[test]
fn column_slide_round_trip_restores_layout() {
    let mut grid = title_grid();
    let original = snapshot(&grid);
    let original_links = grid.connection_table();
    let upper = grid.tile_at(GridCoord::new(1, 0)).expect("tile");
    let lower = grid.tile_at(GridCoord::new(1, 1)).expect("tile");

    let _ = grid.slide(GridCoord::new(1, 0)).expect("shares column");
    assert_eq!(grid.blank(), GridCoord::new(1, 0));
    assert_eq!(grid.tile_at(GridCoord::new(1, 2)), Some(lower));
    assert_eq!(grid.tile_at(GridCoord::new(1, 1)), Some(upper));

    let _ = grid.slide(GridCoord::new(1, 2)).expect("shares column");
    assert_eq!(grid.blank(), GridCoord::new(1, 2));
    assert_eq!(snapshot(&grid), original);
    assert_eq!(grid.connection_table(), original_links);
}

#[test]
fn reinitialize_recreates_tiles() {
    let mut grid = title_grid();
    let original = snapshot(&grid);
    let _ = grid.slide(GridCoord::new(3, 2)).expect("shares row");
    assert_ne!(snapshot(&grid), original);

    let mut rng = ChaCha8Rng::seed_from_u64(99);
    grid.reinitialize(&catalog::standard_layout(), &mut rng)
        .expect("same configuration");
    assert_eq!(snapshot(&grid), original);
    assert_eq!(grid.blank(), GridCoord::new(1, 2));
}

#[test]
fn shuffled_grids_are_reproducible_from_seed() {
    let layout = catalog::standard_layout();
    let build = |seed| {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = TileGrid::new(GridConfig::default(), &layout, &mut rng).expect("valid");
        let kinds: Vec<_> = grid
            .tiles()
            .iter()
            .map(|tile| (tile.coord(), tile.kind()))
            .collect();
        (grid.blank(), kinds)
    };

    assert_eq!(build(42), build(42));
}

#[test]
fn animated_commands_are_rejected_while_settling() {
    let mut grid = title_grid();
    let mut events = Vec::new();

    grid::apply(
        &mut grid,
        Command::AnimateSlide {
            origin: GridCoord::new(1, 0),
        },
        &mut events,
    );
    let requested = events
        .iter()
        .filter(|event| matches!(event, Event::TransitionRequested { .. }))
        .count();
    assert_eq!(requested, 2);

    events.clear();
    grid::apply(
        &mut grid,
        Command::AnimateSlide {
            origin: GridCoord::new(1, 3),
        },
        &mut events,
    );
    assert_eq!(
        events,
        vec![Event::SlideRejected {
            origin: GridCoord::new(1, 3),
            reason: SlideError::TransitionInFlight,
        }]
    );
}

fn manhattan(a: GridCoord, b: GridCoord) -> u32 {
    a.column().abs_diff(b.column()) + a.row().abs_diff(b.row())
}

fn coord_strategy() -> impl Strategy<Value = GridCoord> {
    (0u32..5, 0u32..5).prop_map(|(column, row)| GridCoord::new(column, row))
}

proptest! {
    #[test]
    fn slides_preserve_grid_invariants(
        seed in any::<u64>(),
        targets in prop::collection::vec(coord_strategy(), 1..40),
    ) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut grid = TileGrid::new(GridConfig::default(), &catalog::standard_layout(), &mut rng)
            .expect("valid configuration");

        for target in targets {
            let blank = grid.blank();
            let before = snapshot(&grid);
            let enabled = grid.is_slide_enabled(target);
            let expected_enabled = target.within(4, 4) && target != blank && target.is_aligned_with(blank);
            prop_assert_eq!(enabled, expected_enabled);

            match grid.slide(target) {
                Ok(shifts) => {
                    prop_assert!(enabled);
                    prop_assert_eq!(grid.blank(), target);
                    let span = manhattan(blank, target);
                    prop_assert_eq!(shifts.len() as u32, span);
                    let moved: HashSet<_> = shifts.iter().map(|shift| shift.tile).collect();
                    let vacated: HashSet<_> = shifts.iter().map(|shift| shift.from).collect();
                    prop_assert_eq!(vacated.len(), shifts.len());
                    for shift in &shifts {
                        prop_assert_eq!(manhattan(shift.from, shift.to), 1);
                        prop_assert!(shift.from.is_aligned_with(blank));
                        prop_assert_eq!(manhattan(shift.to, blank) + 1, manhattan(shift.from, blank));
                        prop_assert_eq!(manhattan(shift.from, target) + manhattan(shift.from, blank), span);
                    }
                    for (id, coord) in before {
                        if !moved.contains(&id) {
                            prop_assert_eq!(grid.coord_of(id), Some(coord));
                        }
                    }
                }
                Err(_) => {
                    prop_assert!(!enabled);
                    prop_assert_eq!(snapshot(&grid), before);
                }
            }

            let coords: HashSet<_> = grid.tiles().iter().map(|tile| tile.coord()).collect();
            prop_assert_eq!(coords.len(), 15);
            prop_assert!(!coords.contains(&grid.blank()));
            for tile in grid.tiles() {
                prop_assert_eq!(grid.tile_at(tile.coord()), Some(tile.id()));
            }

            let links = grid.connection_table();
            grid.rebuild_connections();
            prop_assert_eq!(grid.connection_table(), links);
        }
    }
}
