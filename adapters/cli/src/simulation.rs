//! Headless game loop wiring the grid, the mover, the spawner and the ledger.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use railslide_core::{Command, Event, GridCoord};
use railslide_grid::{self as grid, catalog, GridConfig, TileGrid};
use railslide_system_movement::{MoverPhase, PathMover};
use railslide_system_spawning::{Config, ScoreLedger, SpawnRequest, SpawnSelector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const MOVER_START: GridCoord = GridCoord::new(1, 1);
const PICKUP_RADIUS: f32 = 0.8;

/// Parameters of one headless run.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SimulationConfig {
    pub(crate) seed: u64,
    pub(crate) ticks: u32,
    pub(crate) tick_ms: u64,
    pub(crate) slides: u32,
    pub(crate) title_layout: bool,
}

/// Outcome printed at the end of a run.
#[derive(Clone, Debug)]
pub(crate) struct Summary {
    ticks: u32,
    slides_applied: u32,
    slides_rejected: u32,
    waves: u32,
    items_collected: u32,
    score: u64,
    level: u32,
    phase: MoverPhase,
    tile: Option<GridCoord>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ticks: {}", self.ticks)?;
        writeln!(
            f,
            "slides: {} applied, {} rejected",
            self.slides_applied, self.slides_rejected
        )?;
        writeln!(f, "waves: {}", self.waves)?;
        writeln!(f, "items collected: {}", self.items_collected)?;
        writeln!(f, "score: {} (level {})", self.score, self.level)?;
        match self.tile {
            Some(tile) => write!(
                f,
                "mover: {:?} at ({}, {})",
                self.phase,
                tile.column(),
                tile.row()
            ),
            None => write!(f, "mover: {:?}", self.phase),
        }
    }
}

/// Owns every component of a round and advances them in lockstep.
pub(crate) struct Simulation {
    config: SimulationConfig,
    rng: ChaCha8Rng,
    grid: TileGrid,
    mover: PathMover,
    selector: SpawnSelector,
    ledger: ScoreLedger,
    items: Vec<SpawnRequest>,
}

impl Simulation {
    pub(crate) fn new(config: SimulationConfig) -> Result<Self> {
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let grid_config = if config.title_layout {
            GridConfig::title()
        } else {
            GridConfig::default()
        };
        let grid = TileGrid::new(grid_config, &catalog::standard_layout(), &mut rng)
            .context("failed to lay out the tile grid")?;

        let mut mover = PathMover::default();
        mover
            .initialize(&grid, MOVER_START)
            .context("failed to place the mover")?;

        let selector = SpawnSelector::seeded(Config::default(), rng.gen())
            .context("invalid spawn tables")?;

        Ok(Self {
            config,
            rng,
            grid,
            mover,
            selector,
            ledger: ScoreLedger::default(),
            items: Vec::new(),
        })
    }

    pub(crate) fn run(&mut self) -> Result<Summary> {
        let dt = Duration::from_millis(self.config.tick_ms);
        let slide_every = (self.config.ticks / self.config.slides.saturating_add(1)).max(1);
        let mut slides_remaining = self.config.slides;
        let mut slides_applied = 0;
        let mut slides_rejected = 0;
        let mut items_collected = 0;
        let mut ticks = 0;

        let mut events = Vec::new();
        self.selector
            .initialize(&self.grid, &mut self.items, &mut events)
            .context("first spawn wave failed")?;
        self.mover.handle(&events, &self.grid);
        self.selector.resume();
        self.ledger.resume();
        self.mover.launch();

        for tick in 1..=self.config.ticks {
            ticks = tick;
            let mut events = Vec::new();

            if slides_remaining > 0 && tick % slide_every == 0 {
                slides_remaining -= 1;
                if let Some(origin) = self.pick_slide() {
                    grid::apply(&mut self.grid, Command::AnimateSlide { origin }, &mut events);
                    if events
                        .iter()
                        .any(|event| matches!(event, Event::SlideRejected { .. }))
                    {
                        slides_rejected += 1;
                    } else {
                        slides_applied += 1;
                    }
                }
            }

            grid::apply(&mut self.grid, Command::Tick { dt }, &mut events);
            self.mover.handle(&events, &self.grid);
            self.ledger.handle(&events);

            let mut wave_items = Vec::new();
            let mut wave_events = Vec::new();
            self.selector
                .handle(&events, &self.grid, &mut wave_items, &mut wave_events)
                .context("spawn wave failed")?;
            if !wave_events.is_empty() {
                self.replace_items(wave_items);
                self.mover.handle(&wave_events, &self.grid);
            }

            items_collected += self.collect_items();

            if self.mover.is_no_path() {
                info!("round over after {tick} ticks");
                break;
            }
        }

        self.selector.stop();
        self.ledger.pause();
        Ok(Summary {
            ticks,
            slides_applied,
            slides_rejected,
            waves: self.selector.wave(),
            items_collected,
            score: self.ledger.score(),
            level: self.ledger.level(),
            phase: self.mover.phase(),
            tile: self.mover.current_tile_coord(&self.grid),
        })
    }

    fn pick_slide(&mut self) -> Option<GridCoord> {
        let candidates: Vec<GridCoord> = (0..self.grid.rows())
            .flat_map(|row| (0..self.grid.columns()).map(move |column| GridCoord::new(column, row)))
            .filter(|coord| self.grid.is_slide_enabled(*coord))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        Some(candidates[self.rng.gen_range(0..candidates.len())])
    }

    /// Swaps in the latest wave. Earlier waves fired in the same tick are
    /// discarded with the previous board.
    fn replace_items(&mut self, wave_items: Vec<SpawnRequest>) {
        let wave = self.selector.wave();
        self.items = wave_items;
        self.items.retain(|item| item.wave == wave);
    }

    fn collect_items(&mut self) -> u32 {
        if self.grid.is_in_transition() {
            return 0;
        }
        let Some(pose) = self.mover.pose(&self.grid) else {
            return 0;
        };

        let grid = &self.grid;
        let selector = &self.selector;
        let ledger = &mut self.ledger;
        let mut collected = 0;
        self.items.retain(|item| {
            if item.world_position(grid).distance(pose.position) > PICKUP_RADIUS {
                return true;
            }
            let added = ledger.collect(selector.score_for(item.kind), selector.score_rate_for(item.kind));
            debug!("collected {:?} for {added} points", item.kind);
            collected += 1;
            false
        });
        collected
    }
}
