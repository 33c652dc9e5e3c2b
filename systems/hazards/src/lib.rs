#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bomb placement and per-frame hazard evaluation.
//!
//! Bombs arm when the player enters their proximity zone and detonate once
//! their tier's fuse has elapsed. The system only proposes `ArmBomb` and
//! `DetonateBomb` commands; the world validates and applies them after the
//! whole pass has been collected.

use std::time::Duration;

use blast_maze_core::{
    BombColor, BombPlacement, BombView, CellCoord, Command, Event, Maze, SeverityTier,
    PROXIMITY_RADIUS,
};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Random cell draws attempted per bomb before falling back to the open-cell list.
const SPAWN_ATTEMPTS: u32 = 4_096;

/// Colour of the slowest tier.
pub const GREEN: BombColor = BombColor::from_rgb(0, 255, 0);
/// Colour of the intermediate tier.
pub const AMBER: BombColor = BombColor::from_rgb(255, 191, 0);
/// Colour of the fastest tier.
pub const RED: BombColor = BombColor::from_rgb(255, 0, 0);

/// Severity tiers used when no table is configured.
#[must_use]
pub fn default_tiers() -> Vec<SeverityTier> {
    vec![
        SeverityTier::new(GREEN, Duration::from_millis(4_000)),
        SeverityTier::new(AMBER, Duration::from_millis(2_800)),
        SeverityTier::new(RED, Duration::from_millis(2_000)),
    ]
}

/// Spawn range and tier table for the hazard system.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    min_bombs: u32,
    max_bombs: u32,
    tiers: Vec<SeverityTier>,
}

impl Tuning {
    /// Creates a tuning table spawning between `min_bombs` and `max_bombs` bombs inclusive.
    #[must_use]
    pub fn new(min_bombs: u32, max_bombs: u32, tiers: Vec<SeverityTier>) -> Self {
        Self {
            min_bombs,
            max_bombs,
            tiers,
        }
    }

    /// Smallest number of bombs spawned per level.
    #[must_use]
    pub fn min_bombs(&self) -> u32 {
        self.min_bombs
    }

    /// Largest number of bombs spawned per level.
    #[must_use]
    pub fn max_bombs(&self) -> u32 {
        self.max_bombs
    }

    /// Severity tiers bombs are drawn from.
    #[must_use]
    pub fn tiers(&self) -> &[SeverityTier] {
        &self.tiers
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(2, 8, default_tiers())
    }
}

/// Pure system that places bombs and drives their arming and detonation.
#[derive(Debug)]
pub struct Hazards {
    tuning: Tuning,
    rng: ChaCha8Rng,
}

impl Hazards {
    /// Creates a hazard system whose placements are fully determined by `rng_seed`.
    #[must_use]
    pub fn new(tuning: Tuning, rng_seed: u64) -> Self {
        Self {
            tuning,
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
        }
    }

    /// Chooses bomb placements for a freshly generated maze.
    ///
    /// Cells are drawn uniformly until an open one is found, so several bombs
    /// may share a cell. A maze without open cells receives no bombs.
    pub fn spawn(&mut self, maze: &Maze) -> Vec<BombPlacement> {
        let open_cells = maze.open_count();
        if open_cells == 0 || self.tuning.tiers.is_empty() {
            tracing::warn!(
                open_cells,
                tiers = self.tuning.tiers.len(),
                "no bombs can be placed"
            );
            return Vec::new();
        }

        let low = self.tuning.min_bombs.min(self.tuning.max_bombs);
        let high = self.tuning.min_bombs.max(self.tuning.max_bombs);
        let count = self.rng.gen_range(low..=high);

        let mut placements = Vec::new();
        for _ in 0..count {
            let Some(cell) = self.draw_open_cell(maze, open_cells) else {
                continue;
            };
            let Some(tier) = self.tuning.tiers.choose(&mut self.rng).copied() else {
                continue;
            };
            placements.push(BombPlacement::new(cell, tier));
        }
        placements
    }

    /// Consumes world events and the current bomb view to emit hazard commands.
    ///
    /// Evaluation only happens on frames that advanced time. Idle bombs whose
    /// proximity zone contains the player are armed; armed bombs whose fuse
    /// has elapsed at `now` are detonated.
    pub fn handle(
        &mut self,
        events: &[Event],
        bombs: &BombView,
        player: Option<CellCoord>,
        now: Duration,
        out: &mut Vec<Command>,
    ) {
        let tick_observed = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }));

        if !tick_observed {
            return;
        }

        for bomb in bombs.iter() {
            if bomb.is_armed() {
                if bomb.fuse_expired(now) {
                    out.push(Command::DetonateBomb { bomb: bomb.id });
                }
            } else if player
                .is_some_and(|player| player.chebyshev_distance(bomb.cell) <= PROXIMITY_RADIUS)
            {
                out.push(Command::ArmBomb { bomb: bomb.id });
            }
        }
    }

    fn draw_open_cell(&mut self, maze: &Maze, open_cells: usize) -> Option<CellCoord> {
        for _ in 0..SPAWN_ATTEMPTS {
            let cell = CellCoord::new(
                self.rng.gen_range(0..maze.columns()),
                self.rng.gen_range(0..maze.rows()),
            );
            if maze.is_open(cell) {
                return Some(cell);
            }
        }

        tracing::warn!(
            attempts = SPAWN_ATTEMPTS,
            open_cells,
            "random placement exhausted, picking from open cells"
        );
        let index = self.rng.gen_range(0..open_cells);
        maze.open_cells().nth(index)
    }
}
