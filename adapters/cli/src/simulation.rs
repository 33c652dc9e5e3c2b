//! Frame-by-frame orchestration of the world and its systems.

use std::time::Duration;

use blast_maze_core::{Command, Event, HeldDirections, LevelLayout, LevelPhase};
use blast_maze_rendering::{BombPresentation, Color, HudPresentation, Scene};
use blast_maze_system_difficulty::DifficultyEstimator;
use blast_maze_system_hazards::Hazards;
use blast_maze_system_maze_generation::MazeGeneration;
use blast_maze_system_session::Session;
use blast_maze_world::{self as world, query, World};

use crate::config::GameConfig;

/// Mixed into the user seed so hazards draw from a stream independent of maze carving.
const HAZARD_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Owns the authoritative world and drives every system once per frame.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    generation: MazeGeneration,
    difficulty: DifficultyEstimator,
    hazards: Hazards,
    session: Session,
    columns: u32,
    rows: u32,
}

impl Simulation {
    /// Builds the systems described by `config` and starts the first level.
    pub(crate) fn new(config: &GameConfig, seed: u64) -> Self {
        let mut simulation = Self {
            world: World::new(),
            generation: MazeGeneration::new(seed),
            difficulty: DifficultyEstimator::new(config.difficulty_tuning()),
            hazards: Hazards::new(config.hazard_tuning(), seed ^ HAZARD_SEED_SALT),
            session: Session::new(config.session_tuning()),
            columns: config.display.columns(),
            rows: config.display.rows(),
        };

        let mut commands = Vec::new();
        let Self {
            generation,
            hazards,
            difficulty,
            session,
            columns,
            rows,
            ..
        } = &mut simulation;
        session.begin(
            |level| build_level(generation, hazards, difficulty, *columns, *rows, level),
            &mut commands,
        );
        simulation.execute(commands, HeldDirections::default());
        simulation
    }

    /// Advances the game by one frame of `dt` wall-clock time.
    ///
    /// Movement resolves before hazards, and hazard commands are collected in a
    /// single pass before any of them is applied.
    pub(crate) fn advance(&mut self, dt: Duration, held: HeldDirections) {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        let frame_events = self.dispatch(events, held);

        let mut hazard_commands = Vec::new();
        self.hazards.handle(
            &frame_events,
            &query::bomb_view(&self.world),
            query::player(&self.world),
            query::elapsed(&self.world),
            &mut hazard_commands,
        );
        self.execute(hazard_commands, HeldDirections::default());
    }

    /// Copies the frame-local view of the world into `scene`.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let maze = query::maze(&self.world);
        scene.tile_grid.columns = maze.columns();
        scene.tile_grid.rows = maze.rows();
        scene.cells.clear();
        scene.cells.extend_from_slice(maze.cells());
        scene.player = query::player(&self.world);
        scene.goal = query::goal(&self.world);
        scene.bombs = query::bomb_view(&self.world)
            .iter()
            .map(|bomb| {
                BombPresentation::new(bomb.cell, Color::from(bomb.tier.color()), bomb.is_armed())
            })
            .collect();
        scene.hud = HudPresentation {
            level: query::level(&self.world),
            elapsed: query::elapsed(&self.world),
            level_complete: query::phase(&self.world) == LevelPhase::Complete,
        };
    }

    /// Applies `commands` and feeds the resulting events back to the systems.
    fn execute(&mut self, commands: Vec<Command>, held: HeldDirections) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        let _ = self.dispatch(events, held);
    }

    /// Routes events to the systems until no further commands are produced.
    ///
    /// Returns every event observed along the way.
    fn dispatch(&mut self, mut events: Vec<Event>, held: HeldDirections) -> Vec<Event> {
        let mut observed = Vec::new();

        while !events.is_empty() {
            trace_hazard_events(&events);
            self.difficulty.handle(&events);

            let mut commands = Vec::new();
            let Self {
                generation,
                hazards,
                difficulty,
                session,
                columns,
                rows,
                ..
            } = self;
            session.handle(
                &events,
                held,
                |level| build_level(generation, hazards, difficulty, *columns, *rows, level),
                &mut commands,
            );

            observed.append(&mut events);
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }

        observed
    }
}

fn build_level(
    generation: &mut MazeGeneration,
    hazards: &mut Hazards,
    difficulty: &DifficultyEstimator,
    columns: u32,
    rows: u32,
    level: u32,
) -> LevelLayout {
    let estimate = difficulty.estimate();
    let maze = generation.generate(columns, rows, estimate);
    let bombs = hazards.spawn(&maze);
    tracing::info!(
        level,
        difficulty = estimate.get(),
        bombs = bombs.len(),
        "building level"
    );
    LevelLayout::new(maze, bombs)
}

fn trace_hazard_events(events: &[Event]) {
    for event in events {
        match event {
            Event::BombArmed {
                bomb,
                cell,
                armed_at,
            } => {
                tracing::debug!(bomb = bomb.get(), ?cell, ?armed_at, "bomb armed");
            }
            Event::BombDetonated { bomb, cell, opened } => {
                tracing::debug!(
                    bomb = bomb.get(),
                    ?cell,
                    opened = opened.len(),
                    "bomb detonated"
                );
            }
            _ => {}
        }
    }
}
