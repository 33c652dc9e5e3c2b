#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative level state management for Blast Maze.

use std::time::Duration;

use blast_maze_core::{
    BombId, BombPlacement, BombSnapshot, BombState, CellCoord, Command, Direction, Event, LevelLayout,
    LevelPhase, Maze, PerformanceSample, SeverityTier, BLAST_RADIUS, PROXIMITY_RADIUS,
};

/// Represents the authoritative state of the level currently being played.
#[derive(Debug)]
pub struct World {
    maze: Maze,
    level: u32,
    player: Option<CellCoord>,
    goal: Option<CellCoord>,
    bombs: Vec<Bomb>,
    phase: LevelPhase,
    clock: Duration,
    moves: u32,
}

impl World {
    /// Creates an empty world awaiting its first level.
    #[must_use]
    pub fn new() -> Self {
        Self {
            maze: Maze::walled(0, 0),
            level: 0,
            player: None,
            goal: None,
            bombs: Vec::new(),
            phase: LevelPhase::Running,
            clock: Duration::ZERO,
            moves: 0,
        }
    }

    fn install(&mut self, level: u32, layout: LevelLayout) {
        let LevelLayout { maze, bombs } = layout;
        self.player = maze.start().filter(|cell| maze.is_open(*cell));
        self.goal = maze.goal();
        self.bombs = place_bombs(&maze, bombs);
        self.maze = maze;
        self.level = level;
        self.phase = LevelPhase::Running;
        self.clock = Duration::ZERO;
        self.moves = 0;
    }

    fn step_player(&mut self, direction: Direction) -> Option<(CellCoord, CellCoord)> {
        let from = self.player?;
        let to = from
            .neighbor(direction)
            .filter(|cell| self.maze.is_open(*cell))?;
        self.player = Some(to);
        self.moves = self.moves.saturating_add(1);
        Some((from, to))
    }

    fn detect_goal(&mut self, out_events: &mut Vec<Event>) {
        if self.phase != LevelPhase::Running {
            return;
        }

        match (self.player, self.goal) {
            (Some(player), Some(goal)) if player == goal => {
                self.phase = LevelPhase::Complete;
                out_events.push(Event::GoalReached {
                    level: self.level,
                    sample: PerformanceSample::new(self.clock, self.moves),
                });
            }
            _ => {}
        }
    }

    fn player_near(&self, cell: CellCoord) -> bool {
        self.player
            .is_some_and(|player| player.chebyshev_distance(cell) <= PROXIMITY_RADIUS)
    }

    fn bomb_index(&self, bomb: BombId) -> Option<usize> {
        self.bombs.iter().position(|candidate| candidate.id == bomb)
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::StartLevel { level, layout } => {
            world.install(level, layout);
            out_events.push(Event::LevelStarted {
                level,
                columns: world.maze.columns(),
                rows: world.maze.rows(),
                bombs: world.bombs.len(),
            });
            world.detect_goal(out_events);
        }
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { direction } => {
            if let Some((from, to)) = world.step_player(direction) {
                out_events.push(Event::PlayerMoved { from, to });
                world.detect_goal(out_events);
            }
        }
        Command::ArmBomb { bomb } => {
            let Some(index) = world.bomb_index(bomb) else {
                return;
            };
            let cell = world.bombs[index].cell;
            if !world.player_near(cell) {
                return;
            }

            let clock = world.clock;
            let target = &mut world.bombs[index];
            if target.state == BombState::Idle {
                target.state = BombState::Armed { armed_at: clock };
                out_events.push(Event::BombArmed {
                    bomb,
                    cell,
                    armed_at: clock,
                });
            }
        }
        Command::DetonateBomb { bomb } => {
            let Some(index) = world.bomb_index(bomb) else {
                return;
            };
            if !world.bombs[index].snapshot().fuse_expired(world.clock) {
                return;
            }

            let detonated = world.bombs.remove(index);
            let opened: Vec<CellCoord> = world
                .maze
                .square_around(detonated.cell, BLAST_RADIUS)
                .into_iter()
                .filter(|cell| world.maze.open(*cell))
                .collect();
            out_events.push(Event::BombDetonated {
                bomb,
                cell: detonated.cell,
                opened,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use blast_maze_core::{BombSnapshot, BombView, CellCoord, LevelPhase, Maze};

    /// Provides read-only access to the current maze.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// One-based counter of the level being played, zero before the first level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Cell occupied by the player, absent when the maze has no open origin.
    #[must_use]
    pub fn player(world: &World) -> Option<CellCoord> {
        world.player
    }

    /// Goal cell of the current maze.
    #[must_use]
    pub fn goal(world: &World) -> Option<CellCoord> {
        world.goal
    }

    /// Phase of the current level.
    #[must_use]
    pub fn phase(world: &World) -> LevelPhase {
        world.phase
    }

    /// Time accumulated since the level started.
    #[must_use]
    pub fn elapsed(world: &World) -> Duration {
        world.clock
    }

    /// Accepted movement impulses since the level started.
    #[must_use]
    pub fn moves(world: &World) -> u32 {
        world.moves
    }

    /// Captures a read-only view of the bombs still present in the level.
    #[must_use]
    pub fn bomb_view(world: &World) -> BombView {
        let snapshots: Vec<BombSnapshot> = world.bombs.iter().map(|bomb| bomb.snapshot()).collect();
        BombView::from_snapshots(snapshots)
    }
}

#[derive(Clone, Debug)]
struct Bomb {
    id: BombId,
    cell: CellCoord,
    tier: SeverityTier,
    state: BombState,
}

impl Bomb {
    fn snapshot(&self) -> BombSnapshot {
        BombSnapshot {
            id: self.id,
            cell: self.cell,
            tier: self.tier,
            state: self.state,
        }
    }
}

fn place_bombs(maze: &Maze, placements: Vec<BombPlacement>) -> Vec<Bomb> {
    placements
        .into_iter()
        .filter(|placement| maze.is_open(placement.cell))
        .zip(0_u32..)
        .map(|(placement, id)| Bomb {
            id: BombId::new(id),
            cell: placement.cell,
            tier: placement.tier,
            state: BombState::Idle,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_maze_core::{BombColor, CellState};

    const RED: BombColor = BombColor::from_rgb(255, 0, 0);

    fn corridor_layout() -> LevelLayout {
        // Row 0 fully open, everything else wall.
        let mut maze = Maze::walled(5, 3);
        for column in 0..5 {
            let _ = maze.open(CellCoord::new(column, 0));
        }
        let _ = maze.open(CellCoord::new(4, 1));
        let _ = maze.open(CellCoord::new(4, 2));
        LevelLayout::new(maze, Vec::new())
    }

    fn started(layout: LevelLayout) -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(&mut world, Command::StartLevel { level: 1, layout }, &mut events);
        world
    }

    fn tier(fuse_millis: u64) -> SeverityTier {
        SeverityTier::new(RED, Duration::from_millis(fuse_millis))
    }

    #[test]
    fn start_level_places_player_at_origin() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::StartLevel {
                level: 3,
                layout: corridor_layout(),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::LevelStarted {
                level: 3,
                columns: 5,
                rows: 3,
                bombs: 0,
            }]
        );
        assert_eq!(query::player(&world), Some(CellCoord::new(0, 0)));
        assert_eq!(query::goal(&world), Some(CellCoord::new(4, 2)));
        assert_eq!(query::level(&world), 3);
        assert_eq!(query::phase(&world), LevelPhase::Running);
    }

    #[test]
    fn moves_into_walls_or_out_of_bounds_are_rejected() {
        let mut world = started(corridor_layout());
        let mut events = Vec::new();

        for direction in [Direction::North, Direction::West, Direction::South] {
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
        }

        assert!(events.is_empty());
        assert_eq!(query::player(&world), Some(CellCoord::new(0, 0)));
        assert_eq!(query::moves(&world), 0);
    }

    #[test]
    fn accepted_moves_are_counted() {
        let mut world = started(corridor_layout());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::South,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::PlayerMoved {
                from: CellCoord::new(0, 0),
                to: CellCoord::new(1, 0),
            }]
        );
        assert_eq!(query::moves(&world), 1);
    }

    #[test]
    fn goal_is_reported_once_per_level() {
        let mut world = started(corridor_layout());
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_500),
            },
            &mut events,
        );
        for direction in [
            Direction::East,
            Direction::East,
            Direction::East,
            Direction::East,
            Direction::South,
            Direction::South,
            Direction::North,
            Direction::South,
        ] {
            apply(&mut world, Command::MovePlayer { direction }, &mut events);
        }

        let goals: Vec<&Event> = events
            .iter()
            .filter(|event| matches!(event, Event::GoalReached { .. }))
            .collect();
        assert_eq!(
            goals,
            vec![&Event::GoalReached {
                level: 1,
                sample: PerformanceSample::new(Duration::from_millis(1_500), 6),
            }]
        );
        assert_eq!(query::phase(&world), LevelPhase::Complete);
        assert_eq!(query::moves(&world), 8);
    }

    #[test]
    fn single_cell_level_completes_immediately() {
        let mut maze = Maze::walled(1, 1);
        let _ = maze.open(CellCoord::new(0, 0));
        let mut world = World::new();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::StartLevel {
                level: 1,
                layout: LevelLayout::new(maze, Vec::new()),
            },
            &mut events,
        );

        assert!(events.contains(&Event::GoalReached {
            level: 1,
            sample: PerformanceSample::new(Duration::ZERO, 0),
        }));
    }

    #[test]
    fn empty_maze_has_no_player() {
        let world = started(LevelLayout::new(Maze::walled(0, 0), Vec::new()));
        assert_eq!(query::player(&world), None);
        assert_eq!(query::goal(&world), None);
        assert_eq!(query::phase(&world), LevelPhase::Running);
    }

    #[test]
    fn placements_on_walls_are_dropped() {
        let layout = LevelLayout {
            bombs: vec![
                BombPlacement::new(CellCoord::new(2, 0), tier(2_000)),
                BombPlacement::new(CellCoord::new(2, 2), tier(2_000)),
                BombPlacement::new(CellCoord::new(2, 0), tier(4_000)),
            ],
            ..corridor_layout()
        };
        let world = started(layout);
        let view = query::bomb_view(&world);

        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|bomb| bomb.cell == CellCoord::new(2, 0)));
        assert!(view.iter().all(|bomb| bomb.state == BombState::Idle));
    }

    #[test]
    fn arming_requires_proximity_and_happens_once() {
        let layout = LevelLayout {
            bombs: vec![BombPlacement::new(CellCoord::new(3, 0), tier(2_000))],
            ..corridor_layout()
        };
        let mut world = started(layout);
        let mut events = Vec::new();
        let bomb = BombId::new(0);

        apply(&mut world, Command::ArmBomb { bomb }, &mut events);
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        events.clear();

        apply(&mut world, Command::ArmBomb { bomb }, &mut events);
        apply(&mut world, Command::ArmBomb { bomb }, &mut events);
        assert_eq!(
            events,
            vec![Event::BombArmed {
                bomb,
                cell: CellCoord::new(3, 0),
                armed_at: Duration::ZERO,
            }]
        );
    }

    #[test]
    fn detonation_waits_for_fuse_and_opens_clipped_block() {
        let layout = LevelLayout {
            bombs: vec![BombPlacement::new(CellCoord::new(1, 0), tier(2_000))],
            ..corridor_layout()
        };
        let mut world = started(layout);
        let mut events = Vec::new();
        let bomb = BombId::new(0);

        apply(&mut world, Command::ArmBomb { bomb }, &mut events);
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1_999),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::DetonateBomb { bomb }, &mut events);
        assert!(events.is_empty());

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(1),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::DetonateBomb { bomb }, &mut events);

        assert_eq!(
            events,
            vec![Event::BombDetonated {
                bomb,
                cell: CellCoord::new(1, 0),
                opened: vec![
                    CellCoord::new(0, 1),
                    CellCoord::new(1, 1),
                    CellCoord::new(2, 1),
                ],
            }]
        );
        assert!(query::bomb_view(&world).is_empty());
        for column in 0..=2 {
            for row in 0..=1 {
                assert_eq!(
                    query::maze(&world).state(CellCoord::new(column, row)),
                    Some(CellState::Open)
                );
            }
        }
    }

    #[test]
    fn idle_bombs_do_not_detonate() {
        let layout = LevelLayout {
            bombs: vec![BombPlacement::new(CellCoord::new(4, 0), tier(1))],
            ..corridor_layout()
        };
        let mut world = started(layout);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(10),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::DetonateBomb {
                bomb: BombId::new(0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::bomb_view(&world).len(), 1);
    }
}
