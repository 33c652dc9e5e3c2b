use std::time::Duration;

use blast_maze_core::{CellCoord, Command, Difficulty, Direction, Event, LevelLayout, Maze, PerformanceSample};
use blast_maze_system_difficulty::DifficultyEstimator;
use blast_maze_world::{self as world, World};
use proptest::prelude::*;

#[test]
fn estimator_defaults_before_any_level() {
    let estimator = DifficultyEstimator::default();

    assert!(estimator.history().is_empty());
    assert_eq!(estimator.estimate(), Difficulty::new(0.5));
}

#[test]
fn goal_events_from_world_are_recorded() {
    let mut maze = Maze::walled(3, 1);
    for column in 0..3 {
        let _ = maze.open(CellCoord::new(column, 0));
    }

    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::StartLevel {
            level: 1,
            layout: LevelLayout::new(maze, Vec::new()),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(4),
        },
        &mut events,
    );
    for _ in 0..2 {
        world::apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
    }

    let mut estimator = DifficultyEstimator::default();
    estimator.handle(&events);

    assert_eq!(
        estimator.history(),
        &[PerformanceSample::new(Duration::from_secs(4), 2)]
    );
    assert_eq!(estimator.estimate(), Difficulty::new(0.1));
}

#[test]
fn unrelated_events_are_ignored() {
    let mut estimator = DifficultyEstimator::default();
    estimator.handle(&[
        Event::TimeAdvanced {
            dt: Duration::from_secs(1),
        },
        Event::PlayerMoved {
            from: CellCoord::new(0, 0),
            to: CellCoord::new(1, 0),
        },
    ]);

    assert!(estimator.history().is_empty());
}

proptest! {
    #[test]
    fn estimate_stays_within_bounds(
        samples in proptest::collection::vec((0_u64..100_000, 0_u32..10_000), 0..32)
    ) {
        let mut estimator = DifficultyEstimator::default();
        for (millis, moves) in samples {
            estimator.record(PerformanceSample::new(Duration::from_millis(millis), moves));
        }

        let estimate = estimator.estimate().get();
        prop_assert!((0.1..=1.0).contains(&estimate), "estimate {} out of range", estimate);
    }
}
