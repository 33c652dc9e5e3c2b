#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized depth-first maze carving.
//!
//! Carving starts at the top-left cell and advances two cells at a time,
//! opening the cell in between, so open cells form a spanning tree over the
//! lattice of even coordinates. The walk is driven by an explicit stack whose
//! depth never exceeds the number of cells in the grid.

use blast_maze_core::{CellCoord, CellState, Difficulty, Direction, Maze};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

const CARVE_STRIDE: u32 = 2;

/// Pure system that produces freshly carved mazes.
#[derive(Debug)]
pub struct MazeGeneration {
    rng: ChaCha8Rng,
    stack: Vec<Frame>,
}

impl MazeGeneration {
    /// Creates a generator whose layouts are fully determined by `rng_seed`.
    #[must_use]
    pub fn new(rng_seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            stack: Vec::new(),
        }
    }

    /// Generates a maze of the requested size.
    ///
    /// `difficulty` is accepted for the level pipeline but does not influence
    /// the carved topology. Zero-sized requests yield an empty maze.
    pub fn generate(&mut self, columns: u32, rows: u32, difficulty: Difficulty) -> Maze {
        tracing::debug!(
            columns,
            rows,
            difficulty = difficulty.get(),
            "generating maze"
        );

        let mut maze = Maze::walled(columns, rows);
        let Some(origin) = maze.start() else {
            return maze;
        };

        let _ = maze.open(origin);
        self.carve_from(&mut maze, origin);
        link_goal(&mut maze);
        maze
    }

    fn carve_from(&mut self, maze: &mut Maze, origin: CellCoord) {
        self.stack.clear();
        self.stack.push(Frame::new(origin, &mut self.rng));

        while let Some(frame) = self.stack.last_mut() {
            let Some(direction) = frame.next_direction() else {
                let _ = self.stack.pop();
                continue;
            };
            let cell = frame.cell;

            let Some(target) = cell
                .offset(direction, CARVE_STRIDE)
                .filter(|target| maze.state(*target) == Some(CellState::Wall))
            else {
                continue;
            };

            if let Some(between) = cell.neighbor(direction) {
                let _ = maze.open(between);
            }
            let _ = maze.open(target);
            self.stack.push(Frame::new(target, &mut self.rng));
        }
    }
}

/// Connects the goal corner to the carved lattice when carving missed it.
fn link_goal(maze: &mut Maze) {
    let Some(goal) = maze.goal() else {
        return;
    };
    if maze.is_open(goal) {
        return;
    }

    let _ = maze.open(goal);
    if goal.column() % 2 == 1 && goal.row() % 2 == 1 {
        let _ = maze.open(CellCoord::new(goal.column() - 1, goal.row()));
    }
}

#[derive(Clone, Copy, Debug)]
struct Frame {
    cell: CellCoord,
    directions: [Direction; 4],
    next: usize,
}

impl Frame {
    fn new(cell: CellCoord, rng: &mut ChaCha8Rng) -> Self {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            next: 0,
        }
    }

    fn next_direction(&mut self) -> Option<Direction> {
        let direction = self.directions.get(self.next).copied()?;
        self.next += 1;
        Some(direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_yield_each_direction_once() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut frame = Frame::new(CellCoord::new(0, 0), &mut rng);

        let mut seen = Vec::new();
        while let Some(direction) = frame.next_direction() {
            seen.push(direction);
        }

        assert_eq!(seen.len(), 4);
        for direction in Direction::ALL {
            assert!(seen.contains(&direction));
        }
    }

    #[test]
    fn goal_on_odd_corner_is_linked_through_its_west_neighbor() {
        let mut maze = Maze::walled(4, 4);
        link_goal(&mut maze);

        assert!(maze.is_open(CellCoord::new(3, 3)));
        assert!(maze.is_open(CellCoord::new(2, 3)));
        assert_eq!(maze.open_count(), 2);
    }

    #[test]
    fn goal_on_connector_corner_is_opened_alone() {
        let mut maze = Maze::walled(4, 5);
        link_goal(&mut maze);

        assert!(maze.is_open(CellCoord::new(3, 4)));
        assert_eq!(maze.open_count(), 1);
    }
}
