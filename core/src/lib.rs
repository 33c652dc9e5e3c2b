#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Blast Maze engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Systems submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to. Systems consume event streams, query immutable snapshots such as
//! [`BombView`] or a borrowed [`Maze`], and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of tiles a bomb's proximity zone extends beyond its own tile.
///
/// A radius of one yields the 3×3 tile region centred on the bomb.
pub const PROXIMITY_RADIUS: u32 = 1;

/// Number of tiles a detonation opens beyond the bomb's own tile.
pub const BLAST_RADIUS: u32 = 1;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Replaces the current level with a freshly generated layout.
    StartLevel {
        /// One-based level counter owned by the session.
        level: u32,
        /// Maze and hazard placements composing the new level.
        layout: LevelLayout,
    },
    /// Advances the level clock by the provided wall-clock delta.
    Tick {
        /// Real time that elapsed since the previous frame.
        dt: Duration,
    },
    /// Requests that the player advance a single tile in the given direction.
    MovePlayer {
        /// Direction of the requested step.
        direction: Direction,
    },
    /// Requests that an idle bomb start its fuse.
    ArmBomb {
        /// Identifier of the bomb entering the armed state.
        bomb: BombId,
    },
    /// Requests that an armed bomb whose fuse elapsed detonates.
    DetonateBomb {
        /// Identifier of the bomb to detonate.
        bomb: BombId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Announces that a new level replaced the previous one.
    LevelStarted {
        /// One-based level counter.
        level: u32,
        /// Number of columns in the new maze.
        columns: u32,
        /// Number of rows in the new maze.
        rows: u32,
        /// Number of bombs placed into the level.
        bombs: usize,
    },
    /// Indicates that the level clock advanced.
    TimeAdvanced {
        /// Duration of real time that elapsed in the frame.
        dt: Duration,
    },
    /// Confirms that the player stepped between two open cells.
    PlayerMoved {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies after moving.
        to: CellCoord,
    },
    /// Confirms that a bomb started its fuse.
    BombArmed {
        /// Identifier of the armed bomb.
        bomb: BombId,
        /// Cell holding the bomb.
        cell: CellCoord,
        /// Level clock reading captured when the bomb armed.
        armed_at: Duration,
    },
    /// Confirms that a bomb exploded and was removed from the level.
    BombDetonated {
        /// Identifier of the detonated bomb.
        bomb: BombId,
        /// Cell that held the bomb.
        cell: CellCoord,
        /// Cells that transitioned from wall to open because of the blast.
        opened: Vec<CellCoord>,
    },
    /// Reports that the player arrived at the goal for the first time this level.
    GoalReached {
        /// Level that was completed.
        level: u32,
        /// Performance recorded for the completed level.
        sample: PerformanceSample,
    },
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the cell `steps` tiles away in `direction`.
    ///
    /// Returns `None` when the offset would leave the non-negative quadrant or
    /// overflow. Upper bounds are the caller's concern.
    #[must_use]
    pub fn offset(self, direction: Direction, steps: u32) -> Option<CellCoord> {
        let (column, row) = match direction {
            Direction::North => (Some(self.column), self.row.checked_sub(steps)),
            Direction::East => (self.column.checked_add(steps), Some(self.row)),
            Direction::South => (Some(self.column), self.row.checked_add(steps)),
            Direction::West => (self.column.checked_sub(steps), Some(self.row)),
        };
        Some(CellCoord::new(column?, row?))
    }

    /// Adjacent cell in `direction`, if it exists.
    #[must_use]
    pub fn neighbor(self, direction: Direction) -> Option<CellCoord> {
        self.offset(direction, 1)
    }

    /// Chebyshev distance between two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: CellCoord) -> u32 {
        self.column
            .abs_diff(other.column)
            .max(self.row.abs_diff(other.row))
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing column indices.
    East,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in a fixed canonical order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];
}

/// Directional keys observed as held during a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeldDirections {
    /// Up key held.
    pub north: bool,
    /// Right key held.
    pub east: bool,
    /// Down key held.
    pub south: bool,
    /// Left key held.
    pub west: bool,
}

impl HeldDirections {
    /// Yields one movement impulse per held key.
    ///
    /// Horizontal impulses come first (left, right) followed by vertical ones
    /// (up, down); every impulse is validated independently by the world.
    pub fn impulses(self) -> impl Iterator<Item = Direction> {
        [
            (self.west, Direction::West),
            (self.east, Direction::East),
            (self.north, Direction::North),
            (self.south, Direction::South),
        ]
        .into_iter()
        .filter_map(|(held, direction)| held.then_some(direction))
    }
}

/// State of a single maze cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellState {
    /// Impassable cell.
    Wall,
    /// Traversable cell.
    Open,
}

/// Dense rectangular grid of wall and open cells describing one maze.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    columns: u32,
    rows: u32,
    cells: Vec<CellState>,
}

impl Maze {
    /// Creates a maze of the given size with every cell set to [`CellState::Wall`].
    #[must_use]
    pub fn walled(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![CellState::Wall; capacity],
        }
    }

    /// Number of columns in the maze.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the maze.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Row-major cell states.
    #[must_use]
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    /// Reports whether the cell lies inside the maze bounds.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// State of the provided cell, or `None` when it lies out of bounds.
    #[must_use]
    pub fn state(&self, cell: CellCoord) -> Option<CellState> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
    }

    /// Reports whether the cell exists and is open.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord) -> bool {
        self.state(cell) == Some(CellState::Open)
    }

    /// Opens the provided cell.
    ///
    /// Returns `true` only when the cell existed and was previously a wall.
    pub fn open(&mut self, cell: CellCoord) -> bool {
        let Some(slot) = self.index(cell).and_then(|index| self.cells.get_mut(index)) else {
            return false;
        };
        let was_wall = *slot == CellState::Wall;
        *slot = CellState::Open;
        was_wall
    }

    /// Entry cell at the top-left corner, if the maze has any cells.
    #[must_use]
    pub fn start(&self) -> Option<CellCoord> {
        self.corner(0, 0)
    }

    /// Goal cell at the bottom-right corner, if the maze has any cells.
    #[must_use]
    pub fn goal(&self) -> Option<CellCoord> {
        self.corner(self.columns.checked_sub(1)?, self.rows.checked_sub(1)?)
    }

    /// Iterates over every cell coordinate paired with its state in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, CellState)> + '_ {
        let columns = self.columns.max(1);
        self.cells.iter().enumerate().map(move |(index, state)| {
            let index = index as u64;
            let column = (index % u64::from(columns)) as u32;
            let row = (index / u64::from(columns)) as u32;
            (CellCoord::new(column, row), *state)
        })
    }

    /// Iterates over all open cells in row-major order.
    pub fn open_cells(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.iter()
            .filter(|(_, state)| *state == CellState::Open)
            .map(|(cell, _)| cell)
    }

    /// Number of open cells.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|state| **state == CellState::Open)
            .count()
    }

    /// Cells of the square of the given radius centred on `center`, clipped to the maze.
    #[must_use]
    pub fn square_around(&self, center: CellCoord, radius: u32) -> Vec<CellCoord> {
        if !self.contains(center) {
            return Vec::new();
        }

        let first_column = center.column().saturating_sub(radius);
        let first_row = center.row().saturating_sub(radius);
        let last_column = center
            .column()
            .saturating_add(radius)
            .min(self.columns - 1);
        let last_row = center.row().saturating_add(radius).min(self.rows - 1);

        let mut cells = Vec::new();
        for row in first_row..=last_row {
            for column in first_column..=last_column {
                cells.push(CellCoord::new(column, row));
            }
        }
        cells
    }

    fn corner(&self, column: u32, row: u32) -> Option<CellCoord> {
        let cell = CellCoord::new(column, row);
        self.contains(cell).then_some(cell)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.columns).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}

/// Unique identifier assigned to a bomb within a level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BombId(u32);

impl BombId {
    /// Creates a new bomb identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Visual category applied to a bomb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct BombColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl BombColor {
    /// Creates a new bomb color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

impl From<[u8; 3]> for BombColor {
    fn from([red, green, blue]: [u8; 3]) -> Self {
        Self::from_rgb(red, green, blue)
    }
}

impl From<BombColor> for [u8; 3] {
    fn from(color: BombColor) -> Self {
        [color.red, color.green, color.blue]
    }
}

/// Fixed pairing of a bomb color with its fuse length.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeverityTier {
    color: BombColor,
    fuse: Duration,
}

impl SeverityTier {
    /// Creates a new severity tier.
    #[must_use]
    pub const fn new(color: BombColor, fuse: Duration) -> Self {
        Self { color, fuse }
    }

    /// Color used to present bombs of this tier.
    #[must_use]
    pub const fn color(&self) -> BombColor {
        self.color
    }

    /// Time between arming and detonation.
    #[must_use]
    pub const fn fuse(&self) -> Duration {
        self.fuse
    }
}

/// Lifecycle of a bomb that is still present in the level.
///
/// Detonated bombs are removed from the level, so there is no detonated variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BombState {
    /// Waiting for the player to come close.
    Idle,
    /// Fuse is burning.
    Armed {
        /// Level clock reading captured when the bomb armed.
        armed_at: Duration,
    },
}

/// Request to place a bomb of a given tier at a cell when a level starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BombPlacement {
    /// Cell receiving the bomb.
    pub cell: CellCoord,
    /// Severity tier assigned to the bomb.
    pub tier: SeverityTier,
}

impl BombPlacement {
    /// Creates a new placement descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, tier: SeverityTier) -> Self {
        Self { cell, tier }
    }
}

/// Immutable representation of a single bomb's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BombSnapshot {
    /// Identifier allocated to the bomb by the world.
    pub id: BombId,
    /// Cell holding the bomb.
    pub cell: CellCoord,
    /// Severity tier assigned at spawn.
    pub tier: SeverityTier,
    /// Current lifecycle state.
    pub state: BombState,
}

impl BombSnapshot {
    /// Reports whether the fuse has been lit.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        matches!(self.state, BombState::Armed { .. })
    }

    /// Reports whether an armed bomb's fuse has fully elapsed at `now`.
    #[must_use]
    pub fn fuse_expired(&self, now: Duration) -> bool {
        match self.state {
            BombState::Idle => false,
            BombState::Armed { armed_at } => now.saturating_sub(armed_at) >= self.tier.fuse(),
        }
    }
}

/// Read-only snapshot describing all bombs still present in the level.
#[derive(Clone, Debug, Default)]
pub struct BombView {
    snapshots: Vec<BombSnapshot>,
}

impl BombView {
    /// Creates a new bomb view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<BombSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured bomb snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &BombSnapshot> {
        self.snapshots.iter()
    }

    /// Number of bombs captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view contains no bombs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<BombSnapshot> {
        self.snapshots
    }
}

/// Maze and hazards composing a freshly generated level.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    /// Generated maze.
    pub maze: Maze,
    /// Bombs to place when the level starts.
    pub bombs: Vec<BombPlacement>,
}

impl LevelLayout {
    /// Creates a new level layout.
    #[must_use]
    pub fn new(maze: Maze, bombs: Vec<BombPlacement>) -> Self {
        Self { maze, bombs }
    }
}

/// Outcome of a completed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerformanceSample {
    elapsed: Duration,
    moves: u32,
}

impl PerformanceSample {
    /// Creates a new performance sample.
    #[must_use]
    pub const fn new(elapsed: Duration, moves: u32) -> Self {
        Self { elapsed, moves }
    }

    /// Time between level start and goal arrival.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Accepted movement impulses during the level.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }
}

/// Scalar difficulty estimate in the unit interval.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Difficulty(f32);

impl Difficulty {
    /// Wraps a raw difficulty value.
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self(value)
    }

    /// Retrieves the raw difficulty value.
    #[must_use]
    pub const fn get(&self) -> f32 {
        self.0
    }
}

/// Phase of the current level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LevelPhase {
    /// The player is still looking for the goal.
    Running,
    /// The goal was reached and the success message is shown.
    Complete,
}
