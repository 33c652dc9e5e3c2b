#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Blast Maze adapters.

use anyhow::Result as AnyResult;
use blast_maze_core::{BombColor, CellCoord, CellState, HeldDirections};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// Message shown while the level-complete dwell is running.
pub const LEVEL_COMPLETE_MESSAGE: &str = "Level Complete!";

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Color = Color::from_rgb_u8(255, 255, 255);
    /// Opaque black.
    pub const BLACK: Color = Color::from_rgb_u8(0, 0, 0);
    /// Opaque red.
    pub const RED: Color = Color::from_rgb_u8(255, 0, 0);
    /// Opaque green.
    pub const GREEN: Color = Color::from_rgb_u8(0, 255, 0);
    /// Opaque blue.
    pub const BLUE: Color = Color::from_rgb_u8(0, 0, 255);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }
}

impl From<BombColor> for Color {
    fn from(color: BombColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FrameInput {
    /// Directional keys held during the frame.
    pub held: HeldDirections,
}

/// Describes the square tile layout of the maze on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile in pixels.
    pub tile_length: f32,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`RenderingError::InvalidTileLength`] when the tile length is not
    /// a positive finite number.
    pub fn new(columns: u32, rows: u32, tile_length: f32) -> Result<Self, RenderingError> {
        if !tile_length.is_finite() || tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
        })
    }

    /// Total width of the grid in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Total height of the grid in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// Top-left pixel position of the provided cell.
    #[must_use]
    pub fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.tile_length
    }
}

/// Bomb drawn on top of the maze.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BombPresentation {
    /// Cell holding the bomb.
    pub cell: CellCoord,
    /// Fill color of the bomb's tier.
    pub color: Color,
    /// Whether the fuse is burning.
    pub armed: bool,
}

impl BombPresentation {
    /// Creates a new bomb descriptor.
    #[must_use]
    pub const fn new(cell: CellCoord, color: Color, armed: bool) -> Self {
        Self { cell, color, armed }
    }
}

/// Heads-up display contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct HudPresentation {
    /// One-based level counter.
    pub level: u32,
    /// Time spent in the current level.
    pub elapsed: Duration,
    /// Whether the level-complete message should be shown.
    pub level_complete: bool,
}

impl HudPresentation {
    /// Label describing the level counter.
    #[must_use]
    pub fn level_label(&self) -> String {
        format!("Level: {}", self.level)
    }

    /// Label describing the elapsed level time with two decimals.
    #[must_use]
    pub fn timer_label(&self) -> String {
        format!("Time: {:.2} s", self.elapsed.as_secs_f32())
    }
}

/// Scene description combining the maze, actors and HUD.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that frames the maze.
    pub tile_grid: TileGridPresentation,
    /// Row-major cell states of the maze.
    pub cells: Vec<CellState>,
    /// Cell occupied by the player, if any.
    pub player: Option<CellCoord>,
    /// Goal cell, if any.
    pub goal: Option<CellCoord>,
    /// Bombs still present in the level.
    pub bombs: Vec<BombPresentation>,
    /// Heads-up display contents.
    pub hud: HudPresentation,
}

impl Scene {
    /// Creates an empty scene for the provided grid.
    #[must_use]
    pub fn new(tile_grid: TileGridPresentation) -> Self {
        Self {
            tile_grid,
            cells: Vec::new(),
            player: None,
            goal: None,
            bombs: Vec::new(),
            hud: HudPresentation::default(),
        }
    }

    /// Iterates over the wall cells of the scene in row-major order.
    pub fn walls(&self) -> impl Iterator<Item = CellCoord> + '_ {
        let columns = self.tile_grid.columns.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state == CellState::Wall)
            .map(move |(index, _)| {
                let index = index as u64;
                CellCoord::new(
                    (index % u64::from(columns)) as u32,
                    (index / u64::from(columns)) as u32,
                )
            })
    }
}

/// Static presentation parameters handed to a backend.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Blast Maze scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the measured frame delta,
    /// per-frame input captured by the adapter, and refreshes the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tiles must have a positive finite side length.
    InvalidTileLength {
        /// Provided length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(
                    f,
                    "tile_length must be positive and finite (received {tile_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
