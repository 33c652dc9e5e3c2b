#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Blast Maze.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, so the crate depends on macroquad without its default `audio`
//! feature. The game produces no sound.

use anyhow::Result;
use blast_maze_core::{CellCoord, HeldDirections};
use blast_maze_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, TileGridPresentation,
    LEVEL_COMPLETE_MESSAGE,
};
use glam::Vec2;
use macroquad::input::{is_key_down, is_key_pressed, KeyCode};
use std::time::{Duration, Instant};

const HUD_MARGIN: f32 = 10.0;
const HUD_FONT_SIZE: f32 = 36.0;
const HUD_TIMER_WIDTH: f32 = 200.0;
const MESSAGE_FONT_SIZE: u16 = 72;
const ARMED_OUTLINE_THICKNESS: f32 = 3.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    target_fps: Option<u32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend with an uncapped frame rate and no frame-rate logging.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the frame loop at the provided number of frames per second.
    ///
    /// Zero disables the cap.
    #[must_use]
    pub fn with_target_fps(mut self, target_fps: u32) -> Self {
        self.target_fps = (target_fps > 0).then_some(target_fps);
        self
    }

    /// Configures whether the backend logs the measured frame rate once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Counts frames and reports the average rate once per second.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
}

impl FpsCounter {
    fn record_frame(&mut self, frame: Duration) -> Option<f32> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let per_second = self.frames as f32 / self.elapsed.as_secs_f32();
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        Some(per_second)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            target_fps,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let (window_width, window_height) = window_size(&scene.tile_grid);
        let config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            ..macroquad::window::Conf::default()
        };

        let budget = target_fps.and_then(frame_budget);
        tracing::debug!(window_width, window_height, ?budget, "opening window");

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut last_frame = Instant::now();

            loop {
                let frame_start = Instant::now();
                if quit_requested(is_key_pressed) {
                    tracing::info!("quit requested");
                    break;
                }

                let frame_dt = frame_start.duration_since(last_frame);
                last_frame = frame_start;

                let input = FrameInput {
                    held: held_directions(is_key_down),
                };
                update_scene(frame_dt, input, &mut scene);

                macroquad::window::clear_background(background);
                draw_scene(&scene);

                if let Some(per_second) = fps_counter.record_frame(frame_dt) {
                    if show_fps {
                        tracing::info!(fps = per_second, "frame rate");
                    }
                }

                macroquad::window::next_frame().await;

                if let Some(budget) = budget {
                    let spent = frame_start.elapsed();
                    if spent < budget {
                        std::thread::sleep(budget - spent);
                    }
                }
            }
        });

        Ok(())
    }
}

fn draw_scene(scene: &Scene) {
    let grid = &scene.tile_grid;

    for wall in scene.walls() {
        fill_cell(grid, wall, Color::BLACK);
    }

    if let Some(goal) = scene.goal {
        fill_cell(grid, goal, Color::GREEN);
    }

    for bomb in &scene.bombs {
        fill_cell(grid, bomb.cell, bomb.color);
        if bomb.armed {
            let (origin, side) = tile_rect(grid, bomb.cell);
            macroquad::shapes::draw_rectangle_lines(
                origin.x,
                origin.y,
                side,
                side,
                ARMED_OUTLINE_THICKNESS,
                to_macroquad_color(Color::BLACK),
            );
        }
    }

    if let Some(player) = scene.player {
        fill_cell(grid, player, Color::BLUE);
    }

    draw_hud(scene);
}

fn draw_hud(scene: &Scene) {
    let hud = &scene.hud;
    let text_color = to_macroquad_color(Color::RED);
    let baseline = hud_baseline();
    let screen_width = macroquad::window::screen_width();

    macroquad::text::draw_text(
        &hud.level_label(),
        HUD_MARGIN,
        baseline,
        HUD_FONT_SIZE,
        text_color,
    );
    macroquad::text::draw_text(
        &hud.timer_label(),
        screen_width - HUD_TIMER_WIDTH,
        baseline,
        HUD_FONT_SIZE,
        text_color,
    );

    if hud.level_complete {
        let dimensions =
            macroquad::text::measure_text(LEVEL_COMPLETE_MESSAGE, None, MESSAGE_FONT_SIZE, 1.0);
        let position = centered_text_origin(
            Vec2::new(screen_width, macroquad::window::screen_height()),
            Vec2::new(dimensions.width, dimensions.height),
        );
        macroquad::text::draw_text(
            LEVEL_COMPLETE_MESSAGE,
            position.x,
            position.y,
            f32::from(MESSAGE_FONT_SIZE),
            to_macroquad_color(Color::GREEN),
        );
    }
}

fn fill_cell(grid: &TileGridPresentation, cell: CellCoord, color: Color) {
    let (origin, side) = tile_rect(grid, cell);
    macroquad::shapes::draw_rectangle(origin.x, origin.y, side, side, to_macroquad_color(color));
}

fn tile_rect(grid: &TileGridPresentation, cell: CellCoord) -> (Vec2, f32) {
    (grid.cell_origin(cell), grid.tile_length)
}

fn window_size(grid: &TileGridPresentation) -> (i32, i32) {
    let width = grid.width().ceil().max(1.0) as i32;
    let height = grid.height().ceil().max(1.0) as i32;
    (width, height)
}

fn frame_budget(target_fps: u32) -> Option<Duration> {
    (target_fps > 0).then(|| Duration::from_secs(1) / target_fps)
}

fn hud_baseline() -> f32 {
    HUD_MARGIN + HUD_FONT_SIZE * 0.75
}

/// Text baseline that centres a block of the given size on screen.
fn centered_text_origin(screen: Vec2, text: Vec2) -> Vec2 {
    Vec2::new((screen.x - text.x) / 2.0, (screen.y + text.y) / 2.0)
}

fn held_directions(is_down: impl Fn(KeyCode) -> bool) -> HeldDirections {
    HeldDirections {
        north: is_down(KeyCode::W) || is_down(KeyCode::Up),
        east: is_down(KeyCode::D) || is_down(KeyCode::Right),
        south: is_down(KeyCode::S) || is_down(KeyCode::Down),
        west: is_down(KeyCode::A) || is_down(KeyCode::Left),
    }
}

fn quit_requested(is_pressed: impl Fn(KeyCode) -> bool) -> bool {
    is_pressed(KeyCode::Escape) || is_pressed(KeyCode::Q)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_matches_grid_extent() {
        let grid = TileGridPresentation::new(60, 40, 20.0).expect("valid grid");
        assert_eq!(window_size(&grid), (1200, 800));

        let empty = TileGridPresentation::new(0, 0, 20.0).expect("valid grid");
        assert_eq!(window_size(&empty), (1, 1));
    }

    #[test]
    fn builder_carries_every_option_into_the_backend() {
        let backend = MacroquadBackend::new()
            .with_target_fps(30)
            .with_show_fps(true);
        assert_eq!(backend.target_fps, Some(30));
        assert!(backend.show_fps);

        let uncapped = MacroquadBackend::new().with_target_fps(0);
        assert_eq!(uncapped.target_fps, None);
        assert!(!uncapped.show_fps);
    }

    #[test]
    fn frame_budget_follows_target_rate() {
        assert_eq!(frame_budget(0), None);
        assert_eq!(frame_budget(30), Some(Duration::from_secs(1) / 30));
        assert_eq!(frame_budget(1), Some(Duration::from_secs(1)));
    }

    #[test]
    fn letter_and_arrow_keys_map_to_directions() {
        let held = held_directions(|key| matches!(key, KeyCode::A | KeyCode::Up));
        assert_eq!(
            held,
            HeldDirections {
                north: true,
                east: false,
                south: false,
                west: true,
            }
        );

        assert_eq!(held_directions(|_| false), HeldDirections::default());
    }

    #[test]
    fn escape_and_q_quit() {
        assert!(quit_requested(|key| key == KeyCode::Escape));
        assert!(quit_requested(|key| key == KeyCode::Q));
        assert!(!quit_requested(|key| key == KeyCode::W));
    }

    #[test]
    fn fps_counter_reports_once_per_second() {
        let mut counter = FpsCounter::default();
        let frame = Duration::from_millis(250);

        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), None);
        assert_eq!(counter.record_frame(frame), Some(4.0));
        assert_eq!(counter.frames, 0);
    }

    #[test]
    fn message_is_centred() {
        let origin = centered_text_origin(Vec2::new(1200.0, 800.0), Vec2::new(400.0, 50.0));
        assert_eq!(origin, Vec2::new(400.0, 425.0));
    }

    #[test]
    fn tiles_are_positioned_by_cell() {
        let grid = TileGridPresentation::new(10, 10, 20.0).expect("valid grid");
        let (origin, side) = tile_rect(&grid, CellCoord::new(2, 5));

        assert_eq!(origin, Vec2::new(40.0, 100.0));
        assert_eq!(side, 20.0);
    }
}
