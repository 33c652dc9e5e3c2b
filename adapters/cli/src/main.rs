#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that launches Blast Maze in a macroquad window.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use blast_maze_rendering::{Color, Presentation, RenderingBackend, Scene, TileGridPresentation};
use blast_maze_rendering_macroquad::MacroquadBackend;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{config::GameConfig, simulation::Simulation};

/// Navigate randomly carved mazes while dodging proximity bombs.
#[derive(Parser, Debug)]
#[command(name = "blast-maze", version, about)]
struct CliArgs {
    /// TOML file overriding the built-in configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for maze carving and bomb placement. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Frame rate cap, overriding the configured value.
    #[arg(long, value_name = "FPS")]
    fps: Option<u32>,
    /// Log the measured frame rate once per second.
    #[arg(long)]
    show_fps: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if let Some(fps) = args.fps {
        config.session.frame_rate = fps;
    }
    config
        .validate()
        .context("command-line overrides produced an invalid configuration")?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "starting blast maze");

    let mut simulation = Simulation::new(&config, seed);

    let display = &config.display;
    let tile_grid = TileGridPresentation::new(
        display.columns(),
        display.rows(),
        display.tile_size as f32,
    )?;
    let mut scene = Scene::new(tile_grid);
    simulation.populate_scene(&mut scene);
    let presentation = Presentation::new(display.window_title.clone(), Color::WHITE, scene);

    MacroquadBackend::new()
        .with_target_fps(config.session.frame_rate)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            simulation.advance(dt, input.held);
            simulation.populate_scene(scene);
        })
}
