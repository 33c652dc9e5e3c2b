//! Game configuration assembled from defaults and an optional TOML file.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use blast_maze_core::{BombColor, SeverityTier};
use blast_maze_system_difficulty::Tuning as DifficultyTuning;
use blast_maze_system_hazards::{Tuning as HazardTuning, AMBER, GREEN, RED};
use blast_maze_system_session::Tuning as SessionTuning;
use serde::Deserialize;
use thiserror::Error;

/// Validation and parsing failures of the configuration file.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file is not valid TOML or does not match the expected layout.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// Tiles must be at least one pixel wide.
    #[error("tile_size must be positive")]
    ZeroTileSize,
    /// The screen is too small to hold a single tile.
    #[error("a {screen_width}x{screen_height} screen holds no {tile_size}px tiles")]
    EmptyGrid {
        /// Configured screen width.
        screen_width: u32,
        /// Configured screen height.
        screen_height: u32,
        /// Configured tile size.
        tile_size: u32,
    },
    /// The bomb count range is inverted.
    #[error("min_bombs ({min}) exceeds max_bombs ({max})")]
    BombRange {
        /// Configured lower bound.
        min: u32,
        /// Configured upper bound.
        max: u32,
    },
    /// A severity tier has a fuse shorter than a millisecond or not finite.
    #[error("tier {index} has an invalid fuse of {seconds} seconds")]
    InvalidFuse {
        /// Position of the tier in the table.
        index: usize,
        /// Configured fuse length.
        seconds: f32,
    },
    /// The frame loop needs a positive rate.
    #[error("frame_rate must be positive")]
    ZeroFrameRate,
    /// The success dwell must be a non-negative finite duration.
    #[error("success_dwell_seconds must be non-negative (received {0})")]
    InvalidDwell(f32),
    /// The difficulty clamp range is inverted or not finite.
    #[error("difficulty bounds [{min}, {max}] are invalid")]
    DifficultyBounds {
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// The estimate used before any level is completed lies outside the clamp range.
    #[error("difficulty default {default} lies outside [{min}, {max}]")]
    DefaultDifficulty {
        /// Configured default estimate.
        default: f32,
        /// Configured lower bound.
        min: f32,
        /// Configured upper bound.
        max: f32,
    },
    /// The difficulty divisor must be positive.
    #[error("difficulty normalization must be positive (received {0})")]
    InvalidNormalization(f32),
}

/// Complete game configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) display: DisplayConfig,
    pub(crate) session: SessionConfig,
    pub(crate) hazards: HazardConfig,
    pub(crate) difficulty: DifficultyConfig,
}

/// Window and tile geometry.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DisplayConfig {
    pub(crate) screen_width: u32,
    pub(crate) screen_height: u32,
    pub(crate) tile_size: u32,
    pub(crate) window_title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            screen_width: 1200,
            screen_height: 800,
            tile_size: 20,
            window_title: String::from("Maze Game"),
        }
    }
}

impl DisplayConfig {
    /// Number of maze columns that fit on screen.
    pub(crate) fn columns(&self) -> u32 {
        self.screen_width.checked_div(self.tile_size).unwrap_or(0)
    }

    /// Number of maze rows that fit on screen.
    pub(crate) fn rows(&self) -> u32 {
        self.screen_height.checked_div(self.tile_size).unwrap_or(0)
    }
}

/// Level pacing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    pub(crate) success_dwell_seconds: f32,
    pub(crate) frame_rate: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            success_dwell_seconds: 2.0,
            frame_rate: 30,
        }
    }
}

/// Bomb spawn range and severity table.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct HazardConfig {
    pub(crate) min_bombs: u32,
    pub(crate) max_bombs: u32,
    pub(crate) tiers: Vec<TierConfig>,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            min_bombs: 2,
            max_bombs: 8,
            tiers: vec![
                TierConfig::new(GREEN, 4.0),
                TierConfig::new(AMBER, 2.8),
                TierConfig::new(RED, 2.0),
            ],
        }
    }
}

/// One severity tier as written in the configuration file.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct TierConfig {
    pub(crate) color: BombColor,
    pub(crate) fuse_seconds: f32,
}

impl TierConfig {
    const fn new(color: BombColor, fuse_seconds: f32) -> Self {
        Self {
            color,
            fuse_seconds,
        }
    }
}

/// Difficulty estimate tuning.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct DifficultyConfig {
    pub(crate) default: f32,
    pub(crate) normalization: f32,
    pub(crate) min: f32,
    pub(crate) max: f32,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            default: 0.5,
            normalization: 200.0,
            min: 0.1,
            max: 1.0,
        }
    }
}

impl GameConfig {
    /// Reads, parses and validates the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses and validates configuration text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value that would otherwise lead to a degenerate game.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let display = &self.display;
        if display.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if display.columns() == 0 || display.rows() == 0 {
            return Err(ConfigError::EmptyGrid {
                screen_width: display.screen_width,
                screen_height: display.screen_height,
                tile_size: display.tile_size,
            });
        }

        let hazards = &self.hazards;
        if hazards.min_bombs > hazards.max_bombs {
            return Err(ConfigError::BombRange {
                min: hazards.min_bombs,
                max: hazards.max_bombs,
            });
        }
        for (index, tier) in hazards.tiers.iter().enumerate() {
            if !tier.fuse_seconds.is_finite() || seconds(tier.fuse_seconds).is_zero() {
                return Err(ConfigError::InvalidFuse {
                    index,
                    seconds: tier.fuse_seconds,
                });
            }
        }

        let session = &self.session;
        if session.frame_rate == 0 {
            return Err(ConfigError::ZeroFrameRate);
        }
        if !session.success_dwell_seconds.is_finite() || session.success_dwell_seconds < 0.0 {
            return Err(ConfigError::InvalidDwell(session.success_dwell_seconds));
        }

        let difficulty = &self.difficulty;
        if !difficulty.min.is_finite() || !difficulty.max.is_finite() || difficulty.min > difficulty.max
        {
            return Err(ConfigError::DifficultyBounds {
                min: difficulty.min,
                max: difficulty.max,
            });
        }
        if !(difficulty.min..=difficulty.max).contains(&difficulty.default) {
            return Err(ConfigError::DefaultDifficulty {
                default: difficulty.default,
                min: difficulty.min,
                max: difficulty.max,
            });
        }
        if !difficulty.normalization.is_finite() || difficulty.normalization <= 0.0 {
            return Err(ConfigError::InvalidNormalization(difficulty.normalization));
        }

        Ok(())
    }

    /// Hazard tuning derived from the `[hazards]` section.
    pub(crate) fn hazard_tuning(&self) -> HazardTuning {
        let tiers = self
            .hazards
            .tiers
            .iter()
            .map(|tier| SeverityTier::new(tier.color, seconds(tier.fuse_seconds)))
            .collect();
        HazardTuning::new(self.hazards.min_bombs, self.hazards.max_bombs, tiers)
    }

    /// Difficulty tuning derived from the `[difficulty]` section.
    pub(crate) fn difficulty_tuning(&self) -> DifficultyTuning {
        DifficultyTuning::new(
            self.difficulty.default,
            self.difficulty.normalization,
            self.difficulty.min,
            self.difficulty.max,
        )
    }

    /// Session tuning derived from the `[session]` section.
    pub(crate) fn session_tuning(&self) -> SessionTuning {
        SessionTuning::new(seconds(self.session.success_dwell_seconds))
    }
}

/// Converts validated seconds to a millisecond-resolution duration.
fn seconds(value: f32) -> Duration {
    Duration::from_millis((f64::from(value) * 1_000.0).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blast_maze_system_hazards::default_tiers;

    #[test]
    fn defaults_describe_the_classic_game() {
        let config = GameConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.display.columns(), 60);
        assert_eq!(config.display.rows(), 40);
        assert_eq!(config.display.window_title, "Maze Game");
        assert_eq!(config.session.frame_rate, 30);
        assert_eq!(config.hazard_tuning().tiers(), default_tiers().as_slice());
        assert_eq!(config.hazard_tuning().min_bombs(), 2);
        assert_eq!(config.hazard_tuning().max_bombs(), 8);
        assert_eq!(config.difficulty_tuning(), DifficultyTuning::default());
        assert_eq!(config.session_tuning(), SessionTuning::default());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = GameConfig::from_toml_str("").expect("empty config is valid");
        assert_eq!(config, GameConfig::default());
    }

    #[test]
    fn sections_override_individual_values() {
        let config = GameConfig::from_toml_str(
            r#"
            [display]
            tile_size = 40

            [session]
            success_dwell_seconds = 0.5

            [hazards]
            min_bombs = 1
            max_bombs = 1

            [[hazards.tiers]]
            color = [12, 34, 56]
            fuse_seconds = 1.5
            "#,
        )
        .expect("valid config");

        assert_eq!(config.display.columns(), 30);
        assert_eq!(config.display.rows(), 20);
        assert_eq!(config.display.screen_width, 1200);
        assert_eq!(config.session.frame_rate, 30);
        assert_eq!(
            config.session_tuning().success_dwell(),
            Duration::from_millis(500)
        );
        assert_eq!(
            config.hazard_tuning().tiers(),
            &[SeverityTier::new(
                BombColor::from_rgb(12, 34, 56),
                Duration::from_millis(1_500)
            )]
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = GameConfig::from_toml_str("[display]\ntile = 3\n").expect_err("unknown key");
        assert!(matches!(error, ConfigError::Parse(_)));
    }

    #[test]
    fn degenerate_values_are_rejected() {
        let cases = [
            ("[display]\ntile_size = 0\n", "ZeroTileSize"),
            ("[display]\ntile_size = 2000\n", "EmptyGrid"),
            ("[hazards]\nmin_bombs = 5\nmax_bombs = 4\n", "BombRange"),
            (
                "[[hazards.tiers]]\ncolor = [0, 0, 0]\nfuse_seconds = 0.0\n",
                "InvalidFuse",
            ),
            (
                "[[hazards.tiers]]\ncolor = [0, 0, 0]\nfuse_seconds = 0.0004\n",
                "InvalidFuse",
            ),
            ("[session]\nframe_rate = 0\n", "ZeroFrameRate"),
            ("[session]\nsuccess_dwell_seconds = -1.0\n", "InvalidDwell"),
            ("[difficulty]\nmin = 0.9\nmax = 0.2\n", "DifficultyBounds"),
            ("[difficulty]\ndefault = 5.0\n", "DefaultDifficulty"),
            ("[difficulty]\ndefault = nan\n", "DefaultDifficulty"),
            ("[difficulty]\nnormalization = 0.0\n", "InvalidNormalization"),
        ];

        for (contents, expected) in cases {
            let error = GameConfig::from_toml_str(contents).expect_err(expected);
            assert!(
                format!("{error:?}").starts_with(expected),
                "{contents:?} produced {error:?}"
            );
        }
    }
}
