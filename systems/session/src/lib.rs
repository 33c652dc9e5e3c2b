#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session controller that turns held keys into movement and advances levels.
//!
//! A level runs until the world reports [`Event::GoalReached`]. The session
//! then shows the success message for the configured dwell and afterwards
//! requests the next level through the caller-provided level builder.

use std::time::Duration;

use blast_maze_core::{Command, Event, HeldDirections, LevelLayout};

/// Timing parameters of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tuning {
    success_dwell: Duration,
}

impl Tuning {
    /// Creates session tuning with the provided success dwell.
    #[must_use]
    pub const fn new(success_dwell: Duration) -> Self {
        Self { success_dwell }
    }

    /// Time the success message stays up before the next level starts.
    #[must_use]
    pub const fn success_dwell(&self) -> Duration {
        self.success_dwell
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(Duration::from_secs(2))
    }
}

/// Pure system owning the level counter and the success dwell timer.
#[derive(Debug, Default)]
pub struct Session {
    tuning: Tuning,
    level: u32,
    dwell: Option<Duration>,
}

impl Session {
    /// Creates a session that has not started any level yet.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            level: 0,
            dwell: None,
        }
    }

    /// Level most recently requested by the session.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Reports whether the success message is currently being shown.
    #[must_use]
    pub fn is_celebrating(&self) -> bool {
        self.dwell.is_some()
    }

    /// Requests the first level.
    pub fn begin<F>(&mut self, build_level: F, out: &mut Vec<Command>)
    where
        F: FnOnce(u32) -> LevelLayout,
    {
        self.level = 1;
        self.dwell = None;
        out.push(Command::StartLevel {
            level: self.level,
            layout: build_level(self.level),
        });
    }

    /// Consumes world events and held keys to emit movement and level commands.
    ///
    /// Movement impulses are only produced on frames that advanced time, one
    /// per held key. `build_level` is invoked at most once, when the success
    /// dwell has fully elapsed.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        held: HeldDirections,
        build_level: F,
        out: &mut Vec<Command>,
    ) where
        F: FnOnce(u32) -> LevelLayout,
    {
        let mut tick_observed = false;

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    tick_observed = true;
                    if let Some(dwell) = self.dwell.as_mut() {
                        *dwell = dwell.saturating_add(*dt);
                    }
                }
                Event::LevelStarted {
                    level,
                    columns,
                    rows,
                    bombs,
                } => {
                    tracing::info!(level, columns, rows, bombs, "level started");
                }
                Event::GoalReached { level, sample } => {
                    tracing::info!(
                        level,
                        elapsed = sample.elapsed().as_secs_f32(),
                        moves = sample.moves(),
                        "You reached the goal!"
                    );
                    if self.dwell.is_none() {
                        self.dwell = Some(Duration::ZERO);
                    }
                }
                _ => {}
            }
        }

        if !tick_observed {
            return;
        }

        for direction in held.impulses() {
            out.push(Command::MovePlayer { direction });
        }

        if self
            .dwell
            .is_some_and(|dwell| dwell > self.tuning.success_dwell)
        {
            self.dwell = None;
            self.level = self.level.saturating_add(1);
            out.push(Command::StartLevel {
                level: self.level,
                layout: build_level(self.level),
            });
        }
    }
}
