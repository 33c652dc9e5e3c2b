#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Adaptive difficulty derived from the history of completed levels.

use blast_maze_core::{Difficulty, Event, PerformanceSample};

/// Tuning constants for the difficulty estimate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuning {
    default: f32,
    normalization: f32,
    min: f32,
    max: f32,
}

impl Tuning {
    /// Creates a new tuning table.
    #[must_use]
    pub const fn new(default: f32, normalization: f32, min: f32, max: f32) -> Self {
        Self {
            default,
            normalization,
            min,
            max,
        }
    }

    /// Estimate reported while no level has been completed.
    #[must_use]
    pub const fn default_estimate(&self) -> f32 {
        self.default
    }

    /// Divisor applied to the combined time and move means.
    #[must_use]
    pub const fn normalization(&self) -> f32 {
        self.normalization
    }

    /// Lower clamp bound.
    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    /// Upper clamp bound.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(0.5, 200.0, 0.1, 1.0)
    }
}

/// Pure system that accumulates performance samples and estimates difficulty.
#[derive(Debug, Default)]
pub struct DifficultyEstimator {
    tuning: Tuning,
    history: Vec<PerformanceSample>,
}

impl DifficultyEstimator {
    /// Creates an estimator with an empty history.
    #[must_use]
    pub fn new(tuning: Tuning) -> Self {
        Self {
            tuning,
            history: Vec::new(),
        }
    }

    /// Appends a completed level to the history.
    pub fn record(&mut self, sample: PerformanceSample) {
        self.history.push(sample);
        tracing::debug!(
            samples = self.history.len(),
            estimate = self.estimate().get(),
            "recorded performance sample"
        );
    }

    /// Records every [`Event::GoalReached`] sample contained in `events`.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::GoalReached { sample, .. } = event {
                self.record(*sample);
            }
        }
    }

    /// Samples recorded so far, oldest first.
    #[must_use]
    pub fn history(&self) -> &[PerformanceSample] {
        &self.history
    }

    /// Current difficulty estimate.
    ///
    /// The mean completion time in seconds and the mean move count are summed,
    /// normalized, and clamped to the configured bounds.
    #[must_use]
    pub fn estimate(&self) -> Difficulty {
        if self.history.is_empty() {
            return Difficulty::new(self.tuning.default);
        }

        let count = self.history.len() as f64;
        let total_seconds: f64 = self
            .history
            .iter()
            .map(|sample| sample.elapsed().as_secs_f64())
            .sum();
        let total_moves: f64 = self
            .history
            .iter()
            .map(|sample| f64::from(sample.moves()))
            .sum();

        let raw = (total_seconds / count + total_moves / count) / f64::from(self.tuning.normalization);
        let clamped = raw
            .max(f64::from(self.tuning.min))
            .min(f64::from(self.tuning.max));
        Difficulty::new(clamped as f32)
    }
}
