//! Tunable parameters.
//!
//! The configuration is a flat set of options passed from JavaScript as a
//! plain object. [`ConfigPatch`] updates a subset of them; changes apply on
//! the next tick or layout pass. Values are taken as given: negative or zero
//! spacings and intervals produce degenerate output, never a panic.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutSettings;
use crate::sim::Timing;

/// Full view configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewConfig {
    /// Horizontal distance between peer lanes.
    pub lane_spacing: f32,
    /// Vertical distance between round levels.
    pub level_spacing: f32,
    /// Horizontal shift applied per fork sibling.
    pub fork_offset: f32,
    /// Number of trailing rounds laid out (0 = unbounded).
    pub window_rounds: u64,
    /// Milliseconds between rounds.
    pub tick_interval_ms: f64,
    /// Probability that a peer abstains in a round.
    pub skip_probability: f64,
    /// Upper bound of the per-vertex arrival delay in milliseconds.
    pub arrival_jitter_ms: f64,
    /// Generator seed.
    pub seed: u64,
    /// Peers created at startup.
    pub initial_peers: usize,
}

/// Node scale 0.1 times spread 5.
const DEFAULT_SPACING: f32 = 0.5;

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            lane_spacing: DEFAULT_SPACING,
            level_spacing: DEFAULT_SPACING,
            fork_offset: 0.15,
            window_rounds: 20,
            tick_interval_ms: 1000.0,
            skip_probability: 0.3,
            arrival_jitter_ms: 400.0,
            seed: 0,
            initial_peers: 5,
        }
    }
}

impl ViewConfig {
    /// Spacing parameters for a layout pass.
    pub fn layout_settings(&self) -> LayoutSettings {
        LayoutSettings {
            lane_spacing: self.lane_spacing,
            level_spacing: self.level_spacing,
            fork_offset: self.fork_offset,
        }
    }

    /// Timing parameters for the simulation clock.
    pub fn timing(&self) -> Timing {
        Timing {
            tick_interval_ms: self.tick_interval_ms,
            arrival_jitter_ms: self.arrival_jitter_ms,
        }
    }

    /// Apply a partial update.
    pub fn apply(&mut self, patch: &ConfigPatch) {
        if let Some(v) = patch.lane_spacing {
            self.lane_spacing = v;
        }
        if let Some(v) = patch.level_spacing {
            self.level_spacing = v;
        }
        if let Some(v) = patch.fork_offset {
            self.fork_offset = v;
        }
        if let Some(v) = patch.window_rounds {
            self.window_rounds = v;
        }
        if let Some(v) = patch.tick_interval_ms {
            self.tick_interval_ms = v;
        }
        if let Some(v) = patch.skip_probability {
            self.skip_probability = v;
        }
        if let Some(v) = patch.arrival_jitter_ms {
            self.arrival_jitter_ms = v;
        }
    }
}

/// Partial configuration update. Absent fields keep their current value.
///
/// The seed and initial peer count only matter at construction and are not
/// part of the patch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    pub lane_spacing: Option<f32>,
    pub level_spacing: Option<f32>,
    pub fork_offset: Option<f32>,
    pub window_rounds: Option<u64>,
    pub tick_interval_ms: Option<f64>,
    pub skip_probability: Option<f64>,
    pub arrival_jitter_ms: Option<f64>,
}
