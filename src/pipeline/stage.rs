//! Pipeline stages and pacing configuration.
//!
//! The stage order and the delays between stages are data, not control flow.
//! The delays accommodate the backend's rate window and have no bearing on
//! the result.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::scheduler::BatchConfig;

/// One step of a dashboard load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Profile,
    Couple,
    Invitation,
    Categories,
    Appointments,
    CategoryFanOut,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Profile => "profile",
            Stage::Couple => "couple",
            Stage::Invitation => "invitation",
            Stage::Categories => "categories",
            Stage::Appointments => "appointments",
            Stage::CategoryFanOut => "category fan-out",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every stage of a load, in the order it runs. A failed fetch stage fails
/// the load; the fan-out only ever degrades single categories.
pub const LOAD_STAGES: [Stage; 6] = [
    Stage::Profile,
    Stage::Couple,
    Stage::Invitation,
    Stage::Categories,
    Stage::Appointments,
    Stage::CategoryFanOut,
];

/// Default pause between top-level stages
pub const DEFAULT_STAGE_DELAY: Duration = Duration::from_millis(500);

/// Pacing and bounds for one load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Pause between consecutive stages (none before the first)
    pub stage_delay: Duration,
    /// Window size and pause for the per-category fan-out
    pub category_batch: BatchConfig,
    /// Upper bound on the whole load; `None` waits indefinitely
    pub deadline: Option<Duration>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_delay: DEFAULT_STAGE_DELAY,
            category_batch: BatchConfig::default(),
            deadline: None,
        }
    }
}

impl PipelineConfig {
    /// No pacing at all; mainly for tests and local backends
    pub fn unpaced() -> Self {
        Self {
            stage_delay: Duration::ZERO,
            category_batch: BatchConfig::new(1, Duration::ZERO),
            deadline: None,
        }
    }

    pub fn with_stage_delay(mut self, delay: Duration) -> Self {
        self.stage_delay = delay;
        self
    }

    pub fn with_category_batch(mut self, batch: BatchConfig) -> Self {
        self.category_batch = batch;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}
