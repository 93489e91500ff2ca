//! Scheduler configuration.
//!
//! Everything the pipeline needs to know is passed in one
//! [`SchedulerConfig`] value and validated once, before any work starts.
//!
//! ```
//! use cadence_sched::{Direction, SchedulerConfig};
//!
//! let config = SchedulerConfig::new()
//!     .with_direction("alap".parse().unwrap())
//!     .with_variation_limit(1000);
//!
//! assert_eq!(config.direction, Direction::Backward);
//! assert!(config.commute);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SchedError, SchedResult};

/// Scheduling direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// As soon as possible: start from the source, follow edges forward.
    #[default]
    #[serde(alias = "asap")]
    Forward,
    /// As late as possible: start from the sink, follow edges backward.
    #[serde(alias = "alap")]
    Backward,
}

impl FromStr for Direction {
    type Err = SchedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forward" | "asap" => Ok(Direction::Forward),
            "backward" | "alap" => Ok(Direction::Backward),
            _ => Err(SchedError::UnknownDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => write!(f, "forward"),
            Direction::Backward => write!(f, "backward"),
        }
    }
}

/// Configuration of one scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Scheduling direction.
    pub direction: Direction,
    /// Search over commutation variations. When off, every operand access
    /// is ordered in program order and the circuit is scheduled directly.
    pub commute: bool,
    /// Evaluate at most this many variations, in index order.
    pub variation_limit: Option<u64>,
    /// Keep a trace entry per evaluated variation in the report.
    pub record_traces: bool,
}

impl SchedulerConfig {
    /// Create the default configuration: forward, commutation on, no limit.
    pub fn new() -> Self {
        Self {
            direction: Direction::Forward,
            commute: true,
            variation_limit: None,
            record_traces: false,
        }
    }

    /// Build a configuration from string-valued options.
    pub fn from_options(direction: &str, commute: bool) -> SchedResult<Self> {
        Ok(Self::new()
            .with_direction(direction.parse()?)
            .with_commute(commute))
    }

    /// Set the scheduling direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Enable or disable the commutation search.
    #[must_use]
    pub fn with_commute(mut self, commute: bool) -> Self {
        self.commute = commute;
        self
    }

    /// Cap the number of evaluated variations.
    #[must_use]
    pub fn with_variation_limit(mut self, limit: u64) -> Self {
        self.variation_limit = Some(limit);
        self
    }

    /// Record per-variation traces.
    #[must_use]
    pub fn with_traces(mut self, record: bool) -> Self {
        self.record_traces = record;
        self
    }

    /// Check the configuration before any scheduling work.
    pub fn validate(&self) -> SchedResult<()> {
        if self.variation_limit == Some(0) {
            return Err(SchedError::InvalidConfig(
                "variation limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::new()
    }
}
