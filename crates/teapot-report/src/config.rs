//! Collector configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which branch of a trigger sequence an event is bucketed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MainBranch {
    /// The earliest mispredicted branch
    #[default]
    First,
    /// The most recent mispredicted branch
    Last,
}

/// Collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Snapshots are written to `<prefix>_<unix-seconds>.json`
    pub output_prefix: PathBuf,
    /// Main-branch policy
    pub main_branch: MainBranch,
    /// Seconds between intermediate snapshots (`None` or 0 = final only)
    pub log_interval: Option<u64>,
    /// Parse branch sequences from event lines instead of the placeholder
    pub track_sequences: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            output_prefix: PathBuf::from("results/fuzz"),
            main_branch: MainBranch::First,
            log_interval: None,
            track_sequences: false,
        }
    }
}

impl CollectorConfig {
    /// Create a configuration writing to `output_prefix`
    #[must_use]
    pub fn new(output_prefix: impl Into<PathBuf>) -> Self {
        Self {
            output_prefix: output_prefix.into(),
            ..Self::default()
        }
    }

    /// Set main-branch policy
    #[must_use]
    pub const fn with_main_branch(mut self, main_branch: MainBranch) -> Self {
        self.main_branch = main_branch;
        self
    }

    /// Set snapshot interval in seconds
    #[must_use]
    pub const fn with_log_interval(mut self, seconds: Option<u64>) -> Self {
        self.log_interval = seconds;
        self
    }

    /// Enable branch-sequence parsing
    #[must_use]
    pub const fn with_track_sequences(mut self, track: bool) -> Self {
        self.track_sequences = track;
        self
    }

    /// Interval that actually triggers intermediate snapshots
    #[must_use]
    pub fn effective_log_interval(&self) -> Option<u64> {
        self.log_interval.filter(|&s| s > 0)
    }

    /// Path of the snapshot stamped with `timestamp`
    #[must_use]
    pub fn snapshot_path(&self, timestamp: i64) -> PathBuf {
        snapshot_path(&self.output_prefix, timestamp)
    }
}

fn snapshot_path(prefix: &Path, timestamp: i64) -> PathBuf {
    let mut name = prefix.as_os_str().to_owned();
    name.push(format!("_{timestamp}.json"));
    PathBuf::from(name)
}
