//! Common session types and data structures

use crate::core::{DetectedPosition, EmitterReference};
use crate::validation::error::DetectionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Phase of the detection cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Waiting for the next tick or trigger
    Idle,
    /// Querying the scan provider
    Scanning,
    /// Turning readings into detections
    Estimating,
    /// Snapshot swapped in; returns to `Idle` immediately after
    Published,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Scanning => "scanning",
            SessionState::Estimating => "estimating",
            SessionState::Published => "published",
        };
        f.write_str(name)
    }
}

/// Informational message for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionNotice {
    pub message: String,
    pub error: DetectionError,
}

impl From<DetectionError> for SessionNotice {
    fn from(error: DetectionError) -> Self {
        Self {
            message: error.to_string(),
            error,
        }
    }
}

/// Where a snapshot's detections came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotSource {
    Measured,
    Simulated,
    /// No detections this cycle
    Empty,
}

/// Everything published for one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSnapshot {
    /// 0 for the placeholder published before the first cycle
    pub cycle: u64,
    /// Cycle start (milliseconds since epoch)
    pub timestamp_ms: u64,
    pub detections: Vec<DetectedPosition>,
    pub emitters: Arc<[EmitterReference]>,
    pub notices: Vec<SessionNotice>,
}

impl DetectionSnapshot {
    /// Snapshot visible before any cycle has completed
    pub fn initial(emitters: Arc<[EmitterReference]>) -> Self {
        Self {
            cycle: 0,
            timestamp_ms: 0,
            detections: Vec::new(),
            emitters,
            notices: Vec::new(),
        }
    }

    pub fn source(&self) -> SnapshotSource {
        match self.detections.first() {
            None => SnapshotSource::Empty,
            Some(d) if d.is_simulated() => SnapshotSource::Simulated,
            Some(_) => SnapshotSource::Measured,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.source() == SnapshotSource::Simulated
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}

/// Result of asking the session to run one cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Published(Arc<DetectionSnapshot>),
    /// Another cycle was already in flight
    Skipped,
}

impl CycleOutcome {
    pub fn snapshot(&self) -> Option<&Arc<DetectionSnapshot>> {
        match self {
            CycleOutcome::Published(snapshot) => Some(snapshot),
            CycleOutcome::Skipped => None,
        }
    }
}
