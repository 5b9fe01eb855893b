//! Scoring and synthetic generation for detection cycles

pub mod confidence;
pub mod synthetic;

pub use confidence::{CandidateScore, ConfidenceScorer};
pub use synthetic::{SyntheticConfig, SyntheticGenerator, WallAxis, WallSegment};
