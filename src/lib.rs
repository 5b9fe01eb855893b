//! Signal-based presence estimation
//!
//! Estimates where people are in a room from the RSSI of WiFi and Bluetooth
//! emitters at known positions: path-loss distances, weighted
//! multilateration, and an intensity model for confidence. When no usable
//! readings exist, clearly tagged synthetic detections are published.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use core::{DetectedPosition, Detection, EmitterReference, Position, SignalReading, SourceKind};
pub use algorithms::{estimate_distance, estimate_position, intensity_at, RangeObservation};
pub use validation::{DetectionError, DetectionResult, Recovery};
pub use hardware::{MockScanProvider, ScanError, ScanProvider, UnsupportedScanProvider};
pub use utils::{init_logging, ConfigError, SessionConfig};
pub use api::{
    CycleOutcome, DetectionSession, DetectionSnapshot, SessionHandle, SessionNotice, SessionState,
    OutputFormat, TextFormatter, JsonFormatter, CsvFormatter,
};
