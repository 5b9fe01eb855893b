//! Session API and output formatting
//!
//! [`DetectionSession`] runs detection cycles against a scan provider and
//! publishes snapshots; the formatters render them for people and log sinks.

pub mod session;
pub mod types;
pub mod formatting;

pub use session::{next_snapshot, DetectionSession, SessionHandle};
pub use types::{CycleOutcome, DetectionSnapshot, SessionNotice, SessionState, SnapshotSource};
pub use formatting::{CsvFormatter, JsonFormatter, OutputFormat, TextFormatter};
