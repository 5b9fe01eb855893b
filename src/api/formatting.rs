//! Snapshot output formatting
//!
//! Text, JSON and CSV renderings of a [`DetectionSnapshot`], used by the
//! demo runner and log sinks.

use crate::api::types::{DetectionSnapshot, SnapshotSource};
use crate::core::DetectedPosition;
use std::fmt::Write as _;
use std::str::FromStr;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

fn source_label(snapshot: &DetectionSnapshot) -> &'static str {
    match snapshot.source() {
        SnapshotSource::Measured => "measured",
        SnapshotSource::Simulated => "simulated",
        SnapshotSource::Empty => "empty",
    }
}

fn kind_label(detection: &DetectedPosition) -> &'static str {
    if detection.is_simulated() {
        "simulated"
    } else {
        "real"
    }
}

/// Human-readable text formatter
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// Include emitter layout and notices
    pub include_diagnostics: bool,
    /// One line per snapshot
    pub compact: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn format_text(&self, snapshot: &DetectionSnapshot) -> String {
        let mut output = String::new();

        if self.compact {
            let _ = write!(
                output,
                "#{} [{}] {} detection(s)",
                snapshot.cycle,
                source_label(snapshot),
                snapshot.len()
            );
            for detection in &snapshot.detections {
                let d = detection.detection();
                let _ = write!(
                    output,
                    " | {}:({:.1},{:.1},{:.1}) c{:.0}%",
                    d.id,
                    d.position.x,
                    d.position.y,
                    d.position.z,
                    d.confidence * 100.0
                );
            }
            if !snapshot.notices.is_empty() {
                let _ = write!(output, " | {} notice(s)", snapshot.notices.len());
            }
            return output;
        }

        let _ = writeln!(output, "Cycle #{} ({})", snapshot.cycle, source_label(snapshot));
        let _ = writeln!(output, "  Timestamp: {} ms", snapshot.timestamp_ms);

        if snapshot.is_simulated() {
            output.push_str("  Simulated data, not a measurement\n");
        }

        if snapshot.is_empty() {
            output.push_str("  No detections\n");
        }
        for detection in &snapshot.detections {
            let d = detection.detection();
            let _ = writeln!(output, "Detection {} ({}):", d.id, kind_label(detection));
            let _ = writeln!(output, "  Position:   {}", d.position);
            let _ = writeln!(output, "  Confidence: {:.0}%", d.confidence * 100.0);
            let _ = writeln!(output, "  Reduction:  {:.0}%", d.signal_strength_reduction * 100.0);
        }

        if self.include_diagnostics {
            output.push_str("Emitters:\n");
            for emitter in snapshot.emitters.iter() {
                let _ = writeln!(
                    output,
                    "  - {} ({}) at {}, {:.0} MHz",
                    emitter.id, emitter.kind, emitter.position, emitter.frequency_mhz
                );
            }

            if !snapshot.notices.is_empty() {
                output.push_str("Notices:\n");
                for notice in &snapshot.notices {
                    let _ = writeln!(output, "  - {}", notice.message);
                }
            }
        }

        output
    }
}

/// JSON formatter for structured output
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    pub pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }

    pub fn format_json(&self, snapshot: &DetectionSnapshot) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(snapshot)
        } else {
            serde_json::to_string(snapshot)
        }
    }
}

/// CSV formatter for data logging, one row per detection
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    pub include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self { include_header: true }
    }
}

impl CsvFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self) -> String {
        "cycle,timestamp_ms,id,kind,x,y,z,confidence,signal_strength_reduction".to_string()
    }

    /// Rows for every detection, preceded by the header if enabled
    pub fn format_csv(&self, snapshot: &DetectionSnapshot) -> String {
        let mut rows = Vec::with_capacity(snapshot.len() + 1);
        if self.include_header {
            rows.push(self.header());
        }

        for detection in &snapshot.detections {
            let d = detection.detection();
            rows.push(format!(
                "{},{},{},{},{:.3},{:.3},{:.3},{:.3},{:.3}",
                snapshot.cycle,
                snapshot.timestamp_ms,
                d.id,
                kind_label(detection),
                d.position.x,
                d.position.y,
                d.position.z,
                d.confidence,
                d.signal_strength_reduction
            ));
        }

        rows.join("\n")
    }
}
