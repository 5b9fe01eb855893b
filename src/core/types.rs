//! Core data types for the presence estimation pipeline

use crate::core::constants::{
    DEFAULT_FREQUENCY_MHZ, DEFAULT_POWER_MW, DEFAULT_REFERENCE_TX_POWER_DBM,
};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Room-frame position in meters (y is height above the floor)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    pub fn from_vector(v: &Vector3<f64>) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }

    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.to_vector() - other.to_vector()).norm()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

/// Radio technology a reading or emitter belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Bluetooth,
    Wifi,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Bluetooth => write!(f, "bluetooth"),
            SourceKind::Wifi => write!(f, "wifi"),
        }
    }
}

/// One RSSI sample reported by the device scan provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReading {
    pub source_id: String,
    pub kind: SourceKind,
    /// Received signal strength (dBm)
    pub rssi_dbm: f64,
    /// Capture time (milliseconds since epoch)
    pub timestamp_ms: u64,
}

impl SignalReading {
    pub fn new(source_id: impl Into<String>, kind: SourceKind, rssi_dbm: f64, timestamp_ms: u64) -> Self {
        Self {
            source_id: source_id.into(),
            kind,
            rssi_dbm,
            timestamp_ms,
        }
    }
}

/// Fixed WiFi/Bluetooth source with a known position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterReference {
    /// Matches `SignalReading::source_id`
    pub id: String,
    pub kind: SourceKind,
    pub position: Position,
    /// RSSI expected at 1 m (dBm)
    #[serde(default = "default_reference_tx_power")]
    pub reference_tx_power_dbm: f64,
    #[serde(default = "default_frequency")]
    pub frequency_mhz: f64,
    /// Radiated power used by the intensity model (mW)
    #[serde(default = "default_power")]
    pub power_mw: f64,
}

fn default_reference_tx_power() -> f64 {
    DEFAULT_REFERENCE_TX_POWER_DBM
}

fn default_frequency() -> f64 {
    DEFAULT_FREQUENCY_MHZ
}

fn default_power() -> f64 {
    DEFAULT_POWER_MW
}

impl EmitterReference {
    pub fn new(id: impl Into<String>, kind: SourceKind, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            position,
            reference_tx_power_dbm: DEFAULT_REFERENCE_TX_POWER_DBM,
            frequency_mhz: DEFAULT_FREQUENCY_MHZ,
            power_mw: DEFAULT_POWER_MW,
        }
    }

    pub fn with_reference_tx_power(mut self, dbm: f64) -> Self {
        self.reference_tx_power_dbm = dbm;
        self
    }

    pub fn with_frequency(mut self, frequency_mhz: f64) -> Self {
        self.frequency_mhz = frequency_mhz;
        self
    }

    pub fn with_power(mut self, power_mw: f64) -> Self {
        self.power_mw = power_mw;
        self
    }
}

/// Clamped distance from an emitter, derived from one reading
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceEstimate {
    pub emitter: EmitterReference,
    pub distance_m: f64,
    /// RSSI the distance was derived from (dBm)
    pub rssi_dbm: f64,
}

/// Estimated position of one detected body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub id: u32,
    pub position: Position,
    /// 0.0 to 1.0
    pub confidence: f64,
    /// Fraction of expected signal strength lost, 0.0 to 1.0
    pub signal_strength_reduction: f64,
}

/// Detection tagged by provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detection", rename_all = "lowercase")]
pub enum DetectedPosition {
    /// Estimated from measured readings
    Real(Detection),
    /// Generated by the synthetic fallback; not authoritative
    Simulated(Detection),
}

impl DetectedPosition {
    pub fn detection(&self) -> &Detection {
        match self {
            DetectedPosition::Real(d) | DetectedPosition::Simulated(d) => d,
        }
    }

    pub fn is_simulated(&self) -> bool {
        matches!(self, DetectedPosition::Simulated(_))
    }

    pub fn id(&self) -> u32 {
        self.detection().id
    }

    pub fn position(&self) -> Position {
        self.detection().position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0, 0.0);
        let b = Position::new(3.0, 4.0, 0.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_emitter_defaults_from_json() {
        let json = r#"{"id":"ap-1","kind":"wifi","position":{"x":1.0,"y":2.0,"z":3.0}}"#;
        let emitter: EmitterReference = serde_json::from_str(json).unwrap();
        assert_eq!(emitter.reference_tx_power_dbm, -59.0);
        assert_eq!(emitter.frequency_mhz, 2400.0);
        assert_eq!(emitter.power_mw, 100.0);
    }

    #[test]
    fn test_detected_position_tagging() {
        let detection = Detection {
            id: 1,
            position: Position::new(1.0, 0.5, -2.0),
            confidence: 0.8,
            signal_strength_reduction: 0.3,
        };
        let simulated = DetectedPosition::Simulated(detection.clone());
        assert!(simulated.is_simulated());
        assert!(!DetectedPosition::Real(detection).is_simulated());

        let json = serde_json::to_string(&simulated).unwrap();
        assert!(json.contains(r#""kind":"simulated""#));
    }
}
