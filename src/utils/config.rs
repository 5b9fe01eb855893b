use crate::algorithms::path_loss::DistanceClamp;
use crate::core::{EmitterReference, Position, SourceKind, DEFAULT_PATH_LOSS_EXPONENT, MIN_RANGE_OBSERVATIONS};
use crate::processing::synthetic::SyntheticConfig;
use crate::validation::data::ValidationConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Detection session configuration
///
/// Built once and handed to the session at construction; the session never
/// mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Fixed WiFi/Bluetooth sources with known positions
    pub emitters: Vec<EmitterReference>,
    /// Path-loss exponent shared by all emitters
    pub path_loss_exponent: f64,
    /// Range applied to RSSI-derived distances
    pub distance_clamp: DistanceClamp,
    /// Per-provider-call timeout (milliseconds)
    pub scan_timeout_ms: u64,
    /// Interval between scheduled cycles (milliseconds)
    pub cycle_interval_ms: u64,
    /// Upper bound on candidates estimated per cycle
    pub max_candidates: usize,
    /// Residual (m) at which confidence halves
    pub residual_scale_m: f64,
    pub validation: ValidationConfig,
    pub synthetic: SyntheticConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            emitters: default_emitters(),
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
            distance_clamp: DistanceClamp::default(),
            scan_timeout_ms: 2000,
            cycle_interval_ms: 5000,
            max_candidates: 3,
            residual_scale_m: 2.0,
            validation: ValidationConfig::default(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Four ceiling-height sources in the corners of a 20 m x 20 m room
fn default_emitters() -> Vec<EmitterReference> {
    [
        ("emitter-1", 8.0, 8.0),
        ("emitter-2", -8.0, -8.0),
        ("emitter-3", 8.0, -8.0),
        ("emitter-4", -8.0, 8.0),
    ]
    .into_iter()
    .map(|(id, x, z)| EmitterReference::new(id, SourceKind::Wifi, Position::new(x, 2.5, z)))
    .collect()
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter { parameter: String, value: String, reason: String },
    #[error("failed to access config file '{path}': {source}")]
    Io { path: String, source: std::io::Error },
    #[error("config serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn invalid(parameter: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_string_lossy().to_string(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).map_err(|source| ConfigError::Io {
            path: path.as_ref().to_string_lossy().to_string(),
            source,
        })
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn cycle_interval(&self) -> Duration {
        Duration::from_millis(self.cycle_interval_ms)
    }

    pub fn emitter(&self, id: &str) -> Option<&EmitterReference> {
        self.emitters.iter().find(|e| e.id == id)
    }

    /// Check every parameter; the first violation is returned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.emitters.len() < MIN_RANGE_OBSERVATIONS {
            return Err(invalid(
                "emitters",
                self.emitters.len(),
                "at least 3 emitters are required for multilateration",
            ));
        }

        let mut ids = HashSet::new();
        for emitter in &self.emitters {
            if !ids.insert(emitter.id.as_str()) {
                return Err(invalid("emitters.id", &emitter.id, "duplicate emitter id"));
            }
            if !(emitter.frequency_mhz.is_finite() && emitter.frequency_mhz > 0.0) {
                return Err(invalid("emitters.frequency_mhz", emitter.frequency_mhz, "must be positive"));
            }
            if !(emitter.power_mw.is_finite() && emitter.power_mw > 0.0) {
                return Err(invalid("emitters.power_mw", emitter.power_mw, "must be positive"));
            }
            if !emitter.reference_tx_power_dbm.is_finite() {
                return Err(invalid(
                    "emitters.reference_tx_power_dbm",
                    emitter.reference_tx_power_dbm,
                    "must be finite",
                ));
            }
        }

        let positions: Vec<Position> = self.emitters.iter().map(|e| e.position).collect();
        if are_collinear(&positions) {
            return Err(invalid("emitters.position", positions.len(), "emitter positions are collinear"));
        }

        if !(self.path_loss_exponent.is_finite() && self.path_loss_exponent > 0.0) {
            return Err(invalid("path_loss_exponent", self.path_loss_exponent, "must be positive"));
        }
        if !self.distance_clamp.is_valid() {
            return Err(invalid(
                "distance_clamp",
                format!("[{}, {}]", self.distance_clamp.min_m, self.distance_clamp.max_m),
                "requires 0 < min < max",
            ));
        }
        if self.scan_timeout_ms == 0 {
            return Err(invalid("scan_timeout_ms", self.scan_timeout_ms, "must be non-zero"));
        }
        if self.cycle_interval_ms == 0 {
            return Err(invalid("cycle_interval_ms", self.cycle_interval_ms, "must be non-zero"));
        }
        if self.max_candidates == 0 {
            return Err(invalid("max_candidates", self.max_candidates, "must be at least 1"));
        }
        if !(self.residual_scale_m.is_finite() && self.residual_scale_m > 0.0) {
            return Err(invalid("residual_scale_m", self.residual_scale_m, "must be positive"));
        }
        if self.validation.min_rssi_dbm >= self.validation.max_rssi_dbm {
            return Err(invalid(
                "validation.min_rssi_dbm",
                self.validation.min_rssi_dbm,
                "must be below max_rssi_dbm",
            ));
        }
        if !(self.synthetic.room_half_extent_m.is_finite() && self.synthetic.room_half_extent_m > 0.0) {
            return Err(invalid(
                "synthetic.room_half_extent_m",
                self.synthetic.room_half_extent_m,
                "must be positive",
            ));
        }

        Ok(())
    }
}

/// True when every point lies on one line (or coincides)
fn are_collinear(positions: &[Position]) -> bool {
    let Some(first) = positions.first() else {
        return true;
    };
    let origin = first.to_vector();

    let Some(direction) = positions
        .iter()
        .map(|p| p.to_vector() - origin)
        .find(|v| v.norm() > 1e-6)
    else {
        return true;
    };

    positions
        .iter()
        .map(|p| p.to_vector() - origin)
        .all(|v| direction.cross(&v).norm() <= 1e-6 * direction.norm() * v.norm().max(1.0))
}
