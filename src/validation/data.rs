use crate::core::SignalReading;
use crate::validation::error::DetectionError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for reading validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Weakest RSSI accepted (dBm)
    pub min_rssi_dbm: f64,
    /// Strongest RSSI accepted (dBm); 0 itself is always rejected
    pub max_rssi_dbm: f64,
    /// Maximum reading age relative to the cycle start, `None` disables the check
    pub max_reading_age_ms: Option<u64>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_rssi_dbm: -120.0,
            max_rssi_dbm: 0.0,
            max_reading_age_ms: Some(30_000), // 30 seconds
        }
    }
}

/// Outcome of validating one scan batch
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub accepted: Vec<SignalReading>,
    pub rejected: Vec<DetectionError>,
}

impl ValidationReport {
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.accepted.len() + self.rejected.len();
        if total == 0 {
            0.0
        } else {
            self.accepted.len() as f64 / total as f64
        }
    }
}

/// Filters readings before they reach distance estimation
#[derive(Debug, Clone, Default)]
pub struct ReadingValidator {
    config: ValidationConfig,
}

impl ReadingValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Check one reading against the cycle time `now_ms`
    pub fn validate_reading(&self, reading: &SignalReading, now_ms: u64) -> Result<(), DetectionError> {
        let rssi = reading.rssi_dbm;
        if rssi == 0.0
            || !rssi.is_finite()
            || rssi < self.config.min_rssi_dbm
            || rssi > self.config.max_rssi_dbm
        {
            return Err(DetectionError::InvalidMeasurement {
                source_id: reading.source_id.clone(),
                rssi_dbm: rssi,
            });
        }

        if let Some(max_age_ms) = self.config.max_reading_age_ms {
            // readings stamped after the cycle started count as fresh
            let age_ms = now_ms.saturating_sub(reading.timestamp_ms);
            if age_ms > max_age_ms {
                return Err(DetectionError::StaleReading {
                    source_id: reading.source_id.clone(),
                    age_ms,
                    max_age_ms,
                });
            }
        }

        Ok(())
    }

    pub fn validate_batch(&self, readings: Vec<SignalReading>, now_ms: u64) -> ValidationReport {
        let mut report = ValidationReport::default();

        for reading in readings {
            match self.validate_reading(&reading, now_ms) {
                Ok(()) => report.accepted.push(reading),
                Err(err) => {
                    debug!(source_id = %reading.source_id, error = %err, "discarding reading");
                    report.rejected.push(err);
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceKind;

    fn reading(id: &str, rssi: f64, timestamp_ms: u64) -> SignalReading {
        SignalReading::new(id, SourceKind::Wifi, rssi, timestamp_ms)
    }

    #[test]
    fn test_accepts_typical_reading() {
        let validator = ReadingValidator::default();
        assert!(validator.validate_reading(&reading("ap", -65.0, 1_000), 1_500).is_ok());
    }

    #[test]
    fn test_rejects_zero_and_non_finite() {
        let validator = ReadingValidator::default();
        for rssi in [0.0, f64::NAN, f64::INFINITY, -f64::INFINITY] {
            let result = validator.validate_reading(&reading("ap", rssi, 1_000), 1_000);
            assert!(matches!(result, Err(DetectionError::InvalidMeasurement { .. })));
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        let validator = ReadingValidator::default();
        assert!(validator.validate_reading(&reading("ap", -130.0, 0), 0).is_err());
        assert!(validator.validate_reading(&reading("ap", 5.0, 0), 0).is_err());
    }

    #[test]
    fn test_stale_reading() {
        let validator = ReadingValidator::default();
        let result = validator.validate_reading(&reading("ap", -60.0, 1_000), 40_000);
        assert!(matches!(result, Err(DetectionError::StaleReading { age_ms: 39_000, .. })));

        let no_age_check = ReadingValidator::new(ValidationConfig {
            max_reading_age_ms: None,
            ..Default::default()
        });
        assert!(no_age_check.validate_reading(&reading("ap", -60.0, 1_000), 40_000).is_ok());
    }

    #[test]
    fn test_batch_report() {
        let validator = ReadingValidator::default();
        let report = validator.validate_batch(
            vec![reading("a", -60.0, 100), reading("b", 0.0, 100), reading("c", -70.0, 100)],
            200,
        );
        assert_eq!(report.accepted.len(), 2);
        assert_eq!(report.rejected.len(), 1);
        assert!((report.acceptance_rate() - 2.0 / 3.0).abs() < 1e-12);
    }
}
