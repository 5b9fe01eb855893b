use crate::core::SourceKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error classification for the detection pipeline
///
/// None of these conditions stop the process; each one maps to a local
/// recovery through [`DetectionError::recovery`].
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum DetectionError {
    /// The platform cannot provide readings for this source kind
    #[error("{kind} scanning unavailable: {reason}")]
    UnsupportedCapability { kind: SourceKind, reason: String },

    /// Too few distance estimates to run multilateration
    #[error("insufficient readings: {available} available, {required} required")]
    InsufficientReadings { available: usize, required: usize },

    /// RSSI of zero or not a finite number
    #[error("invalid measurement from {source_id}: {rssi_dbm} dBm")]
    InvalidMeasurement { source_id: String, rssi_dbm: f64 },

    /// Reading captured too long before the current cycle
    #[error("stale reading from {source_id}: {age_ms}ms old (max {max_age_ms}ms)")]
    StaleReading { source_id: String, age_ms: u64, max_age_ms: u64 },

    /// The provider did not answer before the scan timeout
    #[error("{kind} scan timed out after {timeout_ms}ms")]
    ProviderTimeout { kind: SourceKind, timeout_ms: u64 },
}

/// Recovery applied when a [`DetectionError`] is raised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recovery {
    /// Use synthetic detections for this cycle
    SyntheticFallback,
    /// Drop the candidate for this cycle
    SkipCandidate,
    /// Discard the offending reading
    DiscardReading,
    /// Treat the source as empty now, query it again next cycle
    RetryNextCycle,
}

impl DetectionError {
    pub fn recovery(&self) -> Recovery {
        match self {
            DetectionError::UnsupportedCapability { .. } => Recovery::SyntheticFallback,
            DetectionError::InsufficientReadings { .. } => Recovery::SkipCandidate,
            DetectionError::InvalidMeasurement { .. } => Recovery::DiscardReading,
            DetectionError::StaleReading { .. } => Recovery::DiscardReading,
            DetectionError::ProviderTimeout { .. } => Recovery::RetryNextCycle,
        }
    }

    /// Whether the condition should reach the user as a notice
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            DetectionError::UnsupportedCapability { .. } | DetectionError::ProviderTimeout { .. }
        )
    }

    pub fn is_fatal(&self) -> bool {
        false
    }
}

pub type DetectionResult<T> = Result<T, DetectionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovery_mapping() {
        let timeout = DetectionError::ProviderTimeout { kind: SourceKind::Wifi, timeout_ms: 2000 };
        assert_eq!(timeout.recovery(), Recovery::RetryNextCycle);
        assert!(timeout.is_user_visible());

        let insufficient = DetectionError::InsufficientReadings { available: 2, required: 3 };
        assert_eq!(insufficient.recovery(), Recovery::SkipCandidate);
        assert!(!insufficient.is_user_visible());
    }

    #[test]
    fn test_nothing_is_fatal() {
        let errors = [
            DetectionError::UnsupportedCapability { kind: SourceKind::Bluetooth, reason: "no adapter".into() },
            DetectionError::InsufficientReadings { available: 0, required: 3 },
            DetectionError::InvalidMeasurement { source_id: "ap".into(), rssi_dbm: 0.0 },
            DetectionError::StaleReading { source_id: "ap".into(), age_ms: 40_000, max_age_ms: 30_000 },
            DetectionError::ProviderTimeout { kind: SourceKind::Wifi, timeout_ms: 10 },
        ];
        assert!(errors.iter().all(|e| !e.is_fatal()));
    }

    #[test]
    fn test_display() {
        let err = DetectionError::InvalidMeasurement { source_id: "beacon-1".into(), rssi_dbm: 0.0 };
        assert_eq!(err.to_string(), "invalid measurement from beacon-1: 0 dBm");
    }
}
