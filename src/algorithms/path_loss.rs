//! Log-distance path-loss model
//!
//! Converts an RSSI reading into a distance estimate by inverting
//! `rssi = tx_power - 10 * n * log10(d)`, where `tx_power` is the RSSI
//! expected at 1 m and `n` is the environment's path-loss exponent.

use crate::core::{
    DEFAULT_PATH_LOSS_EXPONENT, DEFAULT_REFERENCE_TX_POWER_DBM, MAX_ESTIMATED_DISTANCE_M,
    MIN_ESTIMATED_DISTANCE_M,
};
use crate::validation::error::{DetectionError, DetectionResult};
use serde::{Deserialize, Serialize};

/// Estimate distance in meters from one RSSI reading.
///
/// An RSSI of exactly 0 means "no signal" and, like a non-finite value,
/// is rejected with [`DetectionError::InvalidMeasurement`].
pub fn estimate_distance(
    rssi_dbm: f64,
    reference_tx_power_dbm: f64,
    path_loss_exponent: f64,
) -> DetectionResult<f64> {
    if rssi_dbm == 0.0 || !rssi_dbm.is_finite() {
        return Err(DetectionError::InvalidMeasurement {
            source_id: String::new(),
            rssi_dbm,
        });
    }

    Ok(10f64.powf((reference_tx_power_dbm - rssi_dbm) / (10.0 * path_loss_exponent)))
}

/// Path-loss parameters for one emitter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathLossModel {
    pub reference_tx_power_dbm: f64,
    pub path_loss_exponent: f64,
}

impl Default for PathLossModel {
    fn default() -> Self {
        Self {
            reference_tx_power_dbm: DEFAULT_REFERENCE_TX_POWER_DBM,
            path_loss_exponent: DEFAULT_PATH_LOSS_EXPONENT,
        }
    }
}

impl PathLossModel {
    pub fn new(reference_tx_power_dbm: f64, path_loss_exponent: f64) -> Self {
        Self {
            reference_tx_power_dbm,
            path_loss_exponent,
        }
    }

    pub fn distance(&self, rssi_dbm: f64) -> DetectionResult<f64> {
        estimate_distance(rssi_dbm, self.reference_tx_power_dbm, self.path_loss_exponent)
    }

    /// RSSI the model predicts at `distance_m` (forward model)
    pub fn expected_rssi(&self, distance_m: f64) -> f64 {
        let d = distance_m.max(f64::MIN_POSITIVE);
        self.reference_tx_power_dbm - 10.0 * self.path_loss_exponent * d.log10()
    }
}

/// Sane range for RSSI-derived distances
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceClamp {
    pub min_m: f64,
    pub max_m: f64,
}

impl Default for DistanceClamp {
    fn default() -> Self {
        Self {
            min_m: MIN_ESTIMATED_DISTANCE_M,
            max_m: MAX_ESTIMATED_DISTANCE_M,
        }
    }
}

impl DistanceClamp {
    pub fn apply(&self, distance_m: f64) -> f64 {
        distance_m.clamp(self.min_m, self.max_m)
    }

    pub fn is_valid(&self) -> bool {
        self.min_m.is_finite() && self.max_m.is_finite() && self.min_m > 0.0 && self.min_m < self.max_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_power_is_one_meter() {
        let d = estimate_distance(-59.0, -59.0, 2.4).unwrap();
        assert_eq!(d, 1.0);

        let d = estimate_distance(-40.0, -40.0, 3.0).unwrap();
        assert_eq!(d, 1.0);
    }

    #[test]
    fn test_known_distance() {
        // 24 dB below reference with n = 2.4 is exactly 10 m
        let d = estimate_distance(-83.0, -59.0, 2.4).unwrap();
        assert!((d - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_rssi_rejected() {
        let result = estimate_distance(0.0, -59.0, 2.4);
        assert!(matches!(result, Err(DetectionError::InvalidMeasurement { .. })));
    }

    #[test]
    fn test_non_finite_rssi_rejected() {
        assert!(estimate_distance(f64::NAN, -59.0, 2.4).is_err());
        assert!(estimate_distance(f64::NEG_INFINITY, -59.0, 2.4).is_err());
    }

    #[test]
    fn test_forward_model_inverts_distance() {
        let model = PathLossModel::default();
        let rssi = model.expected_rssi(4.2);
        let d = model.distance(rssi).unwrap();
        assert!((d - 4.2).abs() < 1e-9);
    }

    #[test]
    fn test_weak_signal_is_clamped() {
        let clamp = DistanceClamp::default();
        let d = estimate_distance(-100.0, -59.0, 2.4).unwrap();
        assert!(d > clamp.max_m);
        assert_eq!(clamp.apply(d), 15.0);
        assert_eq!(clamp.apply(0.01), 0.5);
    }

    #[test]
    fn test_clamp_validity() {
        assert!(DistanceClamp::default().is_valid());
        assert!(!DistanceClamp { min_m: 0.0, max_m: 10.0 }.is_valid());
        assert!(!DistanceClamp { min_m: 5.0, max_m: 1.0 }.is_valid());
    }

    proptest! {
        #[test]
        fn prop_negative_rssi_gives_positive_finite_distance(rssi in -120.0f64..-0.001) {
            let d = estimate_distance(rssi, -59.0, 2.4).unwrap();
            prop_assert!(d > 0.0);
            prop_assert!(d.is_finite());
        }
    }
}
