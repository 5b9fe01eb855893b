//! Confidence and signal-reduction scoring for measured estimates
//!
//! The intensity model weights how much each emitter's range residual
//! counts: emitters whose field is strong at the estimate dominate. The
//! position itself is never adjusted here.

use crate::algorithms::attenuation::{intensity_at, tissue_attenuation};
use crate::algorithms::multilateration::{range_residual_rms, RangeObservation};
use crate::algorithms::path_loss::PathLossModel;
use crate::core::{DistanceEstimate, Position};

/// Scores for one estimated position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateScore {
    pub confidence: f64,
    pub signal_strength_reduction: f64,
    /// Unweighted RMS range residual, for diagnostics (m)
    pub residual_rms_m: f64,
}

#[derive(Debug, Clone)]
pub struct ConfidenceScorer {
    path_loss_exponent: f64,
    residual_scale_m: f64,
    configured_emitters: usize,
}

impl ConfidenceScorer {
    pub fn new(path_loss_exponent: f64, residual_scale_m: f64, configured_emitters: usize) -> Self {
        Self {
            path_loss_exponent,
            residual_scale_m,
            configured_emitters,
        }
    }

    pub fn score(&self, position: &Position, estimates: &[DistanceEstimate]) -> CandidateScore {
        if estimates.is_empty() {
            return CandidateScore {
                confidence: 0.0,
                signal_strength_reduction: 0.0,
                residual_rms_m: 0.0,
            };
        }

        let observations: Vec<RangeObservation> = estimates
            .iter()
            .map(|e| RangeObservation::new(e.emitter.position, e.distance_m))
            .collect();

        CandidateScore {
            confidence: self.confidence(position, estimates),
            signal_strength_reduction: self.signal_strength_reduction(position, estimates),
            residual_rms_m: range_residual_rms(position, &observations),
        }
    }

    fn confidence(&self, position: &Position, estimates: &[DistanceEstimate]) -> f64 {
        let intensities: Vec<f64> = estimates
            .iter()
            .map(|e| intensity_at(&e.emitter, position))
            .collect();
        let total: f64 = intensities.iter().sum();

        let residual = if total > 0.0 && total.is_finite() {
            estimates
                .iter()
                .zip(&intensities)
                .map(|(e, v)| (v / total) * (e.distance_m - e.emitter.position.distance_to(position)).abs())
                .sum::<f64>()
        } else {
            // every emitter too far for the field to register
            estimates
                .iter()
                .map(|e| (e.distance_m - e.emitter.position.distance_to(position)).abs())
                .sum::<f64>()
                / estimates.len() as f64
        };

        let coverage = (estimates.len() as f64 / self.configured_emitters.max(1) as f64).min(1.0);
        (coverage / (1.0 + residual / self.residual_scale_m)).clamp(0.0, 1.0)
    }

    fn signal_strength_reduction(&self, position: &Position, estimates: &[DistanceEstimate]) -> f64 {
        let mut weighted_loss = 0.0;
        let mut total_weight = 0.0;

        for estimate in estimates {
            let emitter = &estimate.emitter;
            let geometric = emitter.position.distance_to(position);
            let model = PathLossModel::new(emitter.reference_tx_power_dbm, self.path_loss_exponent);

            let expected_mw = dbm_to_mw(model.expected_rssi(geometric));
            let measured_mw = dbm_to_mw(estimate.rssi_dbm);
            let loss = ((expected_mw - measured_mw) / expected_mw).clamp(0.0, 1.0);

            let weight = tissue_attenuation(geometric, emitter.frequency_mhz);
            weighted_loss += loss * weight;
            total_weight += weight;
        }

        if total_weight > 0.0 {
            (weighted_loss / total_weight).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

fn dbm_to_mw(dbm: f64) -> f64 {
    10f64.powf(dbm / 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EmitterReference, SourceKind};

    fn layout() -> Vec<EmitterReference> {
        vec![
            EmitterReference::new("a", SourceKind::Wifi, Position::new(3.0, 0.0, 0.0)),
            EmitterReference::new("b", SourceKind::Wifi, Position::new(-3.0, 0.0, 0.0)),
            EmitterReference::new("c", SourceKind::Wifi, Position::new(0.0, 0.0, 3.0)),
        ]
    }

    fn consistent_estimates(subject: Position, occlusion_db: f64) -> Vec<DistanceEstimate> {
        layout()
            .into_iter()
            .map(|emitter| {
                let d = emitter.position.distance_to(&subject);
                let model = PathLossModel::new(emitter.reference_tx_power_dbm, 2.4);
                DistanceEstimate {
                    rssi_dbm: model.expected_rssi(d) - occlusion_db,
                    distance_m: d,
                    emitter,
                }
            })
            .collect()
    }

    #[test]
    fn test_consistent_ranges_full_confidence() {
        let subject = Position::new(0.5, 0.0, 0.5);
        let scorer = ConfidenceScorer::new(2.4, 2.0, 3);
        let score = scorer.score(&subject, &consistent_estimates(subject, 0.0));
        assert!((score.confidence - 1.0).abs() < 1e-9);
        assert!(score.signal_strength_reduction.abs() < 1e-9);
        assert!(score.residual_rms_m < 1e-9);
    }

    #[test]
    fn test_partial_coverage_lowers_confidence() {
        let subject = Position::new(0.5, 0.0, 0.5);
        let scorer = ConfidenceScorer::new(2.4, 2.0, 6);
        let score = scorer.score(&subject, &consistent_estimates(subject, 0.0));
        assert!((score.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_residual_lowers_confidence() {
        let subject = Position::new(0.5, 0.0, 0.5);
        let scorer = ConfidenceScorer::new(2.4, 2.0, 3);
        let score = scorer.score(&Position::new(2.0, 0.0, -2.0), &consistent_estimates(subject, 0.0));
        assert!(score.confidence < 0.9);
        assert!(score.confidence > 0.0);
    }

    #[test]
    fn test_occlusion_reported_as_reduction() {
        let subject = Position::new(0.0, 0.0, 1.0);
        let scorer = ConfidenceScorer::new(2.4, 2.0, 3);
        // 3 dB below prediction is roughly half the power
        let score = scorer.score(&subject, &consistent_estimates(subject, 3.0));
        assert!((score.signal_strength_reduction - 0.4988).abs() < 1e-3);
    }

    #[test]
    fn test_empty_estimates() {
        let scorer = ConfidenceScorer::new(2.4, 2.0, 3);
        let score = scorer.score(&Position::default(), &[]);
        assert_eq!(score.confidence, 0.0);
    }
}
