//! Inverse-square weighted centroid multilateration
//!
//! This is a coarse stand-in for true trilateration: each reference point
//! is weighted by `1 / d²` and the estimate is the weighted mean position.
//! It does not solve the range equations, so the result is always inside
//! the convex hull of the references and is pulled toward whichever
//! reference reports the smallest distance.

use crate::core::{Position, MIN_RANGE_OBSERVATIONS};
use nalgebra::Vector3;

/// Distances below this are floored before weighting (m)
pub const MIN_WEIGHTING_DISTANCE_M: f64 = 1e-3;

/// A reference position and the distance measured to it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeObservation {
    pub position: Position,
    pub distance_m: f64,
}

impl RangeObservation {
    pub fn new(position: Position, distance_m: f64) -> Self {
        Self { position, distance_m }
    }

    fn weight(&self) -> f64 {
        let d = self.distance_m.max(MIN_WEIGHTING_DISTANCE_M);
        1.0 / (d * d)
    }
}

/// Estimate a position from at least three range observations.
///
/// Returns `None` when fewer than three observations are given.
pub fn estimate_position(readings: &[RangeObservation]) -> Option<Position> {
    if readings.len() < MIN_RANGE_OBSERVATIONS {
        return None;
    }

    let mut weighted_sum = Vector3::zeros();
    let mut total_weight = 0.0;

    for reading in readings {
        let weight = reading.weight();
        weighted_sum += reading.position.to_vector() * weight;
        total_weight += weight;
    }

    if !(total_weight.is_finite() && total_weight > 0.0) {
        return None;
    }

    Some(Position::from_vector(&(weighted_sum / total_weight)))
}

/// RMS difference between measured ranges and geometric distances from `position`
pub fn range_residual_rms(position: &Position, readings: &[RangeObservation]) -> f64 {
    if readings.is_empty() {
        return 0.0;
    }

    let sum_sq: f64 = readings
        .iter()
        .map(|r| (position.distance_to(&r.position) - r.distance_m).powi(2))
        .sum();

    (sum_sq / readings.len() as f64).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn obs(x: f64, y: f64, z: f64, d: f64) -> RangeObservation {
        RangeObservation::new(Position::new(x, y, z), d)
    }

    #[test]
    fn test_fewer_than_three_readings() {
        assert!(estimate_position(&[]).is_none());
        assert!(estimate_position(&[obs(1.0, 0.0, 0.0, 1.0)]).is_none());
        assert!(estimate_position(&[obs(1.0, 0.0, 0.0, 1.0), obs(0.0, 1.0, 0.0, 2.0)]).is_none());
    }

    #[test]
    fn test_equal_weights_give_centroid() {
        let readings = [
            obs(10.0, 0.0, 0.0, 1.0),
            obs(-10.0, 0.0, 0.0, 1.0),
            obs(0.0, 10.0, 0.0, 1.0),
        ];
        let p = estimate_position(&readings).unwrap();
        assert!(p.x.abs() < 1e-3);
        assert!((p.y - 10.0 / 3.0).abs() < 1e-3);
        assert!(p.z.abs() < 1e-3);
    }

    #[test]
    fn test_symmetric_layout_centroid() {
        let readings = [
            obs(8.0, 2.5, 8.0, 5.0),
            obs(-8.0, 2.5, -8.0, 5.0),
            obs(8.0, 2.5, -8.0, 5.0),
            obs(-8.0, 2.5, 8.0, 5.0),
        ];
        let p = estimate_position(&readings).unwrap();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - 2.5).abs() < 1e-9);
        assert!(p.z.abs() < 1e-9);
    }

    #[test]
    fn test_bias_toward_nearest_reference() {
        let readings = [
            obs(10.0, 0.0, 0.0, 1.0),
            obs(-10.0, 0.0, 0.0, 4.0),
            obs(0.0, 10.0, 0.0, 4.0),
        ];
        let p = estimate_position(&readings).unwrap();
        // weights 1, 1/16, 1/16
        assert!((p.x - (10.0 - 10.0 / 16.0) / (1.0 + 2.0 / 16.0)).abs() < 1e-9);
        assert!(p.x > 8.0);
    }

    #[test]
    fn test_zero_distance_is_guarded() {
        let readings = [
            obs(1.0, 0.0, 0.0, 0.0),
            obs(-1.0, 0.0, 0.0, 1.0),
            obs(0.0, 1.0, 0.0, 1.0),
        ];
        let p = estimate_position(&readings).unwrap();
        assert!(p.x.is_finite() && p.y.is_finite() && p.z.is_finite());
        assert!((p.x - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_residual_is_zero_for_consistent_ranges() {
        let target = Position::new(1.0, 0.0, 2.0);
        let refs = [Position::new(5.0, 0.0, 0.0), Position::new(0.0, 3.0, 0.0), Position::new(0.0, 0.0, -4.0)];
        let readings: Vec<_> = refs
            .iter()
            .map(|p| RangeObservation::new(*p, p.distance_to(&target)))
            .collect();
        assert!(range_residual_rms(&target, &readings) < 1e-12);
        assert!(range_residual_rms(&Position::default(), &readings) > 0.1);
    }

    proptest! {
        #[test]
        fn prop_reorder_invariance(
            raw in prop::collection::vec(
                (-10.0f64..10.0, -3.0f64..3.0, -10.0f64..10.0, 0.5f64..15.0),
                3..8,
            ),
            rotation in 0usize..8,
        ) {
            let readings: Vec<_> = raw.iter().map(|&(x, y, z, d)| obs(x, y, z, d)).collect();
            let mut reordered = readings.clone();
            reordered.reverse();
            let k = rotation % reordered.len();
            reordered.rotate_left(k);

            let a = estimate_position(&readings).unwrap();
            let b = estimate_position(&reordered).unwrap();
            prop_assert!(a.distance_to(&b) < 1e-9);
        }
    }
}
