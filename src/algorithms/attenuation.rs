//! Wave intensity and attenuation model
//!
//! Inverse-square spreading with an exponential, wavelength-scaled falloff.
//! Higher frequencies decay faster, which stands in for absorption by
//! tissue. This is a display and confidence signal only; it says nothing
//! about real RF propagation and never feeds the position estimate.

use crate::core::{EmitterReference, Position, SPEED_OF_LIGHT};
use std::f64::consts::PI;

/// Distances below this are floored to keep intensities finite (m)
pub const MIN_INTENSITY_DISTANCE_M: f64 = 1e-3;

/// Reference carrier for the tissue loss factor (MHz)
const TISSUE_REFERENCE_FREQUENCY_MHZ: f64 = 2400.0;

/// Wavelength in meters for a carrier frequency in MHz
pub fn wavelength_m(frequency_mhz: f64) -> f64 {
    SPEED_OF_LIGHT / (frequency_mhz * 1e6)
}

/// Signal intensity (mW/m², scaled) from `emitter` at `point`
pub fn intensity_at(emitter: &EmitterReference, point: &Position) -> f64 {
    let distance = emitter.position.distance_to(point);
    intensity_at_distance(emitter.power_mw, emitter.frequency_mhz, distance)
}

pub fn intensity_at_distance(power_mw: f64, frequency_mhz: f64, distance_m: f64) -> f64 {
    let d = distance_m.max(MIN_INTENSITY_DISTANCE_M);
    let raw = power_mw / (4.0 * PI * d * d);
    let attenuation = (-d / (wavelength_m(frequency_mhz) * 10.0)).exp();
    raw * attenuation
}

/// Summed intensity of all emitters at `point`
pub fn field_intensity(emitters: &[EmitterReference], point: &Position) -> f64 {
    emitters.iter().map(|e| intensity_at(e, point)).sum()
}

/// Relative loss through a body: inverse-square spreading divided by a
/// `(f / 2400 MHz)^1.5` frequency factor.
pub fn tissue_attenuation(distance_m: f64, frequency_mhz: f64) -> f64 {
    let d = distance_m.max(MIN_INTENSITY_DISTANCE_M);
    let frequency_factor = (frequency_mhz / TISSUE_REFERENCE_FREQUENCY_MHZ).powf(1.5);
    (1.0 / (d * d)) / frequency_factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SourceKind;
    use proptest::prelude::*;

    fn emitter_at_origin(frequency_mhz: f64) -> EmitterReference {
        EmitterReference::new("ap", SourceKind::Wifi, Position::default()).with_frequency(frequency_mhz)
    }

    #[test]
    fn test_wavelength() {
        assert!((wavelength_m(2400.0) - 0.124913).abs() < 1e-6);
        assert!(wavelength_m(5000.0) < wavelength_m(2400.0));
    }

    #[test]
    fn test_intensity_matches_formula() {
        let emitter = emitter_at_origin(2400.0);
        let point = Position::new(2.0, 0.0, 0.0);
        let expected = 100.0 / (4.0 * PI * 4.0) * (-2.0 / (wavelength_m(2400.0) * 10.0)).exp();
        assert!((intensity_at(&emitter, &point) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_higher_frequency_falls_off_faster() {
        let low = emitter_at_origin(2400.0);
        let high = emitter_at_origin(5000.0);
        let point = Position::new(3.0, 0.0, 0.0);
        assert!(intensity_at(&high, &point) < intensity_at(&low, &point));
    }

    #[test]
    fn test_intensity_finite_at_emitter() {
        let emitter = emitter_at_origin(2400.0);
        let value = intensity_at(&emitter, &Position::default());
        assert!(value.is_finite() && value > 0.0);
    }

    #[test]
    fn test_field_is_sum() {
        let a = emitter_at_origin(2400.0);
        let b = EmitterReference::new("b", SourceKind::Bluetooth, Position::new(4.0, 0.0, 0.0));
        let p = Position::new(1.0, 0.0, 0.0);
        let total = field_intensity(&[a.clone(), b.clone()], &p);
        assert!((total - intensity_at(&a, &p) - intensity_at(&b, &p)).abs() < 1e-15);
    }

    #[test]
    fn test_tissue_attenuation_frequency_factor() {
        assert!((tissue_attenuation(2.0, 2400.0) - 0.25).abs() < 1e-12);
        assert!(tissue_attenuation(2.0, 5000.0) < tissue_attenuation(2.0, 2400.0));
    }

    proptest! {
        #[test]
        fn prop_intensity_strictly_decreasing(
            d in 0.01f64..20.0,
            step in 0.001f64..5.0,
            frequency in 900.0f64..6000.0,
            power in 1.0f64..1000.0,
        ) {
            let near = intensity_at_distance(power, frequency, d);
            let far = intensity_at_distance(power, frequency, d + step);
            prop_assert!(far < near);
            prop_assert!(far >= 0.0);
        }
    }
}
