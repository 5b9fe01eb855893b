//! Core positioning algorithms

pub mod path_loss;
pub mod multilateration;
pub mod attenuation;

pub use path_loss::{estimate_distance, DistanceClamp, PathLossModel};
pub use multilateration::{estimate_position, range_residual_rms, RangeObservation};
pub use attenuation::{field_intensity, intensity_at, tissue_attenuation, wavelength_m};
