//! Physical constants and system parameters

/// Propagation speed of electromagnetic waves in free space (m/s)
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Reference transmit power at 1 m used when an emitter does not specify one (dBm)
pub const DEFAULT_REFERENCE_TX_POWER_DBM: f64 = -59.0;

/// Indoor path-loss exponent
pub const DEFAULT_PATH_LOSS_EXPONENT: f64 = 2.4;

/// Default emitter carrier frequency (MHz)
pub const DEFAULT_FREQUENCY_MHZ: f64 = 2400.0;

/// Default emitter radiated power (mW)
pub const DEFAULT_POWER_MW: f64 = 100.0;

/// Lower clamp applied to RSSI-derived distances (m)
pub const MIN_ESTIMATED_DISTANCE_M: f64 = 0.5;

/// Upper clamp applied to RSSI-derived distances (m)
pub const MAX_ESTIMATED_DISTANCE_M: f64 = 15.0;

/// Minimum number of range observations for a position estimate
pub const MIN_RANGE_OBSERVATIONS: usize = 3;
