//! Synthetic detection generator
//!
//! Used when a cycle has no usable readings. Every detection produced here
//! is tagged [`DetectedPosition::Simulated`].

use crate::core::{DetectedPosition, Detection, Position};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Axis a wall is perpendicular to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallAxis {
    /// Wall lies in the plane `x = at`
    X,
    /// Wall lies in the plane `z = at`
    Z,
}

/// Interior wall that synthetic bodies keep clear of
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub axis: WallAxis,
    pub at: f64,
    /// Open extent along the other horizontal axis; `None` spans the room
    #[serde(default)]
    pub span: Option<(f64, f64)>,
    /// Half-width of the band around the wall that is avoided (m)
    #[serde(default = "default_clearance")]
    pub clearance_m: f64,
    /// Distance from the wall a body is moved to (m)
    #[serde(default = "default_push")]
    pub push_m: f64,
}

fn default_clearance() -> f64 {
    1.0
}

fn default_push() -> f64 {
    1.5
}

impl WallSegment {
    pub fn new(axis: WallAxis, at: f64, span: Option<(f64, f64)>) -> Self {
        Self {
            axis,
            at,
            span,
            clearance_m: default_clearance(),
            push_m: default_push(),
        }
    }

    /// Move `(x, z)` out of the clearance band, to the side it was on
    pub fn keep_clear(&self, x: f64, z: f64) -> (f64, f64) {
        let (across, along) = match self.axis {
            WallAxis::X => (x, z),
            WallAxis::Z => (z, x),
        };

        if let Some((lo, hi)) = self.span {
            if along <= lo || along >= hi {
                return (x, z);
            }
        }

        if (across - self.at).abs() >= self.clearance_m {
            return (x, z);
        }

        let moved = if across < self.at {
            self.at - self.push_m
        } else {
            self.at + self.push_m
        };

        match self.axis {
            WallAxis::X => (moved, z),
            WallAxis::Z => (x, moved),
        }
    }
}

/// Configuration for the synthetic fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntheticConfig {
    /// Publish synthetic detections when a cycle has no readings
    pub enabled: bool,
    /// Detections per synthetic cycle
    pub count: usize,
    /// Bodies are placed in `(-half_extent, half_extent)` on x and z (m)
    pub room_half_extent_m: f64,
    /// Height of synthetic bodies (m)
    pub floor_height_m: f64,
    pub walls: Vec<WallSegment>,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            count: 3,
            room_half_extent_m: 9.0,
            floor_height_m: 0.5,
            walls: vec![
                WallSegment::new(WallAxis::X, -5.0, None),
                WallSegment::new(WallAxis::Z, -5.0, Some((0.0, 10.0))),
            ],
            seed: None,
        }
    }
}

/// Randomized placement of simulated bodies
pub struct SyntheticGenerator {
    config: SyntheticConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    pub fn new(config: SyntheticConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    pub fn config(&self) -> &SyntheticConfig {
        &self.config
    }

    pub fn generate(&mut self) -> Vec<DetectedPosition> {
        (1..=self.config.count as u32)
            .map(|id| DetectedPosition::Simulated(self.generate_one(id)))
            .collect()
    }

    fn generate_one(&mut self, id: u32) -> Detection {
        let extent = self.config.room_half_extent_m * 2.0;
        let mut x = (self.rng.gen::<f64>() - 0.5) * extent;
        let mut z = (self.rng.gen::<f64>() - 0.5) * extent;

        for wall in &self.config.walls {
            (x, z) = wall.keep_clear(x, z);
        }

        Detection {
            id,
            position: Position::new(x, self.config.floor_height_m, z),
            confidence: 0.5 + 0.5 * self.rng.gen::<f64>(),
            signal_strength_reduction: 0.2 + 0.3 * self.rng.gen::<f64>(),
        }
    }
}
