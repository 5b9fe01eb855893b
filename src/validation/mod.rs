//! Reading validation and error handling

pub mod data;
pub mod error;

pub use data::{ReadingValidator, ValidationConfig, ValidationReport};
pub use error::{DetectionError, DetectionResult, Recovery};
