//! Core types and constants for the presence estimation pipeline

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
