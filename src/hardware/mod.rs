//! Device scan provider boundary
//!
//! Real radio access lives outside this crate. This module defines the
//! trait the detection session queries and the providers used when no
//! platform scanner is available.

pub mod provider;
pub mod mock;
pub mod error;

pub use provider::{ScanProvider, UnsupportedScanProvider};
pub use mock::MockScanProvider;
pub use error::{ScanError, ScanResult};
