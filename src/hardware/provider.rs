//! Device scan provider trait

use crate::core::{SignalReading, SourceKind};
use crate::hardware::{ScanError, ScanResult};
use async_trait::async_trait;

/// Source of raw signal readings
///
/// Both scans are idempotent queries. An empty `Ok` means no devices were
/// found; like a failed scan it contributes no readings, but raises no
/// notice. Callers bound each call with their own timeout.
#[async_trait]
pub trait ScanProvider: Send + Sync {
    /// Current Bluetooth readings
    async fn scan_bluetooth(&self) -> ScanResult<Vec<SignalReading>>;

    /// Current WiFi readings
    async fn scan_wifi(&self) -> ScanResult<Vec<SignalReading>>;

    /// Short name for logs
    fn name(&self) -> &str;
}

/// Provider for platforms without radio access
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedScanProvider;

#[async_trait]
impl ScanProvider for UnsupportedScanProvider {
    async fn scan_bluetooth(&self) -> ScanResult<Vec<SignalReading>> {
        Err(ScanError::Unsupported(SourceKind::Bluetooth))
    }

    async fn scan_wifi(&self) -> ScanResult<Vec<SignalReading>> {
        Err(ScanError::Unsupported(SourceKind::Wifi))
    }

    fn name(&self) -> &str {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_provider() {
        let provider = UnsupportedScanProvider;
        assert_eq!(
            provider.scan_bluetooth().await,
            Err(ScanError::Unsupported(SourceKind::Bluetooth))
        );
        assert_eq!(provider.scan_wifi().await, Err(ScanError::Unsupported(SourceKind::Wifi)));
    }
}
