//! Mock scan provider for testing and development

use crate::algorithms::path_loss::PathLossModel;
use crate::core::{EmitterReference, Position, SignalReading, SourceKind};
use crate::hardware::{ScanError, ScanProvider, ScanResult};
use crate::utils::current_time_ms;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::Rng;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Debug, Default)]
struct MockState {
    bluetooth: Vec<SignalReading>,
    wifi: Vec<SignalReading>,
    unsupported: HashSet<SourceKind>,
    connected: bool,
    simulate_errors: bool,
    error_probability: f32,
    scan_count: u32,
}

/// In-memory provider returning a fixed set of readings on every scan
///
/// Readings are re-stamped with the current time when scanned so they never
/// go stale.
pub struct MockScanProvider {
    state: Mutex<MockState>,
    delay: Option<Duration>,
}

impl Default for MockScanProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockScanProvider {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                connected: true,
                ..Default::default()
            }),
            delay: None,
        }
    }

    /// Delay every scan call, e.g. to exercise the session timeout
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn add_reading(&self, kind: SourceKind, source_id: impl Into<String>, rssi_dbm: f64) {
        let reading = SignalReading::new(source_id, kind, rssi_dbm, current_time_ms());
        let mut state = self.state.lock();
        match kind {
            SourceKind::Bluetooth => state.bluetooth.push(reading),
            SourceKind::Wifi => state.wifi.push(reading),
        }
    }

    /// Add one reading per emitter, consistent with a body at `subject`.
    ///
    /// `occlusion_db` is subtracted from the path-loss prediction to mimic
    /// the signal reduction a body causes.
    pub fn add_subject(
        &self,
        emitters: &[EmitterReference],
        subject: Position,
        path_loss_exponent: f64,
        occlusion_db: f64,
    ) {
        for emitter in emitters {
            let model = PathLossModel::new(emitter.reference_tx_power_dbm, path_loss_exponent);
            let distance = emitter.position.distance_to(&subject);
            let rssi = model.expected_rssi(distance) - occlusion_db;
            self.add_reading(emitter.kind, emitter.id.clone(), rssi);
        }
    }

    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.bluetooth.clear();
        state.wifi.clear();
    }

    /// Make scans of `kind` report [`ScanError::Unsupported`]
    pub fn set_unsupported(&self, kind: SourceKind) {
        self.state.lock().unsupported.insert(kind);
    }

    /// Enable error simulation with given probability (0.0 to 1.0)
    pub fn simulate_errors(&self, enable: bool, probability: f32) {
        let mut state = self.state.lock();
        state.simulate_errors = enable;
        state.error_probability = probability.clamp(0.0, 1.0);
    }

    /// Simulate losing the radio adapter
    pub fn disconnect(&self) {
        self.state.lock().connected = false;
    }

    pub fn reconnect(&self) {
        self.state.lock().connected = true;
    }

    /// Number of scan calls answered so far, across both kinds
    pub fn scan_count(&self) -> u32 {
        self.state.lock().scan_count
    }

    async fn scan(&self, kind: SourceKind) -> ScanResult<Vec<SignalReading>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        state.scan_count += 1;

        if state.unsupported.contains(&kind) {
            return Err(ScanError::Unsupported(kind));
        }

        if !state.connected {
            return Err(ScanError::Failed {
                kind,
                reason: "adapter disconnected".to_string(),
            });
        }

        if state.simulate_errors && rand::thread_rng().gen::<f32>() < state.error_probability {
            return Err(ScanError::Failed {
                kind,
                reason: "simulated scan failure".to_string(),
            });
        }

        let now = current_time_ms();
        let readings = match kind {
            SourceKind::Bluetooth => &state.bluetooth,
            SourceKind::Wifi => &state.wifi,
        };
        Ok(readings
            .iter()
            .map(|r| SignalReading { timestamp_ms: now, ..r.clone() })
            .collect())
    }
}

#[async_trait]
impl ScanProvider for MockScanProvider {
    async fn scan_bluetooth(&self) -> ScanResult<Vec<SignalReading>> {
        self.scan(SourceKind::Bluetooth).await
    }

    async fn scan_wifi(&self) -> ScanResult<Vec<SignalReading>> {
        self.scan(SourceKind::Wifi).await
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_readings_split_by_kind() {
        let provider = MockScanProvider::new();
        provider.add_reading(SourceKind::Bluetooth, "beacon-1", -60.0);
        provider.add_reading(SourceKind::Wifi, "ap-1", -70.0);
        provider.add_reading(SourceKind::Wifi, "ap-2", -72.0);

        let bt = provider.scan_bluetooth().await.unwrap();
        let wifi = provider.scan_wifi().await.unwrap();
        assert_eq!(bt.len(), 1);
        assert_eq!(wifi.len(), 2);
        assert_eq!(bt[0].source_id, "beacon-1");
        assert_eq!(provider.scan_count(), 2);
    }

    #[tokio::test]
    async fn test_subject_readings_follow_path_loss() {
        let emitters = vec![
            EmitterReference::new("ap-1", SourceKind::Wifi, Position::new(1.0, 0.0, 0.0)),
            EmitterReference::new("ap-2", SourceKind::Wifi, Position::new(0.0, 0.0, 10.0)),
        ];
        let provider = MockScanProvider::new();
        provider.add_subject(&emitters, Position::default(), 2.4, 0.0);

        let wifi = provider.scan_wifi().await.unwrap();
        assert_eq!(wifi.len(), 2);
        assert!((wifi[0].rssi_dbm - -59.0).abs() < 1e-9);
        assert!((wifi[1].rssi_dbm - -83.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_connection_simulation() {
        let provider = MockScanProvider::new();
        provider.disconnect();
        assert!(matches!(provider.scan_wifi().await, Err(ScanError::Failed { .. })));

        provider.reconnect();
        assert_eq!(provider.scan_wifi().await.unwrap(), Vec::new());
    }

    #[tokio::test]
    async fn test_unsupported_kind() {
        let provider = MockScanProvider::new();
        provider.set_unsupported(SourceKind::Bluetooth);
        assert_eq!(
            provider.scan_bluetooth().await,
            Err(ScanError::Unsupported(SourceKind::Bluetooth))
        );
        assert!(provider.scan_wifi().await.is_ok());
    }

    #[tokio::test]
    async fn test_error_simulation() {
        let provider = MockScanProvider::new();
        provider.simulate_errors(true, 1.0);
        assert!(provider.scan_bluetooth().await.is_err());
    }
}
