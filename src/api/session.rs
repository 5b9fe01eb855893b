//! Detection session
//!
//! Drives the scan → validate → estimate → publish cycle. A cycle is started
//! either by the interval tick of [`DetectionSession::start`] or by a manual
//! trigger, and at most one runs at a time. Results are published as
//! immutable [`DetectionSnapshot`]s through a `watch` channel.

use crate::algorithms::multilateration::{estimate_position, RangeObservation};
use crate::algorithms::path_loss::PathLossModel;
use crate::api::types::{CycleOutcome, DetectionSnapshot, SessionNotice, SessionState};
use crate::core::{
    DetectedPosition, Detection, DistanceEstimate, EmitterReference, SignalReading, SourceKind,
    MIN_RANGE_OBSERVATIONS,
};
use crate::hardware::ScanProvider;
use crate::processing::{ConfidenceScorer, SyntheticGenerator};
use crate::utils::config::{ConfigError, SessionConfig};
use crate::utils::current_time_ms;
use crate::validation::data::ReadingValidator;
use crate::validation::error::DetectionError;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

pub struct DetectionSession {
    config: Arc<SessionConfig>,
    emitters: Arc<[EmitterReference]>,
    provider: Arc<dyn ScanProvider>,
    validator: ReadingValidator,
    scorer: ConfidenceScorer,
    synthetic: Mutex<SyntheticGenerator>,
    in_flight: AtomicBool,
    cycle_counter: AtomicU64,
    state_tx: watch::Sender<SessionState>,
    snapshot_tx: watch::Sender<Arc<DetectionSnapshot>>,
}

/// Clears the in-flight flag even if the cycle future is dropped mid-scan
struct InFlightGuard<'a> {
    session: &'a DetectionSession,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.session.set_state(SessionState::Idle);
        self.session.in_flight.store(false, Ordering::Release);
    }
}

impl DetectionSession {
    pub fn new(config: Arc<SessionConfig>, provider: Arc<dyn ScanProvider>) -> Result<Self, ConfigError> {
        config.validate()?;

        let emitters: Arc<[EmitterReference]> = Arc::from(config.emitters.clone());
        let (state_tx, _) = watch::channel(SessionState::Idle);
        let (snapshot_tx, _) = watch::channel(Arc::new(DetectionSnapshot::initial(emitters.clone())));

        Ok(Self {
            validator: ReadingValidator::new(config.validation.clone()),
            scorer: ConfidenceScorer::new(config.path_loss_exponent, config.residual_scale_m, emitters.len()),
            synthetic: Mutex::new(SyntheticGenerator::new(config.synthetic.clone())),
            in_flight: AtomicBool::new(false),
            cycle_counter: AtomicU64::new(0),
            emitters,
            provider,
            config,
            state_tx,
            snapshot_tx,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn emitters(&self) -> &Arc<[EmitterReference]> {
        &self.emitters
    }

    pub fn state(&self) -> SessionState {
        *self.state_tx.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    /// Receiver for published snapshots; starts at the latest one
    pub fn subscribe(&self) -> watch::Receiver<Arc<DetectionSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn latest(&self) -> Arc<DetectionSnapshot> {
        self.snapshot_tx.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn set_state(&self, state: SessionState) {
        self.state_tx.send_replace(state);
    }

    /// Run one complete cycle.
    ///
    /// Returns [`CycleOutcome::Skipped`] without touching any state when a
    /// cycle is already in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("cycle already in flight, skipping");
            return CycleOutcome::Skipped;
        }
        let _guard = InFlightGuard { session: self };

        let cycle = self.cycle_counter.fetch_add(1, Ordering::Relaxed) + 1;
        let timestamp_ms = current_time_ms();

        self.set_state(SessionState::Scanning);
        let (readings, notices) = self.scan().await;

        self.set_state(SessionState::Estimating);
        let report = self.validator.validate_batch(readings, timestamp_ms);

        let detections = if report.accepted.is_empty() {
            if self.config.synthetic.enabled {
                debug!(cycle, "no usable readings, publishing synthetic detections");
                self.synthetic.lock().generate()
            } else {
                Vec::new()
            }
        } else {
            self.estimate(&report.accepted)
        };

        let snapshot = Arc::new(DetectionSnapshot {
            cycle,
            timestamp_ms,
            detections,
            emitters: self.emitters.clone(),
            notices,
        });

        self.set_state(SessionState::Published);
        self.snapshot_tx.send_replace(snapshot.clone());

        info!(
            cycle,
            detections = snapshot.len(),
            source = ?snapshot.source(),
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            "published detection snapshot"
        );

        CycleOutcome::Published(snapshot)
    }

    async fn scan(&self) -> (Vec<SignalReading>, Vec<SessionNotice>) {
        let (bluetooth, wifi) = tokio::join!(
            self.scan_source(SourceKind::Bluetooth),
            self.scan_source(SourceKind::Wifi)
        );

        let mut readings = Vec::new();
        let mut notices = Vec::new();
        for result in [bluetooth, wifi] {
            match result {
                Ok(batch) => readings.extend(batch),
                Err(err) => notices.push(SessionNotice::from(err)),
            }
        }
        (readings, notices)
    }

    async fn scan_source(&self, kind: SourceKind) -> Result<Vec<SignalReading>, DetectionError> {
        let timeout = self.config.scan_timeout();
        let call = match kind {
            SourceKind::Bluetooth => self.provider.scan_bluetooth(),
            SourceKind::Wifi => self.provider.scan_wifi(),
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(Ok(readings)) => {
                debug!(provider = self.provider.name(), %kind, count = readings.len(), "scan complete");
                Ok(readings
                    .into_iter()
                    .map(|reading| SignalReading { kind, ..reading })
                    .collect())
            }
            Ok(Err(err)) => {
                warn!(provider = self.provider.name(), %kind, error = %err, "scan failed");
                Err(err.into())
            }
            Err(_) => {
                warn!(provider = self.provider.name(), %kind, timeout_ms = self.config.scan_timeout_ms, "scan timed out");
                Err(DetectionError::ProviderTimeout {
                    kind,
                    timeout_ms: self.config.scan_timeout_ms,
                })
            }
        }
    }

    /// Turn validated readings into measured detections, one per sweep
    fn estimate(&self, readings: &[SignalReading]) -> Vec<DetectedPosition> {
        let mut by_emitter: HashMap<&str, Vec<&SignalReading>> = HashMap::new();
        let mut unmatched = 0usize;
        for reading in readings {
            if self.config.emitter(&reading.source_id).is_some() {
                by_emitter.entry(reading.source_id.as_str()).or_default().push(reading);
            } else {
                unmatched += 1;
            }
        }
        if unmatched > 0 {
            debug!(unmatched, "readings from unknown sources ignored");
        }

        // most recent first; ties keep provider order
        for group in by_emitter.values_mut() {
            group.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        }

        let candidates = self.candidate_count(readings);
        let mut detections = Vec::with_capacity(candidates);

        for sweep in 0..candidates {
            let estimates = self.sweep_estimates(&by_emitter, sweep);
            let observations: Vec<RangeObservation> = estimates
                .iter()
                .map(|e| RangeObservation::new(e.emitter.position, e.distance_m))
                .collect();

            let Some(position) = estimate_position(&observations) else {
                let err = DetectionError::InsufficientReadings {
                    available: observations.len(),
                    required: MIN_RANGE_OBSERVATIONS,
                };
                debug!(sweep, error = %err, "dropping candidate");
                continue;
            };

            let score = self.scorer.score(&position, &estimates);
            debug!(
                sweep,
                %position,
                confidence = score.confidence,
                residual_rms_m = score.residual_rms_m,
                "candidate estimated"
            );

            detections.push(DetectedPosition::Real(Detection {
                id: sweep as u32 + 1,
                position,
                confidence: score.confidence,
                signal_strength_reduction: score.signal_strength_reduction,
            }));
        }

        detections
    }

    /// Distinct Bluetooth sources observed, clamped to `[1, max_candidates]`
    fn candidate_count(&self, readings: &[SignalReading]) -> usize {
        let bluetooth: HashSet<&str> = readings
            .iter()
            .filter(|r| r.kind == SourceKind::Bluetooth)
            .map(|r| r.source_id.as_str())
            .collect();
        bluetooth.len().clamp(1, self.config.max_candidates)
    }

    fn sweep_estimates(&self, by_emitter: &HashMap<&str, Vec<&SignalReading>>, sweep: usize) -> Vec<DistanceEstimate> {
        self.emitters
            .iter()
            .filter_map(|emitter| {
                let reading = by_emitter.get(emitter.id.as_str())?.get(sweep)?;
                let model = PathLossModel::new(emitter.reference_tx_power_dbm, self.config.path_loss_exponent);
                match model.distance(reading.rssi_dbm) {
                    Ok(distance) => Some(DistanceEstimate {
                        emitter: emitter.clone(),
                        distance_m: self.config.distance_clamp.apply(distance),
                        rssi_dbm: reading.rssi_dbm,
                    }),
                    Err(err) => {
                        debug!(emitter = %emitter.id, error = %err, "discarding reading");
                        None
                    }
                }
            })
            .collect()
    }

    /// Spawn the interval/trigger loop on the current tokio runtime
    pub fn start(self: Arc<Self>) -> SessionHandle {
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(trigger_rx, shutdown_rx));

        SessionHandle {
            trigger_tx,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    async fn run(self: Arc<Self>, mut triggers: mpsc::Receiver<()>, mut shutdown: oneshot::Receiver<()>) {
        let mut interval = tokio::time::interval(self.config.cycle_interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                _ = interval.tick() => {}
                Some(()) = triggers.recv() => debug!("manual trigger"),
            }

            // awaited inline: neither a tick nor a trigger can cancel a cycle
            self.run_cycle().await;
        }

        debug!("detection loop stopped");
    }
}

/// Control handle for a running detection loop
///
/// Dropping the handle stops the loop after the current cycle.
pub struct SessionHandle {
    trigger_tx: mpsc::Sender<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    /// Request a cycle now. Returns false if a trigger is already queued.
    pub fn trigger(&self) -> bool {
        self.trigger_tx.try_send(()).is_ok()
    }

    /// Stop the loop and wait for the in-flight cycle to finish
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!(error = %err, "detection loop ended abnormally");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Wait up to `timeout` for the next snapshot after the one currently seen
pub async fn next_snapshot(
    rx: &mut watch::Receiver<Arc<DetectionSnapshot>>,
    timeout: Duration,
) -> Option<Arc<DetectionSnapshot>> {
    match tokio::time::timeout(timeout, rx.changed()).await {
        Ok(Ok(())) => Some(rx.borrow_and_update().clone()),
        _ => None,
    }
}
