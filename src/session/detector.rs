use super::pipeline::{DetectionPipeline, TickOutcome};
use super::state::SessionState;
use crate::classifier::EmotionClassifier;
use crate::config::DetectionConfig;
use crate::emotion::SmoothedState;
use crate::error::SessionError;
use crate::events::{EventBus, MoodEvent};
use crate::light::{LightSink, MappingTable};
use crate::smoothing::{SharedEmotion, SmoothingEngine};
use chrono::Utc;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

struct Worker {
    cancellation_token: CancellationToken,
    handle: JoinHandle<()>,
}

/// Single detection session owning the periodic sampling loop.
///
/// At most one loop runs at a time. `start` and `stop` are serialized, so
/// concurrent callers observe a clean `AlreadyRunning` / `NotRunning`.
pub struct DetectionSession {
    config: DetectionConfig,
    classifier: Arc<dyn EmotionClassifier>,
    mappings: Arc<MappingTable>,
    light: Arc<dyn LightSink>,
    emotion: SharedEmotion,
    event_bus: Arc<EventBus>,
    state: Arc<RwLock<SessionState>>,
    worker: Mutex<Option<Worker>>,
}

impl DetectionSession {
    pub(super) fn new(
        config: DetectionConfig,
        classifier: Arc<dyn EmotionClassifier>,
        mappings: Arc<MappingTable>,
        light: Arc<dyn LightSink>,
        emotion: SharedEmotion,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            config,
            classifier,
            mappings,
            light,
            emotion,
            event_bus,
            state: Arc::new(RwLock::new(SessionState::Idle)),
            worker: Mutex::new(None),
        }
    }

    /// Acquire the classifier and start sampling
    pub async fn start(&self) -> Result<(), SessionError> {
        let mut worker = self.worker.lock().await;
        if worker.is_some() {
            if self.is_running() {
                warn!("Detection start requested while already running");
                return Err(SessionError::AlreadyRunning);
            }
            debug!("Discarding sampling loop that ended on its own");
            worker.take();
        }

        info!(
            "Starting detection with {} classifier (tick {}ms, history {}, quorum {})",
            self.classifier.name(),
            self.config.tick_interval_ms,
            self.config.history_size,
            self.config.quorum
        );

        self.classifier.acquire().await.map_err(|e| {
            error!("Failed to acquire {} classifier: {}", self.classifier.name(), e);
            SessionError::AdapterUnavailable {
                details: e.to_string(),
            }
        })?;

        let pipeline = DetectionPipeline::new(
            Arc::clone(&self.classifier),
            SmoothingEngine::new(
                self.config.history_size,
                self.config.quorum,
                self.emotion.clone(),
            ),
            Arc::clone(&self.mappings),
            Arc::clone(&self.light),
            Arc::clone(&self.event_bus),
        );

        let cancellation_token = CancellationToken::new();
        let handle = tokio::spawn(supervise_sampling_loop(
            tokio::spawn(run_sampling_loop(
                pipeline,
                self.config.tick_interval(),
                cancellation_token.clone(),
            )),
            cancellation_token.clone(),
            Arc::clone(&self.classifier),
            Arc::clone(&self.state),
            Arc::clone(&self.event_bus),
        ));

        *worker = Some(Worker {
            cancellation_token,
            handle,
        });
        *self.state.write() = SessionState::Running;

        let _ = self.event_bus.publish(MoodEvent::DetectionStarted {
            timestamp: Utc::now(),
        });
        info!("Emotion detection started");
        Ok(())
    }

    /// Cancel the sampling loop and release the classifier
    pub async fn stop(&self) -> Result<(), SessionError> {
        let mut worker = self.worker.lock().await;
        let Worker {
            cancellation_token,
            handle,
        } = worker.take().ok_or_else(|| {
            warn!("Detection stop requested while not running");
            SessionError::NotRunning
        })?;

        if !self.is_running() {
            warn!("Detection stop requested after the sampling loop had already ended");
            return Err(SessionError::NotRunning);
        }

        info!("Stopping emotion detection");
        cancellation_token.cancel();

        if let Err(e) = handle.await {
            if e.is_panic() {
                error!("Sampling loop panicked: {}", e);
            }
        }

        self.classifier.release().await;
        *self.state.write() = SessionState::Idle;

        let _ = self.event_bus.publish(MoodEvent::DetectionStopped {
            timestamp: Utc::now(),
        });
        info!("Emotion detection stopped");
        Ok(())
    }

    /// Stop if running; used during shutdown
    pub async fn shutdown(&self) {
        match self.stop().await {
            Ok(()) | Err(SessionError::NotRunning) => {}
            Err(e) => error!("Error stopping detection during shutdown: {}", e),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    pub fn is_running(&self) -> bool {
        self.state() == SessionState::Running
    }

    /// Latest smoothed emotion (neutral default before any detection)
    pub fn current_emotion(&self) -> SmoothedState {
        self.emotion.get()
    }

    pub fn shared_emotion(&self) -> SharedEmotion {
        self.emotion.clone()
    }

    pub fn mappings(&self) -> Arc<MappingTable> {
        Arc::clone(&self.mappings)
    }

    pub fn light(&self) -> Arc<dyn LightSink> {
        Arc::clone(&self.light)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }
}

/// Waits on the sampling loop. When it ends without being cancelled (a
/// panic in a sink, say) the session is returned to `Idle` here, since no
/// `stop` call will do it.
async fn supervise_sampling_loop(
    sampling: JoinHandle<()>,
    cancellation_token: CancellationToken,
    classifier: Arc<dyn EmotionClassifier>,
    state: Arc<RwLock<SessionState>>,
    event_bus: Arc<EventBus>,
) {
    let result = sampling.await;
    if cancellation_token.is_cancelled() {
        return;
    }

    match result {
        Err(e) if e.is_panic() => error!("Sampling loop panicked: {}", e),
        Err(e) => error!("Sampling loop aborted: {}", e),
        Ok(()) => error!("Sampling loop exited unexpectedly"),
    }

    classifier.release().await;
    let _ = event_bus.publish(MoodEvent::DetectionStopped {
        timestamp: Utc::now(),
    });
    // Last, so a caller that sees Idle finds the cleanup already done.
    *state.write() = SessionState::Idle;
}

/// Sampling loop: one pipeline tick per interval until cancelled.
///
/// A tick in flight when cancellation arrives is dropped and its result
/// discarded.
async fn run_sampling_loop(
    mut pipeline: DetectionPipeline,
    tick_interval: Duration,
    cancellation_token: CancellationToken,
) {
    info!("Sampling loop started");

    let mut ticker = interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut ticks = 0u64;
    let mut failures = 0u64;

    loop {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let outcome = tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                debug!("Discarding in-flight tick on cancellation");
                break;
            }
            outcome = pipeline.tick() => outcome,
        };

        ticks += 1;
        match outcome {
            TickOutcome::Changed(state) => {
                debug!("Tick {}: smoothed emotion now {}", ticks, state.label);
            }
            TickOutcome::Detected(label) => {
                trace!(
                    "Tick {}: detected {} (history {})",
                    ticks,
                    label,
                    pipeline.engine().history_len()
                );
            }
            TickOutcome::NoFace => {
                trace!("Tick {}: no face detected", ticks);
            }
            TickOutcome::Failed(error) => {
                failures += 1;
                warn!("Tick {} skipped: {}", ticks, error);
            }
        }
    }

    info!(
        "Sampling loop ended after {} ticks ({} failed)",
        ticks, failures
    );
}
