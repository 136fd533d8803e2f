use super::sink::LightSink;
use super::state::LightState;
use crate::error::LightError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Light sink that records every applied state, for tests and dry runs
#[derive(Debug, Default)]
pub struct RecordingLightSink {
    applied: Mutex<Vec<LightState>>,
    failing: AtomicBool,
}

impl RecordingLightSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `apply` calls fail
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every state applied so far, oldest first
    pub fn applied(&self) -> Vec<LightState> {
        self.applied.lock().clone()
    }

    pub fn apply_count(&self) -> usize {
        self.applied.lock().len()
    }
}

#[async_trait]
impl LightSink for RecordingLightSink {
    async fn apply(&self, state: &LightState) -> Result<(), LightError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LightError::ApplyFailed {
                details: "recording sink set to fail".to_string(),
            });
        }

        debug!("Recorded light state {}", state.color());
        self.applied.lock().push(state.clone());
        Ok(())
    }

    fn current_state(&self) -> Option<LightState> {
        self.applied.lock().last().cloned()
    }

    fn name(&self) -> &str {
        "recording"
    }
}
