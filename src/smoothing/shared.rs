use crate::emotion::SmoothedState;
use parking_lot::RwLock;
use std::sync::Arc;

/// Process-wide holder of the latest smoothed emotion.
///
/// Written by the smoothing engine, read by API handlers and WebSocket
/// clients. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct SharedEmotion {
    inner: Arc<RwLock<SmoothedState>>,
}

impl SharedEmotion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current value
    pub fn get(&self) -> SmoothedState {
        self.inner.read().clone()
    }

    pub(crate) fn publish(&self, state: SmoothedState) {
        *self.inner.write() = state;
    }
}
