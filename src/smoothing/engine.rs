use super::history::HistoryBuffer;
use super::shared::SharedEmotion;
use crate::emotion::{round2, ClassificationResult, EmotionLabel, SmoothedState};
use tracing::{debug, trace};

/// Temporal smoothing over recent classifications.
///
/// Keeps a bounded history, computes a majority-vote label once the
/// history reaches `quorum`, and reports a change only when that label
/// differs from the one it last published.
#[derive(Debug)]
pub struct SmoothingEngine {
    history: HistoryBuffer,
    quorum: usize,
    last_published: Option<EmotionLabel>,
    shared: SharedEmotion,
}

impl SmoothingEngine {
    /// Create an engine writing into `shared`
    ///
    /// # Panics
    /// Panics if `capacity` is zero or `quorum` is outside `1..=capacity`;
    /// configuration validation rejects both before an engine is built.
    pub fn new(capacity: usize, quorum: usize, shared: SharedEmotion) -> Self {
        assert!(
            quorum > 0 && quorum <= capacity,
            "Smoothing quorum must be between 1 and the history capacity"
        );

        Self {
            history: HistoryBuffer::new(capacity),
            quorum,
            last_published: None,
            shared,
        }
    }

    /// Fold one tick's classification into the history.
    ///
    /// `None` means no face was detected; history and published state stay
    /// as they are. Returns the new state only when the smoothed label
    /// changed.
    pub fn record(&mut self, result: Option<ClassificationResult>) -> Option<SmoothedState> {
        let result = match result {
            Some(result) => result,
            None => {
                trace!("No face this tick, smoothing state unchanged");
                return None;
            }
        };

        trace!(
            "Recording {} ({:.2}%), history {}/{}",
            result.label,
            result.confidence,
            self.history.len(),
            self.history.capacity()
        );
        self.history.push(result);

        if self.history.len() < self.quorum {
            return None;
        }

        let label = self.history.majority_label()?.clone();
        let confidence = round2(self.history.mean_confidence(&label).unwrap_or(0.0));
        let state = SmoothedState::new(label, confidence);

        self.shared.publish(state.clone());

        if self.last_published.as_ref() == Some(&state.label) {
            return None;
        }

        debug!(
            "Smoothed emotion changed: {} -> {} ({:.2}%)",
            self.last_published
                .as_ref()
                .map(EmotionLabel::as_str)
                .unwrap_or("none"),
            state.label,
            state.confidence
        );
        self.last_published = Some(state.label.clone());
        Some(state)
    }

    /// Last published smoothed state
    pub fn current(&self) -> SmoothedState {
        self.shared.get()
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn capacity(&self) -> usize {
        self.history.capacity()
    }

    pub fn quorum(&self) -> usize {
        self.quorum
    }
}
