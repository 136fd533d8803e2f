use super::adapter::{Detection, EmotionClassifier};
use crate::emotion::{ClassificationResult, EmotionLabel};
use crate::error::ClassifierError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
enum ScriptStep {
    Face(ClassificationResult),
    NoFace,
    Fail(String),
}

/// Classifier that replays a scripted sequence of detections.
///
/// Once the script is exhausted every call reports no face.
#[derive(Debug, Default)]
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<ScriptStep>>,
    delay: Mutex<Option<Duration>>,
    fail_acquire: AtomicBool,
    acquired: AtomicBool,
    acquire_count: AtomicUsize,
    release_count: AtomicUsize,
    classify_count: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a face with the given dominant label
    pub fn push_face(&self, label: &str, confidence: f64) -> &Self {
        let label = EmotionLabel::new(label).unwrap_or_else(|_| EmotionLabel::neutral());
        self.script
            .lock()
            .push_back(ScriptStep::Face(ClassificationResult::new(label, confidence)));
        self
    }

    /// Script `count` identical faces
    pub fn push_faces(&self, label: &str, confidence: f64, count: usize) -> &Self {
        for _ in 0..count {
            self.push_face(label, confidence);
        }
        self
    }

    pub fn push_no_face(&self) -> &Self {
        self.script.lock().push_back(ScriptStep::NoFace);
        self
    }

    /// Script a capture failure
    pub fn push_error(&self, details: &str) -> &Self {
        self.script
            .lock()
            .push_back(ScriptStep::Fail(details.to_string()));
        self
    }

    /// Make `acquire` fail as if the device were busy
    pub fn set_fail_acquire(&self, fail: bool) {
        self.fail_acquire.store(fail, Ordering::SeqCst);
    }

    /// Delay every `classify` call
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn acquire_count(&self) -> usize {
        self.acquire_count.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::SeqCst)
    }

    pub fn classify_count(&self) -> usize {
        self.classify_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn acquire(&self) -> Result<(), ClassifierError> {
        self.acquire_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(ClassifierError::DeviceUnavailable {
                details: "scripted device busy".to_string(),
            });
        }
        self.acquired.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn classify(&self) -> Result<Detection, ClassifierError> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.classify_count.fetch_add(1, Ordering::SeqCst);
        let step = self.script.lock().pop_front();
        debug!("Scripted classifier step: {:?}", step);

        match step {
            Some(ScriptStep::Face(result)) => Ok(Detection::Face(result)),
            Some(ScriptStep::NoFace) | None => Ok(Detection::NoFace),
            Some(ScriptStep::Fail(details)) => Err(ClassifierError::CaptureFailed { details }),
        }
    }

    async fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
        self.acquired.store(false, Ordering::SeqCst);
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
