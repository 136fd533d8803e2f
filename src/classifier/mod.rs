mod adapter;
mod mock;
mod process;
mod simulated;
#[cfg(test)]
mod tests;

pub use adapter::{Detection, EmotionClassifier};
pub use mock::ScriptedClassifier;
pub use process::{parse_helper_output, ProcessClassifier};
pub use simulated::SimulatedClassifier;

use crate::config::{CameraConfig, ClassifierBackend, ClassifierConfig};
use std::sync::Arc;

/// Build the classifier selected in configuration
pub fn create_classifier(
    config: &ClassifierConfig,
    camera: &CameraConfig,
) -> Arc<dyn EmotionClassifier> {
    match config.backend {
        ClassifierBackend::Simulated => Arc::new(SimulatedClassifier::new(config.seed)),
        ClassifierBackend::Process => {
            Arc::new(ProcessClassifier::new(config.clone(), camera.clone()))
        }
    }
}
