use crate::classifier::{Detection, EmotionClassifier};
use crate::emotion::{EmotionLabel, SmoothedState};
use crate::events::{EventBus, LightSource, MoodEvent};
use crate::light::{LightSink, MappingTable};
use crate::smoothing::SmoothingEngine;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, trace};

/// What happened during one sampling tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A face was classified; the smoothed label did not change
    Detected(EmotionLabel),
    /// The smoothed label changed and the mapping was dispatched
    Changed(SmoothedState),
    /// No face in the frame
    NoFace,
    /// Capture or classification failed; the tick was skipped
    Failed(String),
}

/// One tick's worth of work: classify, smooth, and drive the light.
///
/// Owned by the sampling loop; a new pipeline (and smoothing history) is
/// built for every detection session.
pub struct DetectionPipeline {
    classifier: Arc<dyn EmotionClassifier>,
    engine: SmoothingEngine,
    mappings: Arc<MappingTable>,
    light: Arc<dyn LightSink>,
    event_bus: Arc<EventBus>,
}

impl DetectionPipeline {
    pub fn new(
        classifier: Arc<dyn EmotionClassifier>,
        engine: SmoothingEngine,
        mappings: Arc<MappingTable>,
        light: Arc<dyn LightSink>,
        event_bus: Arc<EventBus>,
    ) -> Self {
        Self {
            classifier,
            engine,
            mappings,
            light,
            event_bus,
        }
    }

    /// Run a single tick.
    ///
    /// Classifier errors are reported as [`TickOutcome::Failed`] and never
    /// propagate; the caller simply waits for the next tick.
    pub async fn tick(&mut self) -> TickOutcome {
        match self.classifier.classify().await {
            Ok(Detection::NoFace) => {
                self.engine.record(None);
                TickOutcome::NoFace
            }
            Ok(Detection::Face(result)) => {
                let label = result.label.clone();
                trace!("Classified {} ({:.2}%)", label, result.confidence);

                match self.engine.record(Some(result)) {
                    Some(state) => {
                        self.dispatch(&state).await;
                        TickOutcome::Changed(state)
                    }
                    None => TickOutcome::Detected(label),
                }
            }
            Err(e) => {
                let _ = self.event_bus.publish(MoodEvent::TickFailed {
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                TickOutcome::Failed(e.to_string())
            }
        }
    }

    pub fn engine(&self) -> &SmoothingEngine {
        &self.engine
    }

    /// Publish the change and push the mapped light, if any
    async fn dispatch(&self, state: &SmoothedState) {
        let _ = self.event_bus.publish(MoodEvent::EmotionChanged {
            state: state.clone(),
        });

        let light_state = match self.mappings.get(&state.label) {
            Some(light_state) => light_state,
            None => {
                debug!("No light mapping for {}, leaving light unchanged", state.label);
                return;
            }
        };

        match self.light.apply(&light_state).await {
            Ok(()) => {
                let _ = self.event_bus.publish(MoodEvent::LightApplied {
                    color: light_state.color().to_string(),
                    brightness: light_state.brightness(),
                    source: LightSource::Mapping,
                    emotion: Some(state.label.clone()),
                    timestamp: Utc::now(),
                });
            }
            Err(e) => {
                error!(
                    "Failed to apply light for {} via {} sink: {}",
                    state.label,
                    self.light.name(),
                    e
                );
            }
        }
    }
}
