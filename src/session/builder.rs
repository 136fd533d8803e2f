use super::detector::DetectionSession;
use crate::classifier::EmotionClassifier;
use crate::config::DetectionConfig;
use crate::error::{MoodlightError, Result};
use crate::events::EventBus;
use crate::light::{LightSink, MappingTable};
use crate::smoothing::SharedEmotion;
use std::sync::Arc;

/// Builder for [`DetectionSession`]
pub struct DetectionSessionBuilder {
    config: Option<DetectionConfig>,
    classifier: Option<Arc<dyn EmotionClassifier>>,
    mappings: Option<Arc<MappingTable>>,
    light: Option<Arc<dyn LightSink>>,
    emotion: Option<SharedEmotion>,
    event_bus: Option<Arc<EventBus>>,
}

impl DetectionSessionBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            classifier: None,
            mappings: None,
            light: None,
            emotion: None,
            event_bus: None,
        }
    }

    pub fn config(mut self, config: DetectionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn classifier(mut self, classifier: Arc<dyn EmotionClassifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn mappings(mut self, mappings: Arc<MappingTable>) -> Self {
        self.mappings = Some(mappings);
        self
    }

    pub fn light(mut self, light: Arc<dyn LightSink>) -> Self {
        self.light = Some(light);
        self
    }

    /// Share an existing emotion holder (a fresh one is created otherwise)
    pub fn emotion(mut self, emotion: SharedEmotion) -> Self {
        self.emotion = Some(emotion);
        self
    }

    pub fn event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    pub fn build(self) -> Result<DetectionSession> {
        let config = self
            .config
            .ok_or_else(|| MoodlightError::system("Detection configuration is required"))?;

        if config.history_size == 0 || config.quorum == 0 || config.quorum > config.history_size
        {
            return Err(MoodlightError::system(format!(
                "Invalid smoothing window: quorum {} with history {}",
                config.quorum, config.history_size
            )));
        }

        if config.tick_interval_ms == 0 {
            return Err(MoodlightError::system("Tick interval must be greater than 0"));
        }

        let classifier = self
            .classifier
            .ok_or_else(|| MoodlightError::system("Emotion classifier is required"))?;
        let light = self
            .light
            .ok_or_else(|| MoodlightError::system("Light sink is required"))?;

        Ok(DetectionSession::new(
            config,
            classifier,
            self.mappings
                .unwrap_or_else(|| Arc::new(MappingTable::with_defaults())),
            light,
            self.emotion.unwrap_or_default(),
            self.event_bus.unwrap_or_default(),
        ))
    }
}

impl Default for DetectionSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
