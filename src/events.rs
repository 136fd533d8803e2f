use crate::emotion::{EmotionLabel, SmoothedState};
use crate::error::EventBusError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Where a light change originated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightSource {
    /// Resolved from the mapping table after an emotion change
    Mapping,
    /// Pushed directly through the control endpoint
    Manual,
}

/// Events that can occur in the moodlight system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MoodEvent {
    /// The sampling loop started
    DetectionStarted { timestamp: DateTime<Utc> },
    /// The sampling loop stopped
    DetectionStopped { timestamp: DateTime<Utc> },
    /// The smoothed emotion label changed
    EmotionChanged { state: SmoothedState },
    /// A light state was applied to the sink
    LightApplied {
        color: String,
        brightness: u8,
        source: LightSource,
        emotion: Option<EmotionLabel>,
        timestamp: DateTime<Utc>,
    },
    /// A sampling tick failed and was skipped
    TickFailed { error: String, timestamp: DateTime<Utc> },
    /// System shutdown requested
    ShutdownRequested {
        reason: String,
        timestamp: DateTime<Utc>,
    },
}

impl MoodEvent {
    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MoodEvent::DetectionStarted { timestamp } => *timestamp,
            MoodEvent::DetectionStopped { timestamp } => *timestamp,
            MoodEvent::EmotionChanged { state } => state.timestamp.unwrap_or_else(Utc::now),
            MoodEvent::LightApplied { timestamp, .. } => *timestamp,
            MoodEvent::TickFailed { timestamp, .. } => *timestamp,
            MoodEvent::ShutdownRequested { timestamp, .. } => *timestamp,
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            MoodEvent::DetectionStarted { .. } => "Detection started".to_string(),
            MoodEvent::DetectionStopped { .. } => "Detection stopped".to_string(),
            MoodEvent::EmotionChanged { state } => {
                format!(
                    "Emotion changed to {} ({:.2}%)",
                    state.label, state.confidence
                )
            }
            MoodEvent::LightApplied {
                color,
                brightness,
                source,
                ..
            } => {
                format!(
                    "Light set to {} at {}% ({:?})",
                    color, brightness, source
                )
            }
            MoodEvent::TickFailed { error, .. } => format!("Tick failed: {}", error),
            MoodEvent::ShutdownRequested { reason, .. } => {
                format!("Shutdown requested: {}", reason)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            MoodEvent::DetectionStarted { .. } => "detection_started",
            MoodEvent::DetectionStopped { .. } => "detection_stopped",
            MoodEvent::EmotionChanged { .. } => "emotion_changed",
            MoodEvent::LightApplied { .. } => "light_applied",
            MoodEvent::TickFailed { .. } => "tick_failed",
            MoodEvent::ShutdownRequested { .. } => "shutdown_requested",
        }
    }
}

/// Async event bus for component coordination using broadcast channels
pub struct EventBus {
    sender: broadcast::Sender<MoodEvent>,
    debug_logging: bool,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: false,
        }
    }

    /// Create a new event bus with debug logging enabled
    pub fn with_debug_logging(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            debug_logging: true,
        }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<MoodEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    ///
    /// Fails when nobody is subscribed; callers that only notify may ignore
    /// the error.
    pub fn publish(&self, event: MoodEvent) -> Result<usize, EventBusError> {
        match &event {
            MoodEvent::EmotionChanged { state } => {
                info!(
                    "Emotion changed to {} ({:.2}%)",
                    state.label, state.confidence
                );
            }
            MoodEvent::TickFailed { error, .. } => {
                warn!("Detection tick failed: {}", error);
            }
            MoodEvent::ShutdownRequested { reason, .. } => {
                info!("Shutdown requested: {}", reason);
            }
            _ => {
                if self.debug_logging {
                    debug!("Event: {}", event.description());
                }
            }
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            debug_logging: self.debug_logging,
        }
    }
}
