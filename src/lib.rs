pub mod classifier;
pub mod config;
pub mod emotion;
pub mod error;
pub mod events;
pub mod light;
pub mod session;
pub mod smoothing;

#[cfg(feature = "server")]
pub mod api;
#[cfg(feature = "server")]
pub mod app;

pub use classifier::{create_classifier, Detection, EmotionClassifier};
pub use config::MoodlightConfig;
pub use emotion::{ClassificationResult, EmotionLabel, SmoothedState};
pub use error::{MoodlightError, Result};
pub use events::{EventBus, LightSource, MoodEvent};
pub use light::{create_light_sink, HexColor, LightSink, LightSpec, LightState, MappingTable};
pub use session::{DetectionSession, DetectionSessionBuilder, SessionState};
pub use smoothing::{SharedEmotion, SmoothingEngine};

#[cfg(feature = "server")]
pub use api::{ApiServer, ApiServerBuilder};
#[cfg(feature = "server")]
pub use app::{ComponentState, MoodlightOrchestrator, ShutdownReason};
