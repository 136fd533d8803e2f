use super::types::{ComponentState, ShutdownReason};
use crate::api::{ApiServer, ApiServerBuilder};
use crate::classifier::{create_classifier, EmotionClassifier};
use crate::config::MoodlightConfig;
use crate::error::Result;
use crate::events::EventBus;
use crate::light::{create_light_sink, LightSink, MappingTable};
use crate::session::{DetectionSession, DetectionSessionBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub(super) const SESSION_COMPONENT: &str = "session";
pub(super) const API_COMPONENT: &str = "api";
pub(super) const EVENT_LOG_COMPONENT: &str = "event_log";

/// Main application coordinator that wires the detection session to the
/// API server and owns process lifecycle
pub struct MoodlightOrchestrator {
    pub(super) config: MoodlightConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) session: Arc<DetectionSession>,
    pub(super) api_server: Option<ApiServer>,
    pub(super) auto_start: bool,

    // Background tasks
    pub(super) server_handle: Option<JoinHandle<Result<()>>>,
    pub(super) event_log_handle: Option<JoinHandle<()>>,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Arc<Mutex<Option<oneshot::Sender<ShutdownReason>>>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl MoodlightOrchestrator {
    /// Build every component from configuration
    pub fn new(config: MoodlightConfig) -> Result<Self> {
        let classifier = create_classifier(&config.classifier, &config.camera);
        let light = create_light_sink(&config.light);
        Self::with_components(config, classifier, light)
    }

    /// Build the orchestrator around an explicit classifier and light sink
    pub fn with_components(
        config: MoodlightConfig,
        classifier: Arc<dyn EmotionClassifier>,
        light: Arc<dyn LightSink>,
    ) -> Result<Self> {
        config.validate()?;

        let event_bus = Arc::new(EventBus::default());
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        info!(
            "Using {} classifier and {} light sink",
            classifier.name(),
            light.name()
        );

        let session = Arc::new(
            DetectionSessionBuilder::new()
                .config(config.detection.clone())
                .classifier(classifier)
                .mappings(Arc::new(MappingTable::with_defaults()))
                .light(light)
                .event_bus(Arc::clone(&event_bus))
                .build()?,
        );

        let api_server = ApiServerBuilder::new()
            .config(config.server.clone())
            .session(Arc::clone(&session))
            .build()?;

        Ok(Self {
            config,
            event_bus,
            session,
            api_server: Some(api_server),
            auto_start: false,
            server_handle: None,
            event_log_handle: None,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Arc::new(Mutex::new(Some(shutdown_sender))),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Begin detection as soon as the system starts
    pub fn set_auto_start(&mut self, enabled: bool) {
        self.auto_start = enabled;
    }

    pub fn session(&self) -> Arc<DetectionSession> {
        Arc::clone(&self.session)
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn config(&self) -> &MoodlightConfig {
        &self.config
    }
}
