use super::orchestrator::{API_COMPONENT, EVENT_LOG_COMPONENT, SESSION_COMPONENT};
use super::{ComponentState, MoodlightOrchestrator};
use crate::error::{MoodlightError, Result};
use crate::events::EventBus;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

impl MoodlightOrchestrator {
    /// Register all system components
    pub async fn initialize(&mut self) -> Result<()> {
        info!("Initializing moodlight components");

        let mut states = self.component_states.lock().await;
        states.insert(EVENT_LOG_COMPONENT.to_string(), ComponentState::Stopped);
        states.insert(API_COMPONENT.to_string(), ComponentState::Stopped);
        states.insert(SESSION_COMPONENT.to_string(), ComponentState::Stopped);
        drop(states);

        info!("All components initialized successfully");
        Ok(())
    }

    /// Start the event log and API server, and detection when auto-start
    /// is enabled
    pub async fn start(&mut self) -> Result<()> {
        info!("Starting moodlight system");

        let server = self.api_server.take().ok_or_else(|| {
            MoodlightError::system("API server already started")
        })?;

        self.set_component_state(EVENT_LOG_COMPONENT, ComponentState::Starting)
            .await;
        self.event_log_handle = Some(tokio::spawn(run_event_log(
            Arc::clone(&self.event_bus),
            self.cancellation_token.clone(),
        )));
        self.set_component_state(EVENT_LOG_COMPONENT, ComponentState::Running)
            .await;

        self.set_component_state(API_COMPONENT, ComponentState::Starting)
            .await;

        let token = self.cancellation_token.clone();
        let states = Arc::clone(&self.component_states);
        self.server_handle = Some(tokio::spawn(async move {
            let result = server.start(token).await;
            if let Err(e) = &result {
                error!("API server error: {}", e);
                states
                    .lock()
                    .await
                    .insert(API_COMPONENT.to_string(), ComponentState::Failed);
            }
            result
        }));

        self.set_component_state(API_COMPONENT, ComponentState::Running)
            .await;
        info!(
            "API server started on {}",
            self.config.server.bind_address()
        );

        if self.auto_start {
            self.set_component_state(SESSION_COMPONENT, ComponentState::Starting)
                .await;

            match self.session.start().await {
                Ok(()) => {
                    self.set_component_state(SESSION_COMPONENT, ComponentState::Running)
                        .await;
                }
                Err(e) => {
                    // Detection can still be started later through the API.
                    warn!("Auto-start of detection failed: {}", e);
                    self.set_component_state(SESSION_COMPONENT, ComponentState::Failed)
                        .await;
                }
            }
        }

        info!("Moodlight system started successfully");
        Ok(())
    }
}

/// Mirror bus traffic into the log until cancelled
async fn run_event_log(event_bus: Arc<EventBus>, cancellation_token: CancellationToken) {
    let mut receiver = event_bus.subscribe();

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            event = receiver.recv() => match event {
                Ok(event) => debug!("[{}] {}", event.event_type(), event.description()),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event log lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    debug!("Event log stopped");
}
