use super::orchestrator::{API_COMPONENT, EVENT_LOG_COMPONENT, SESSION_COMPONENT};
use super::{ComponentState, MoodlightOrchestrator};
use crate::error::{MoodlightError, Result};
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

const SESSION_STOP_TIMEOUT: Duration = Duration::from_secs(10);
const SERVER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);
const EVENT_LOG_STOP_TIMEOUT: Duration = Duration::from_secs(2);

impl MoodlightOrchestrator {
    /// Perform graceful shutdown of all components
    pub async fn shutdown(&mut self) -> Result<i32> {
        info!("Beginning graceful shutdown");

        let mut exit_code = 0;

        // Detection stops before the server drains.
        if let Err(e) = self.stop_session().await {
            error!("Error stopping session: {}", e);
            exit_code = 1;
        }

        self.cancellation_token.cancel();

        if let Err(e) = self.stop_api().await {
            error!("Error stopping API server: {}", e);
            exit_code = 1;
        }

        if let Err(e) = self.stop_event_log().await {
            error!("Error stopping event log: {}", e);
            exit_code = 1;
        }

        info!("Graceful shutdown completed with exit code: {}", exit_code);
        Ok(exit_code)
    }

    async fn stop_session(&self) -> Result<()> {
        info!("Stopping {} component", SESSION_COMPONENT);
        self.set_component_state(SESSION_COMPONENT, ComponentState::Stopping)
            .await;

        match timeout(SESSION_STOP_TIMEOUT, self.session.shutdown()).await {
            Ok(()) => {
                self.set_component_state(SESSION_COMPONENT, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", SESSION_COMPONENT);
                Ok(())
            }
            Err(_) => {
                self.set_component_state(SESSION_COMPONENT, ComponentState::Failed)
                    .await;
                Err(MoodlightError::system(format!(
                    "{} component stop timeout",
                    SESSION_COMPONENT
                )))
            }
        }
    }

    async fn stop_api(&mut self) -> Result<()> {
        info!("Stopping {} component", API_COMPONENT);

        let Some(handle) = self.server_handle.take() else {
            self.set_component_state(API_COMPONENT, ComponentState::Stopped)
                .await;
            return Ok(());
        };

        self.set_component_state(API_COMPONENT, ComponentState::Stopping)
            .await;

        match timeout(SERVER_DRAIN_TIMEOUT, handle).await {
            Ok(Ok(Ok(()))) => {
                self.set_component_state(API_COMPONENT, ComponentState::Stopped)
                    .await;
                info!("{} component stopped", API_COMPONENT);
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                self.set_component_state(API_COMPONENT, ComponentState::Failed)
                    .await;
                Err(e)
            }
            Ok(Err(e)) => {
                self.set_component_state(API_COMPONENT, ComponentState::Failed)
                    .await;
                Err(MoodlightError::system(format!("API server task failed: {}", e)))
            }
            Err(_) => {
                self.set_component_state(API_COMPONENT, ComponentState::Failed)
                    .await;
                Err(MoodlightError::system(format!(
                    "{} component stop timeout",
                    API_COMPONENT
                )))
            }
        }
    }

    async fn stop_event_log(&mut self) -> Result<()> {
        if let Some(handle) = self.event_log_handle.take() {
            if timeout(EVENT_LOG_STOP_TIMEOUT, handle).await.is_err() {
                self.set_component_state(EVENT_LOG_COMPONENT, ComponentState::Failed)
                    .await;
                return Err(MoodlightError::system(format!(
                    "{} component stop timeout",
                    EVENT_LOG_COMPONENT
                )));
            }
        }

        self.set_component_state(EVENT_LOG_COMPONENT, ComponentState::Stopped)
            .await;
        Ok(())
    }
}
