use super::state::LightState;
use crate::config::{LightConfig, LightSinkKind};
use crate::error::LightError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Destination for light changes
#[async_trait]
pub trait LightSink: Send + Sync {
    /// Drive the light to `state`
    async fn apply(&self, state: &LightState) -> Result<(), LightError>;

    /// Last state successfully applied, if any
    fn current_state(&self) -> Option<LightState>;

    fn name(&self) -> &str;
}

/// Build the sink selected in configuration
pub fn create_light_sink(config: &LightConfig) -> Arc<dyn LightSink> {
    match config.sink {
        LightSinkKind::Console => Arc::new(ConsoleLightSink::new()),
    }
}

/// Sink that logs light changes instead of driving hardware
#[derive(Debug, Default)]
pub struct ConsoleLightSink {
    current: Mutex<Option<LightState>>,
}

impl ConsoleLightSink {
    pub fn new() -> Self {
        info!("Light controller initialized (console mode)");
        Self::default()
    }
}

#[async_trait]
impl LightSink for ConsoleLightSink {
    async fn apply(&self, state: &LightState) -> Result<(), LightError> {
        let color = state.color();
        let (r, g, b) = color.scaled_rgb(state.brightness());
        let (h, s, v) = color.hsv();

        info!(
            "[LIGHT] color={} brightness={}% transition={}s rgb=({},{},{}) hsv=({:.0},{:.0},{:.0})",
            color,
            state.brightness(),
            state.transition_speed(),
            r,
            g,
            b,
            h,
            s,
            v
        );

        *self.current.lock() = Some(state.clone());
        Ok(())
    }

    fn current_state(&self) -> Option<LightState> {
        self.current.lock().clone()
    }

    fn name(&self) -> &str {
        "console"
    }
}
