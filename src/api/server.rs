use crate::{
    config::ServerConfig,
    error::{MoodlightError, Result, ServerError},
    events::EventBus,
    light::{LightSink, MappingTable},
    session::DetectionSession,
    smoothing::SharedEmotion,
};
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers::{
    control_light_handler, current_emotion_handler, get_mappings_handler, health_handler,
    light_state_handler, root_handler, start_detection_handler, status_handler,
    stop_detection_handler, update_mapping_handler, update_mappings_handler,
};
use super::websocket::emotion_ws_handler;

/// Shared state for the Axum server
#[derive(Clone)]
pub struct AppState {
    pub(crate) session: Arc<DetectionSession>,
    pub(crate) mappings: Arc<MappingTable>,
    pub(crate) light: Arc<dyn LightSink>,
    pub(crate) emotion: SharedEmotion,
    pub(crate) event_bus: Arc<EventBus>,
    pub(crate) ws_push_interval: Duration,
}

impl AppState {
    /// Derive handler state from a session; mappings, light and emotion are
    /// the same instances the sampling loop uses.
    pub fn new(session: Arc<DetectionSession>, ws_push_interval: Duration) -> Self {
        Self {
            mappings: session.mappings(),
            light: session.light(),
            emotion: session.shared_emotion(),
            event_bus: session.event_bus(),
            session,
            ws_push_interval,
        }
    }
}

/// Build the full router: `/`, `/health`, `/ws/emotions` and the `/api` tree
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/status", get(status_handler))
        .route("/start-detection", post(start_detection_handler))
        .route("/stop-detection", post(stop_detection_handler))
        .route("/current-emotion", get(current_emotion_handler))
        .route(
            "/mappings",
            get(get_mappings_handler).post(update_mappings_handler),
        )
        .route("/mappings/:emotion", post(update_mapping_handler))
        .route("/control-light", post(control_light_handler))
        .route("/light-state", get(light_state_handler));

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/ws/emotions", get(emotion_ws_handler))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// HTTP and WebSocket front end for a detection session
pub struct ApiServer {
    pub(crate) config: ServerConfig,
    pub(crate) session: Arc<DetectionSession>,
}

impl ApiServer {
    pub fn new(config: ServerConfig, session: Arc<DetectionSession>) -> Self {
        Self { config, session }
    }

    pub fn router(&self) -> Router {
        let state = AppState::new(Arc::clone(&self.session), self.config.ws_push_interval());
        build_router(state, &self.config.cors_origins)
    }

    /// Bind and serve until `shutdown` is cancelled
    pub async fn start(&self, shutdown: CancellationToken) -> Result<()> {
        let addr = self.config.bind_address();

        info!("Starting API server on {}", addr);

        let listener =
            TcpListener::bind(&addr)
                .await
                .map_err(|e| ServerError::BindFailed {
                    address: addr.clone(),
                    source: e,
                })?;

        info!("API server listening on {}", addr);
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` is cancelled
    pub async fn serve(&self, listener: TcpListener, shutdown: CancellationToken) -> Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| ServerError::StartupFailed {
                details: format!("Server error: {}", e),
            })?;

        info!("API server stopped");
        Ok(())
    }
}

/// API server builder for configuration
pub struct ApiServerBuilder {
    config: Option<ServerConfig>,
    session: Option<Arc<DetectionSession>>,
}

impl ApiServerBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            session: None,
        }
    }

    /// Set the server configuration
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the detection session served by the API
    pub fn session(mut self, session: Arc<DetectionSession>) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> Result<ApiServer> {
        let config = self.config.ok_or_else(|| {
            MoodlightError::Server(ServerError::StartupFailed {
                details: "Server configuration is required".to_string(),
            })
        })?;

        let session = self.session.ok_or_else(|| {
            MoodlightError::Server(ServerError::StartupFailed {
                details: "Detection session is required".to_string(),
            })
        })?;

        if config.ws_push_interval_ms == 0 {
            return Err(MoodlightError::Server(ServerError::StartupFailed {
                details: "WebSocket push interval must be greater than 0".to_string(),
            }));
        }

        Ok(ApiServer::new(config, session))
    }
}

impl Default for ApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
