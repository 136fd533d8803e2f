use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MoodlightConfig {
    pub camera: CameraConfig,
    pub classifier: ClassifierConfig,
    pub detection: DetectionConfig,
    pub server: ServerConfig,
    pub light: LightConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Capture resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Capture frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,
}

/// Which classifier implementation feeds the detection loop
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierBackend {
    /// Seeded pseudo-random emotions, no camera required
    Simulated,
    /// External helper process invoked once per tick
    Process,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_backend")]
    pub backend: ClassifierBackend,

    /// Helper executable for the process backend
    #[serde(default)]
    pub command: Option<String>,

    /// Extra arguments passed to the helper
    #[serde(default)]
    pub args: Vec<String>,

    /// Per-call timeout in milliseconds (0 disables the timeout)
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,

    /// Require /dev/video{index} to exist before detection starts
    #[serde(default = "default_require_device")]
    pub require_device: bool,

    /// Seed for the simulated backend
    #[serde(default = "default_classifier_seed")]
    pub seed: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DetectionConfig {
    /// Interval between sampling ticks
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Number of classifications kept for smoothing
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Minimum history length before a smoothed emotion is computed
    #[serde(default = "default_quorum")]
    pub quorum: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind to
    #[serde(default = "default_server_ip")]
    pub ip: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Interval between WebSocket pushes of the current emotion
    #[serde(default = "default_ws_push_interval_ms")]
    pub ws_push_interval_ms: u64,

    /// Origins allowed by CORS (frontend dev servers)
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LightSinkKind {
    /// Log each light change instead of driving hardware
    Console,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LightConfig {
    #[serde(default = "default_light_sink")]
    pub sink: LightSinkKind,
}

impl DetectionConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl ServerConfig {
    pub fn ws_push_interval(&self) -> Duration {
        Duration::from_millis(self.ws_push_interval_ms)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_ms > 0).then(|| Duration::from_millis(self.timeout_ms))
    }
}

impl MoodlightConfig {
    /// Load configuration from default sources (file + environment variables)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_file("moodlight.toml")
    }

    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("classifier.backend", "simulated")?
            .set_default("classifier.args", Vec::<String>::new())?
            .set_default(
                "classifier.timeout_ms",
                default_classifier_timeout_ms() as i64,
            )?
            .set_default("classifier.require_device", default_require_device())?
            .set_default("classifier.seed", default_classifier_seed() as i64)?
            .set_default(
                "detection.tick_interval_ms",
                default_tick_interval_ms() as i64,
            )?
            .set_default("detection.history_size", default_history_size() as i64)?
            .set_default("detection.quorum", default_quorum() as i64)?
            .set_default("server.ip", default_server_ip())?
            .set_default("server.port", default_server_port())?
            .set_default(
                "server.ws_push_interval_ms",
                default_ws_push_interval_ms() as i64,
            )?
            .set_default("server.cors_origins", default_cors_origins())?
            .set_default("light.sink", "console")?
            // Configuration file is optional
            .add_source(File::with_name(&path_str).required(false))
            // MOODLIGHT_SERVER__PORT=9000 style overrides
            .add_source(
                Environment::with_prefix("MOODLIGHT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: MoodlightConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.classifier.backend == ClassifierBackend::Process
            && self
                .classifier
                .command
                .as_deref()
                .map_or(true, |c| c.trim().is_empty())
        {
            return Err(ConfigError::Message(
                "Process classifier requires classifier.command".to_string(),
            ));
        }

        if self.detection.tick_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Detection tick_interval_ms must be greater than 0".to_string(),
            ));
        }

        if self.detection.history_size == 0 {
            return Err(ConfigError::Message(
                "Detection history_size must be greater than 0".to_string(),
            ));
        }

        if self.detection.quorum == 0 || self.detection.quorum > self.detection.history_size {
            return Err(ConfigError::Message(format!(
                "Detection quorum must be between 1 and history_size ({})",
                self.detection.history_size
            )));
        }

        if self.server.ws_push_interval_ms == 0 {
            return Err(ConfigError::Message(
                "Server ws_push_interval_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for MoodlightConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                index: default_camera_index(),
                resolution: default_camera_resolution(),
                fps: default_camera_fps(),
            },
            classifier: ClassifierConfig {
                backend: default_classifier_backend(),
                command: None,
                args: Vec::new(),
                timeout_ms: default_classifier_timeout_ms(),
                require_device: default_require_device(),
                seed: default_classifier_seed(),
            },
            detection: DetectionConfig {
                tick_interval_ms: default_tick_interval_ms(),
                history_size: default_history_size(),
                quorum: default_quorum(),
            },
            server: ServerConfig::default(),
            light: LightConfig {
                sink: default_light_sink(),
            },
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ip: default_server_ip(),
            port: default_server_port(),
            ws_push_interval_ms: default_ws_push_interval_ms(),
            cors_origins: default_cors_origins(),
        }
    }
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}

fn default_classifier_backend() -> ClassifierBackend {
    ClassifierBackend::Simulated
}
fn default_classifier_timeout_ms() -> u64 {
    10_000
}
fn default_require_device() -> bool {
    true
}
fn default_classifier_seed() -> u64 {
    42
}

fn default_tick_interval_ms() -> u64 {
    500
}
fn default_history_size() -> usize {
    6
} // ~3 seconds at two ticks per second
fn default_quorum() -> usize {
    3
}

fn default_server_ip() -> String {
    "0.0.0.0".to_string()
}
fn default_server_port() -> u16 {
    8000
}
fn default_ws_push_interval_ms() -> u64 {
    500
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

fn default_light_sink() -> LightSinkKind {
    LightSinkKind::Console
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = MoodlightConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.detection.history_size, 6);
        assert_eq!(config.detection.quorum, 3);
        assert_eq!(config.detection.tick_interval(), Duration::from_millis(500));
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_config_validation() {
        let mut config = MoodlightConfig::default();

        // Quorum larger than the history can never be reached
        config.detection.quorum = 7;
        assert!(config.validate().is_err());

        config.detection.quorum = 3;
        config.detection.tick_interval_ms = 0;
        assert!(config.validate().is_err());

        config.detection.tick_interval_ms = 500;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_process_backend_requires_command() {
        let mut config = MoodlightConfig::default();
        config.classifier.backend = ClassifierBackend::Process;
        assert!(config.validate().is_err());

        config.classifier.command = Some("  ".to_string());
        assert!(config.validate().is_err());

        config.classifier.command = Some("python3".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_classifier_timeout() {
        let mut config = MoodlightConfig::default();
        assert_eq!(
            config.classifier.timeout(),
            Some(Duration::from_millis(10_000))
        );

        config.classifier.timeout_ms = 0;
        assert_eq!(config.classifier.timeout(), None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[classifier]
backend = "process"
command = "python3"
args = ["classify.py", "--detector", "opencv"]

[detection]
history_size = 10
quorum = 4

[server]
port = 9090
"#
        )
        .unwrap();

        let config = MoodlightConfig::load_from_file(file.path()).unwrap();

        assert_eq!(config.classifier.backend, ClassifierBackend::Process);
        assert_eq!(config.classifier.command.as_deref(), Some("python3"));
        assert_eq!(config.classifier.args.len(), 3);
        assert_eq!(config.detection.history_size, 10);
        assert_eq!(config.detection.quorum, 4);
        // Untouched values fall back to defaults
        assert_eq!(config.detection.tick_interval_ms, 500);
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.cors_origins.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_serializes_to_toml() {
        let rendered = toml::to_string_pretty(&MoodlightConfig::default()).unwrap();

        assert!(rendered.contains("[detection]"));
        assert!(rendered.contains("history_size = 6"));
        assert!(rendered.contains("backend = \"simulated\""));
    }
}
