use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodlightError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Light error: {0}")]
    Light(#[from] LightError),

    #[error("Server error: {0}")]
    Server(#[from] ServerError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },
}

impl MoodlightError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Misuse of the detection session lifecycle
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Detection already running")]
    AlreadyRunning,

    #[error("Detection not running")]
    NotRunning,

    #[error("Emotion classifier unavailable: {details}")]
    AdapterUnavailable { details: String },
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Capture device unavailable: {details}")]
    DeviceUnavailable { details: String },

    #[error("Classifier has not been acquired")]
    NotAcquired,

    #[error("Frame capture failed: {details}")]
    CaptureFailed { details: String },

    #[error("Classifier returned invalid output: {details}")]
    InvalidOutput { details: String },

    #[error("Classification timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Classifier IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejected light configuration; nothing is stored when this is returned
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid hex color '{value}', expected #RRGGBB")]
    InvalidColor { value: String },

    #[error("Brightness {value} out of range, expected 0-100")]
    BrightnessOutOfRange { value: i64 },

    #[error("Transition speed {value} must be a positive number of seconds")]
    InvalidTransitionSpeed { value: f64 },

    #[error("Emotion label must not be empty")]
    EmptyLabel,
}

#[derive(Error, Debug)]
pub enum LightError {
    #[error("Failed to apply light state: {details}")]
    ApplyFailed { details: String },
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Failed to bind {address}: {source}")]
    BindFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server startup failed: {details}")]
    StartupFailed { details: String },
}

#[derive(Error, Debug)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },
}

pub type Result<T> = std::result::Result<T, MoodlightError>;
