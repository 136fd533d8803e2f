use super::color::HexColor;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Validated light configuration.
///
/// Brightness is a 0-100 percentage and the transition a positive number
/// of seconds. Out-of-range values are rejected, never clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LightSpec")]
pub struct LightState {
    pub(super) color: HexColor,
    pub(super) brightness: u8,
    pub(super) transition_speed: f64,
}

/// Unvalidated light configuration as received over the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightSpec {
    pub color: String,
    pub brightness: i64,
    pub transition_speed: f64,
}

impl LightState {
    pub fn new(color: &str, brightness: i64, transition_speed: f64) -> Result<Self, ValidationError> {
        let color = HexColor::parse(color)?;

        if !(0..=100).contains(&brightness) {
            return Err(ValidationError::BrightnessOutOfRange { value: brightness });
        }

        if !transition_speed.is_finite() || transition_speed <= 0.0 {
            return Err(ValidationError::InvalidTransitionSpeed {
                value: transition_speed,
            });
        }

        Ok(Self {
            color,
            brightness: brightness as u8,
            transition_speed,
        })
    }

    pub fn color(&self) -> HexColor {
        self.color
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    /// Transition duration in seconds
    pub fn transition_speed(&self) -> f64 {
        self.transition_speed
    }
}

impl TryFrom<LightSpec> for LightState {
    type Error = ValidationError;

    fn try_from(spec: LightSpec) -> Result<Self, Self::Error> {
        Self::new(&spec.color, spec.brightness, spec.transition_speed)
    }
}

impl From<&LightState> for LightSpec {
    fn from(state: &LightState) -> Self {
        Self {
            color: state.color.to_string(),
            brightness: state.brightness as i64,
            transition_speed: state.transition_speed,
        }
    }
}

impl LightSpec {
    pub fn new<S: Into<String>>(color: S, brightness: i64, transition_speed: f64) -> Self {
        Self {
            color: color.into(),
            brightness,
            transition_speed,
        }
    }
}
