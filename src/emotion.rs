use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Emotion label reported by a classifier.
///
/// The set is open: labels are lower-cased strings so a classifier with a
/// wider vocabulary than the well-known constants still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmotionLabel(String);

impl EmotionLabel {
    pub const HAPPY: &'static str = "happy";
    pub const SAD: &'static str = "sad";
    pub const ANGRY: &'static str = "angry";
    pub const NEUTRAL: &'static str = "neutral";
    pub const SURPRISE: &'static str = "surprise";
    pub const FEAR: &'static str = "fear";
    pub const DISGUST: &'static str = "disgust";

    /// Build a label, normalizing case and surrounding whitespace
    pub fn new(label: &str) -> Result<Self, ValidationError> {
        let normalized = label.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptyLabel);
        }
        Ok(Self(normalized))
    }

    pub fn neutral() -> Self {
        Self(Self::NEUTRAL.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EmotionLabel {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<EmotionLabel> for String {
    fn from(label: EmotionLabel) -> Self {
        label.0
    }
}

/// One classifier verdict for a single frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationResult {
    pub label: EmotionLabel,
    /// Confidence of the dominant label, 0-100
    pub confidence: f64,
    pub all_scores: HashMap<EmotionLabel, f64>,
}

impl ClassificationResult {
    pub fn new(label: EmotionLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence,
            all_scores: HashMap::new(),
        }
    }

    /// Build a result from a full score distribution and its dominant label.
    ///
    /// Scores are rounded to two decimals. Returns `None` when the dominant
    /// label has no score in the distribution.
    pub fn from_scores(dominant: EmotionLabel, scores: HashMap<EmotionLabel, f64>) -> Option<Self> {
        let all_scores: HashMap<EmotionLabel, f64> = scores
            .into_iter()
            .map(|(label, score)| (label, round2(score)))
            .collect();
        let confidence = *all_scores.get(&dominant)?;

        Some(Self {
            label: dominant,
            confidence,
            all_scores,
        })
    }
}

/// Majority-vote emotion published to readers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedState {
    #[serde(rename = "emotion")]
    pub label: EmotionLabel,
    pub confidence: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl SmoothedState {
    pub fn new(label: EmotionLabel, confidence: f64) -> Self {
        Self {
            label,
            confidence,
            timestamp: Some(Utc::now()),
        }
    }
}

impl Default for SmoothedState {
    /// Neutral placeholder shown before any detection has run
    fn default() -> Self {
        Self {
            label: EmotionLabel::neutral(),
            confidence: 0.0,
            timestamp: None,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
