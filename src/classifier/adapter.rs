use crate::emotion::ClassificationResult;
use crate::error::ClassifierError;
use async_trait::async_trait;

/// Result of classifying one frame
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Face(ClassificationResult),
    /// Frame captured but no face found; not an error
    NoFace,
}

impl Detection {
    pub fn into_result(self) -> Option<ClassificationResult> {
        match self {
            Detection::Face(result) => Some(result),
            Detection::NoFace => None,
        }
    }
}

/// Capture device plus emotion model, treated as one opaque unit
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    /// Claim the capture device. Fails if it cannot be opened.
    async fn acquire(&self) -> Result<(), ClassifierError>;

    /// Capture one frame and classify the dominant emotion
    async fn classify(&self) -> Result<Detection, ClassifierError>;

    /// Release the capture device. Safe to call when not acquired.
    async fn release(&self);

    fn name(&self) -> &str;
}
