use super::adapter::{Detection, EmotionClassifier};
use crate::config::{CameraConfig, ClassifierConfig};
use crate::emotion::{ClassificationResult, EmotionLabel};
use crate::error::ClassifierError;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::process::Command;
use tracing::{debug, info, trace, warn};

/// Classifier backed by an external helper program.
///
/// The helper is run once per tick. It captures a frame from the camera
/// named in `MOODLIGHT_CAMERA_*` environment variables, runs the emotion
/// model, and prints a single JSON document on stdout:
///
/// ```json
/// {"dominant_emotion": "happy", "emotion": {"happy": 91.2, "sad": 3.1}}
/// ```
///
/// or `{"face": false}` when no face was found. A JSON array of such
/// documents is also accepted; the first entry wins.
pub struct ProcessClassifier {
    config: ClassifierConfig,
    camera: CameraConfig,
    acquired: AtomicBool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum HelperOutput {
    Batch(Vec<FaceReport>),
    Single(FaceReport),
}

#[derive(Debug, Deserialize)]
struct FaceReport {
    #[serde(default = "default_face")]
    face: bool,
    dominant_emotion: Option<String>,
    #[serde(default)]
    emotion: HashMap<String, f64>,
}

fn default_face() -> bool {
    true
}

impl ProcessClassifier {
    pub fn new(config: ClassifierConfig, camera: CameraConfig) -> Self {
        Self {
            config,
            camera,
            acquired: AtomicBool::new(false),
        }
    }

    fn device_path(&self) -> PathBuf {
        PathBuf::from(format!("/dev/video{}", self.camera.index))
    }

    fn build_command(&self) -> Result<Command, ClassifierError> {
        let program = self.config.command.as_deref().ok_or_else(|| {
            ClassifierError::DeviceUnavailable {
                details: "no classifier command configured".to_string(),
            }
        })?;

        let mut command = Command::new(program);
        command
            .args(&self.config.args)
            .env("MOODLIGHT_CAMERA_INDEX", self.camera.index.to_string())
            .env("MOODLIGHT_CAMERA_WIDTH", self.camera.resolution.0.to_string())
            .env("MOODLIGHT_CAMERA_HEIGHT", self.camera.resolution.1.to_string())
            .env("MOODLIGHT_CAMERA_FPS", self.camera.fps.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // A cancelled tick must not leave the helper running
            .kill_on_drop(true);

        Ok(command)
    }
}

#[async_trait]
impl EmotionClassifier for ProcessClassifier {
    async fn acquire(&self) -> Result<(), ClassifierError> {
        if self.config.command.is_none() {
            return Err(ClassifierError::DeviceUnavailable {
                details: "no classifier command configured".to_string(),
            });
        }

        if self.config.require_device {
            let device = self.device_path();
            if tokio::fs::metadata(&device).await.is_err() {
                return Err(ClassifierError::DeviceUnavailable {
                    details: format!("{} not found", device.display()),
                });
            }
        }

        self.acquired.store(true, Ordering::SeqCst);
        info!(
            "Process classifier acquired camera {} ({}x{})",
            self.camera.index, self.camera.resolution.0, self.camera.resolution.1
        );
        Ok(())
    }

    async fn classify(&self) -> Result<Detection, ClassifierError> {
        if !self.acquired.load(Ordering::SeqCst) {
            return Err(ClassifierError::NotAcquired);
        }

        let mut command = self.build_command()?;
        let output = command.output();
        let output = match self.config.timeout() {
            Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                ClassifierError::Timeout {
                    timeout_ms: self.config.timeout_ms,
                }
            })??,
            None => output.await?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ClassifierError::CaptureFailed {
                details: format!("helper exited with {}: {}", output.status, stderr.trim()),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        trace!("Classifier helper output: {}", stdout.trim());
        parse_helper_output(&stdout)
    }

    async fn release(&self) {
        if self.acquired.swap(false, Ordering::SeqCst) {
            debug!("Process classifier released camera {}", self.camera.index);
        }
    }

    fn name(&self) -> &str {
        "process"
    }
}

/// Parse one JSON document printed by a classifier helper.
///
/// Every score must be a percentage in 0-100; anything else is rejected as
/// invalid output and the tick is skipped.
pub fn parse_helper_output(raw: &str) -> Result<Detection, ClassifierError> {
    let output: HelperOutput =
        serde_json::from_str(raw.trim()).map_err(|e| ClassifierError::InvalidOutput {
            details: e.to_string(),
        })?;

    let report = match output {
        HelperOutput::Single(report) => report,
        HelperOutput::Batch(reports) => match reports.into_iter().next() {
            Some(report) => report,
            None => return Ok(Detection::NoFace),
        },
    };

    if !report.face {
        return Ok(Detection::NoFace);
    }

    let dominant = report
        .dominant_emotion
        .ok_or_else(|| ClassifierError::InvalidOutput {
            details: "missing dominant_emotion".to_string(),
        })?;
    let dominant = EmotionLabel::new(&dominant).map_err(|e| ClassifierError::InvalidOutput {
        details: e.to_string(),
    })?;

    let mut scores = HashMap::with_capacity(report.emotion.len());
    for (label, score) in report.emotion {
        if !score.is_finite() || !(0.0..=100.0).contains(&score) {
            return Err(ClassifierError::InvalidOutput {
                details: format!("score {} for '{}' outside 0-100", score, label),
            });
        }
        match EmotionLabel::new(&label) {
            Ok(label) => {
                scores.insert(label, score);
            }
            Err(_) => warn!("Ignoring unnamed emotion score {}", score),
        }
    }

    ClassificationResult::from_scores(dominant.clone(), scores)
        .map(Detection::Face)
        .ok_or_else(|| ClassifierError::InvalidOutput {
            details: format!("no score reported for dominant emotion '{}'", dominant),
        })
}
