use super::adapter::{Detection, EmotionClassifier};
use crate::emotion::{ClassificationResult, EmotionLabel};
use crate::error::ClassifierError;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tracing::{debug, info};

const LABELS: [&str; 7] = [
    EmotionLabel::HAPPY,
    EmotionLabel::SAD,
    EmotionLabel::ANGRY,
    EmotionLabel::NEUTRAL,
    EmotionLabel::SURPRISE,
    EmotionLabel::FEAR,
    EmotionLabel::DISGUST,
];

const MOOD_SWITCH_PROBABILITY: f64 = 0.08;
const NO_FACE_PROBABILITY: f64 = 0.1;
const NOISE_PROBABILITY: f64 = 0.2;

/// Camera-less classifier producing a plausible emotion stream.
///
/// Holds a slowly drifting "true" mood and reports it with per-frame noise
/// and occasional missed faces, so smoothing has something to do.
pub struct SimulatedClassifier {
    state: Mutex<SimulatorState>,
    seed: u64,
}

struct SimulatorState {
    rng: StdRng,
    mood: &'static str,
}

impl SimulatedClassifier {
    pub fn new(seed: u64) -> Self {
        Self {
            state: Mutex::new(SimulatorState {
                rng: StdRng::seed_from_u64(seed),
                mood: EmotionLabel::NEUTRAL,
            }),
            seed,
        }
    }

    fn next_detection(state: &mut SimulatorState) -> Detection {
        if state.rng.gen_bool(MOOD_SWITCH_PROBABILITY) {
            if let Some(next) = LABELS.choose(&mut state.rng) {
                debug!("Simulated mood drifting {} -> {}", state.mood, next);
                state.mood = *next;
            }
        }

        if state.rng.gen_bool(NO_FACE_PROBABILITY) {
            return Detection::NoFace;
        }

        let dominant = if state.rng.gen_bool(NOISE_PROBABILITY) {
            LABELS.choose(&mut state.rng).copied().unwrap_or(state.mood)
        } else {
            state.mood
        };

        // Dominant takes most of the mass, the rest is spread randomly
        let dominant_score: f64 = state.rng.gen_range(45.0..95.0);
        let mut remaining = 100.0 - dominant_score;
        let mut scores = HashMap::with_capacity(LABELS.len());
        for label in LABELS {
            let score = if label == dominant {
                dominant_score
            } else {
                let ceiling = remaining.min(dominant_score - 1.0).max(0.0);
                let share = state.rng.gen_range(0.0..=ceiling);
                remaining -= share;
                share
            };
            if let Ok(label) = EmotionLabel::new(label) {
                scores.insert(label, score);
            }
        }

        EmotionLabel::new(dominant)
            .ok()
            .and_then(|dominant| ClassificationResult::from_scores(dominant, scores))
            .map(Detection::Face)
            .unwrap_or(Detection::NoFace)
    }
}

#[async_trait]
impl EmotionClassifier for SimulatedClassifier {
    async fn acquire(&self) -> Result<(), ClassifierError> {
        info!("Simulated classifier acquired (seed {})", self.seed);
        Ok(())
    }

    async fn classify(&self) -> Result<Detection, ClassifierError> {
        let detection = {
            let mut state = self.state.lock();
            Self::next_detection(&mut state)
        };
        Ok(detection)
    }

    async fn release(&self) {
        debug!("Simulated classifier released");
    }

    fn name(&self) -> &str {
        "simulated"
    }
}
