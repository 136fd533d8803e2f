use super::state::{LightSpec, LightState};
use crate::emotion::EmotionLabel;
use crate::error::ValidationError;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Outcome of a bulk mapping update
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkUpdateReport {
    pub applied: Vec<EmotionLabel>,
    /// Rejected keys and the reason each was refused
    pub rejected: BTreeMap<String, String>,
}

impl BulkUpdateReport {
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Emotion label to light configuration table.
///
/// Lookups for unmapped labels return `None`. All writes go through
/// validation; a rejected entry never replaces the stored one.
#[derive(Debug, Default)]
pub struct MappingTable {
    entries: RwLock<HashMap<EmotionLabel, LightState>>,
}

impl MappingTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a table seeded with the built-in mood palette
    pub fn with_defaults() -> Self {
        let defaults = [
            (EmotionLabel::HAPPY, "#FFD700", 100, 1.0),
            (EmotionLabel::SAD, "#4169E1", 50, 2.0),
            (EmotionLabel::ANGRY, "#FF0000", 80, 0.5),
            (EmotionLabel::NEUTRAL, "#FFFFFF", 50, 1.5),
            (EmotionLabel::SURPRISE, "#FF69B4", 90, 0.3),
            (EmotionLabel::FEAR, "#800080", 70, 0.8),
        ];

        let entries = defaults
            .into_iter()
            .filter_map(|(label, color, brightness, transition)| {
                let label = EmotionLabel::new(label).ok()?;
                let state = LightState::new(color, brightness, transition).ok()?;
                Some((label, state))
            })
            .collect::<HashMap<_, _>>();

        info!("Loaded {} default emotion mappings", entries.len());

        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn get(&self, label: &EmotionLabel) -> Option<LightState> {
        self.entries.read().get(label).cloned()
    }

    /// Validate and store a single mapping, returning the stored state
    pub fn set(&self, label: &str, spec: LightSpec) -> Result<LightState, ValidationError> {
        let (label, state) = Self::validate_entry(label, spec)?;

        debug!(
            "Mapping {} -> {} at {}%",
            label,
            state.color(),
            state.brightness()
        );
        self.entries.write().insert(label, state.clone());
        Ok(state)
    }

    /// Apply several mappings at once.
    ///
    /// Each entry is validated on its own; valid entries are stored and
    /// invalid ones reported. The whole batch is written under one lock so
    /// readers see either none or all of the accepted entries.
    pub fn set_bulk<I, S>(&self, updates: I) -> BulkUpdateReport
    where
        I: IntoIterator<Item = (S, LightSpec)>,
        S: Into<String>,
    {
        let mut report = BulkUpdateReport::default();
        let mut accepted = Vec::new();

        for (raw_label, spec) in updates {
            let raw_label = raw_label.into();
            match Self::validate_entry(&raw_label, spec) {
                Ok(entry) => accepted.push(entry),
                Err(e) => {
                    warn!("Rejected mapping for '{}': {}", raw_label, e);
                    report.rejected.insert(raw_label, e.to_string());
                }
            }
        }

        let mut entries = self.entries.write();
        for (label, state) in accepted {
            entries.insert(label.clone(), state);
            report.applied.push(label);
        }
        drop(entries);

        info!(
            "Bulk mapping update: {} applied, {} rejected",
            report.applied.len(),
            report.rejected.len()
        );
        report
    }

    /// Sorted copy of every mapping
    pub fn snapshot(&self) -> BTreeMap<EmotionLabel, LightState> {
        self.entries
            .read()
            .iter()
            .map(|(label, state)| (label.clone(), state.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn validate_entry(
        label: &str,
        spec: LightSpec,
    ) -> Result<(EmotionLabel, LightState), ValidationError> {
        let label = EmotionLabel::new(label)?;
        let state = LightState::try_from(spec)?;
        Ok((label, state))
    }
}
