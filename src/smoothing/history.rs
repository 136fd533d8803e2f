use crate::emotion::{ClassificationResult, EmotionLabel};
use std::collections::{HashMap, VecDeque};

/// Bounded FIFO of recent classifications.
///
/// Holds at most `capacity` results in arrival order; pushing into a full
/// buffer evicts the oldest entry.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    entries: VecDeque<ClassificationResult>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create an empty buffer
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            panic!("History buffer capacity must be greater than 0");
        }

        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a result, returning the evicted entry if the buffer was full
    pub fn push(&mut self, result: ClassificationResult) -> Option<ClassificationResult> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(result);
        evicted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Oldest-first iterator over the buffered results
    pub fn iter(&self) -> impl Iterator<Item = &ClassificationResult> {
        self.entries.iter()
    }

    /// Label with the most occurrences.
    ///
    /// Ties go to whichever tied label appears latest in the buffer, so the
    /// same sequence always yields the same winner.
    pub fn majority_label(&self) -> Option<&EmotionLabel> {
        // label -> (count, index of latest occurrence)
        let mut tally: HashMap<&EmotionLabel, (usize, usize)> = HashMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let slot = tally.entry(&entry.label).or_insert((0, index));
            slot.0 += 1;
            slot.1 = index;
        }

        tally
            .into_iter()
            .max_by_key(|(_, (count, latest))| (*count, *latest))
            .map(|(label, _)| label)
    }

    /// Mean confidence over entries carrying `label`
    pub fn mean_confidence(&self, label: &EmotionLabel) -> Option<f64> {
        let (sum, count) = self
            .entries
            .iter()
            .filter(|entry| &entry.label == label)
            .fold((0.0, 0usize), |(sum, count), entry| {
                (sum + entry.confidence, count + 1)
            });

        (count > 0).then(|| sum / count as f64)
    }
}
