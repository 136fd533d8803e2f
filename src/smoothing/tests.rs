use super::*;
use crate::emotion::{ClassificationResult, EmotionLabel, SmoothedState};

fn result(label: &str, confidence: f64) -> ClassificationResult {
    ClassificationResult::new(EmotionLabel::new(label).unwrap(), confidence)
}

fn label(name: &str) -> EmotionLabel {
    EmotionLabel::new(name).unwrap()
}

fn create_test_engine() -> SmoothingEngine {
    SmoothingEngine::new(6, 3, SharedEmotion::new())
}

#[test]
fn test_history_never_exceeds_capacity() {
    let mut engine = create_test_engine();

    for i in 0..50 {
        let name = if i % 3 == 0 { "happy" } else { "sad" };
        engine.record(Some(result(name, 50.0)));
        assert!(engine.history_len() <= engine.capacity());
    }

    assert_eq!(engine.history_len(), 6);
}

#[test]
fn test_history_evicts_oldest_first() {
    let mut buffer = HistoryBuffer::new(3);
    assert!(buffer.push(result("happy", 1.0)).is_none());
    assert!(buffer.push(result("sad", 2.0)).is_none());
    assert!(buffer.push(result("angry", 3.0)).is_none());

    let evicted = buffer.push(result("fear", 4.0)).unwrap();
    assert_eq!(evicted.label, label("happy"));

    let labels: Vec<&str> = buffer.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["sad", "angry", "fear"]);
}

#[test]
#[should_panic]
fn test_zero_capacity_history_panics() {
    let _ = HistoryBuffer::new(0);
}

#[test]
fn test_no_smoothing_below_quorum() {
    let shared = SharedEmotion::new();
    let mut engine = SmoothingEngine::new(6, 3, shared.clone());

    assert!(engine.record(Some(result("happy", 90.0))).is_none());
    assert!(engine.record(Some(result("happy", 80.0))).is_none());

    assert_eq!(engine.history_len(), 2);
    assert_eq!(shared.get(), SmoothedState::default());
}

#[test]
fn test_majority_vote_and_mean_confidence() {
    let mut engine = create_test_engine();

    engine.record(Some(result("happy", 80.0)));
    engine.record(Some(result("happy", 90.0)));
    let changed = engine.record(Some(result("sad", 99.0))).unwrap();

    assert_eq!(changed.label, label("happy"));
    assert_eq!(changed.confidence, 85.0);
    assert!(changed.timestamp.is_some());
    assert_eq!(engine.current().label, label("happy"));
    assert_eq!(engine.current().confidence, 85.0);
}

#[test]
fn test_confidence_is_rounded() {
    let mut engine = create_test_engine();

    engine.record(Some(result("fear", 10.0)));
    engine.record(Some(result("fear", 10.0)));
    engine.record(Some(result("fear", 10.01)));

    assert_eq!(engine.current().confidence, 10.0);
}

#[test]
fn test_tie_prefers_most_recent_label() {
    let mut engine = create_test_engine();

    engine.record(Some(result("happy", 60.0)));
    engine.record(Some(result("sad", 70.0)));
    engine.record(Some(result("happy", 60.0)));
    engine.record(Some(result("sad", 70.0)));

    // Two of each, sad observed last
    assert_eq!(engine.current().label, label("sad"));
    assert_eq!(engine.current().confidence, 70.0);

    engine.record(Some(result("angry", 50.0)));
    engine.record(Some(result("happy", 60.0)));

    // happy now leads 3-2
    assert_eq!(engine.current().label, label("happy"));
}

#[test]
fn test_tie_break_after_eviction() {
    let mut buffer = HistoryBuffer::new(4);
    for name in ["sad", "sad", "happy", "sad", "happy", "happy"] {
        buffer.push(result(name, 50.0));
    }

    // Window is [happy, sad, happy, happy]
    assert_eq!(buffer.majority_label(), Some(&label("happy")));

    buffer.push(result("sad", 50.0));
    // Window is [sad, happy, happy, sad]: tied, sad most recent
    assert_eq!(buffer.majority_label(), Some(&label("sad")));
}

#[test]
fn test_smoothing_is_deterministic() {
    let sequence = [
        "happy", "sad", "happy", "sad", "angry", "angry", "sad", "happy", "surprise", "fear",
    ];

    let run = || {
        let mut engine = create_test_engine();
        sequence
            .iter()
            .map(|name| {
                engine.record(Some(result(name, 50.0)));
                engine.current().label
            })
            .collect::<Vec<_>>()
    };

    let first = run();
    for _ in 0..20 {
        assert_eq!(run(), first);
    }
}

#[test]
fn test_no_face_leaves_state_untouched() {
    let mut engine = create_test_engine();
    engine.record(Some(result("happy", 80.0)));
    engine.record(Some(result("sad", 40.0)));
    engine.record(Some(result("happy", 70.0)));

    let history_before = engine.history().clone();
    let state_before = engine.current();

    assert!(engine.record(None).is_none());

    assert_eq!(engine.history(), &history_before);
    assert_eq!(engine.current(), state_before);
}

#[test]
fn test_state_changed_fires_once_per_transition() {
    let mut engine = create_test_engine();

    for _ in 0..2 {
        assert!(engine.record(Some(result("neutral", 60.0))).is_none());
    }
    let first = engine.record(Some(result("neutral", 60.0))).unwrap();
    assert_eq!(first.label, label("neutral"));

    let mut changes = Vec::new();
    for _ in 0..10 {
        if let Some(state) = engine.record(Some(result("happy", 90.0))) {
            changes.push(state);
        }
    }

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].label, label("happy"));
    assert_eq!(engine.current().confidence, 90.0);
}

#[test]
fn test_unchanged_label_still_updates_confidence() {
    let mut engine = create_test_engine();
    for _ in 0..3 {
        engine.record(Some(result("sad", 40.0)));
    }
    assert_eq!(engine.current().confidence, 40.0);

    assert!(engine.record(Some(result("sad", 100.0))).is_none());
    assert_eq!(engine.current().confidence, 55.0);
}

#[test]
fn test_engines_share_published_state() {
    let shared = SharedEmotion::new();
    let reader = shared.clone();

    let mut engine = SmoothingEngine::new(3, 3, shared);
    for _ in 0..3 {
        engine.record(Some(result("surprise", 75.0)));
    }

    assert_eq!(reader.get().label, label("surprise"));

    // A fresh engine starts without a published label, so its first
    // quorum computation reports a change even for the same emotion
    let mut next = SmoothingEngine::new(3, 3, reader.clone());
    next.record(Some(result("surprise", 75.0)));
    next.record(Some(result("surprise", 75.0)));
    assert!(next.record(Some(result("surprise", 75.0))).is_some());
}

#[test]
#[should_panic]
fn test_quorum_above_capacity_panics() {
    let _ = SmoothingEngine::new(3, 4, SharedEmotion::new());
}
