use super::*;
use crate::config::{ClassifierBackend, MoodlightConfig};
use crate::emotion::EmotionLabel;
use crate::error::ClassifierError;

fn label(name: &str) -> EmotionLabel {
    EmotionLabel::new(name).unwrap()
}

#[test]
fn test_parse_face_output() {
    let raw = r#"{"dominant_emotion": "Happy", "emotion": {"Happy": 91.237, "Sad": 3.1, "Neutral": 5.663}}"#;

    match parse_helper_output(raw).unwrap() {
        Detection::Face(result) => {
            assert_eq!(result.label, label("happy"));
            assert_eq!(result.confidence, 91.24);
            assert_eq!(result.all_scores.len(), 3);
            assert_eq!(result.all_scores[&label("neutral")], 5.66);
        }
        Detection::NoFace => panic!("expected a face"),
    }
}

#[test]
fn test_parse_batch_output_uses_first_face() {
    let raw = r#"[
        {"dominant_emotion": "sad", "emotion": {"sad": 70.0, "happy": 30.0}},
        {"dominant_emotion": "happy", "emotion": {"happy": 99.0}}
    ]"#;

    let detection = parse_helper_output(raw).unwrap();
    assert_eq!(detection.into_result().unwrap().label, label("sad"));
}

#[test]
fn test_parse_no_face_output() {
    assert_eq!(
        parse_helper_output(r#"{"face": false}"#).unwrap(),
        Detection::NoFace
    );
    assert_eq!(parse_helper_output("[]").unwrap(), Detection::NoFace);
    assert_eq!(parse_helper_output(" {\"face\": false}\n").unwrap(), Detection::NoFace);
}

#[test]
fn test_parse_invalid_output() {
    for raw in [
        "not json",
        r#"{"emotion": {"happy": 50.0}}"#,
        r#"{"dominant_emotion": "happy", "emotion": {"sad": 50.0}}"#,
        r#"{"dominant_emotion": "", "emotion": {"": 50.0}}"#,
    ] {
        assert!(
            matches!(
                parse_helper_output(raw),
                Err(ClassifierError::InvalidOutput { .. })
            ),
            "expected invalid output for {}",
            raw
        );
    }
}

#[test]
fn test_parse_rejects_out_of_range_scores() {
    for raw in [
        r#"{"dominant_emotion": "happy", "emotion": {"happy": 250.0, "sad": -40.0}}"#,
        r#"{"dominant_emotion": "happy", "emotion": {"happy": 80.0, "sad": -40.0}}"#,
        r#"{"dominant_emotion": "happy", "emotion": {"happy": 100.5}}"#,
    ] {
        match parse_helper_output(raw) {
            Err(ClassifierError::InvalidOutput { details }) => {
                assert!(details.contains("outside 0-100"), "{}", details)
            }
            other => panic!("expected invalid output for {}, got {:?}", raw, other),
        }
    }

    let detection =
        parse_helper_output(r#"{"dominant_emotion": "sad", "emotion": {"sad": 100.0, "happy": 0.0}}"#)
            .unwrap();
    assert!(matches!(detection, Detection::Face(ref r) if r.confidence == 100.0));
}

#[tokio::test]
async fn test_scripted_classifier_replays_script() {
    let classifier = ScriptedClassifier::new();
    classifier
        .push_face("happy", 80.0)
        .push_no_face()
        .push_error("frame grab failed");

    classifier.acquire().await.unwrap();
    assert!(classifier.is_acquired());

    assert!(matches!(
        classifier.classify().await.unwrap(),
        Detection::Face(_)
    ));
    assert_eq!(classifier.classify().await.unwrap(), Detection::NoFace);
    assert!(matches!(
        classifier.classify().await,
        Err(ClassifierError::CaptureFailed { .. })
    ));
    // Exhausted script reports no face
    assert_eq!(classifier.classify().await.unwrap(), Detection::NoFace);
    assert_eq!(classifier.classify_count(), 4);

    classifier.release().await;
    assert!(!classifier.is_acquired());
    assert_eq!(classifier.release_count(), 1);
}

#[tokio::test]
async fn test_scripted_classifier_acquire_failure() {
    let classifier = ScriptedClassifier::new();
    classifier.set_fail_acquire(true);

    assert!(matches!(
        classifier.acquire().await,
        Err(ClassifierError::DeviceUnavailable { .. })
    ));
    assert!(!classifier.is_acquired());
    assert_eq!(classifier.acquire_count(), 1);
}

#[tokio::test]
async fn test_simulated_classifier_is_seeded() {
    let first = SimulatedClassifier::new(7);
    let second = SimulatedClassifier::new(7);
    first.acquire().await.unwrap();
    second.acquire().await.unwrap();

    for _ in 0..50 {
        let a = first.classify().await.unwrap();
        let b = second.classify().await.unwrap();
        match (a, b) {
            (Detection::Face(a), Detection::Face(b)) => {
                assert_eq!(a.label, b.label);
                assert_eq!(a.confidence, b.confidence);
                assert!((0.0..=100.0).contains(&a.confidence));
                assert_eq!(a.all_scores.len(), 7);
            }
            (Detection::NoFace, Detection::NoFace) => {}
            _ => panic!("seeded simulators diverged"),
        }
    }
}

#[tokio::test]
async fn test_simulated_dominant_has_highest_score() {
    let classifier = SimulatedClassifier::new(1234);
    for _ in 0..100 {
        if let Detection::Face(result) = classifier.classify().await.unwrap() {
            let max = result
                .all_scores
                .values()
                .cloned()
                .fold(f64::MIN, f64::max);
            assert_eq!(result.confidence, max);
        }
    }
}

#[tokio::test]
async fn test_process_classifier_requires_acquire() {
    let mut config = MoodlightConfig::default();
    config.classifier.backend = ClassifierBackend::Process;
    config.classifier.command = Some("true".to_string());

    let classifier = ProcessClassifier::new(config.classifier, config.camera);
    assert!(matches!(
        classifier.classify().await,
        Err(ClassifierError::NotAcquired)
    ));
}

#[tokio::test]
async fn test_process_classifier_missing_device() {
    let mut config = MoodlightConfig::default();
    config.classifier.command = Some("true".to_string());
    config.classifier.require_device = true;
    // No machine has this many capture devices
    config.camera.index = 9_999;

    let classifier = ProcessClassifier::new(config.classifier, config.camera);
    assert!(matches!(
        classifier.acquire().await,
        Err(ClassifierError::DeviceUnavailable { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_classifier_runs_helper() {
    let mut config = MoodlightConfig::default();
    config.classifier.backend = ClassifierBackend::Process;
    config.classifier.command = Some("sh".to_string());
    config.classifier.args = vec![
        "-c".to_string(),
        r#"echo '{"dominant_emotion": "surprise", "emotion": {"surprise": 64.5}}'"#.to_string(),
    ];
    config.classifier.require_device = false;

    let classifier = create_classifier(&config.classifier, &config.camera);
    assert_eq!(classifier.name(), "process");
    classifier.acquire().await.unwrap();

    let result = classifier.classify().await.unwrap().into_result().unwrap();
    assert_eq!(result.label, label("surprise"));
    assert_eq!(result.confidence, 64.5);

    classifier.release().await;
    assert!(matches!(
        classifier.classify().await,
        Err(ClassifierError::NotAcquired)
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_classifier_reports_helper_failure() {
    let mut config = MoodlightConfig::default();
    config.classifier.command = Some("sh".to_string());
    config.classifier.args = vec!["-c".to_string(), "echo 'camera busy' >&2; exit 3".to_string()];
    config.classifier.require_device = false;

    let classifier = ProcessClassifier::new(config.classifier, config.camera);
    classifier.acquire().await.unwrap();

    match classifier.classify().await {
        Err(ClassifierError::CaptureFailed { details }) => {
            assert!(details.contains("camera busy"));
        }
        other => panic!("expected capture failure, got {:?}", other),
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_classifier_timeout() {
    let mut config = MoodlightConfig::default();
    config.classifier.command = Some("sleep".to_string());
    config.classifier.args = vec!["5".to_string()];
    config.classifier.require_device = false;
    config.classifier.timeout_ms = 50;

    let classifier = ProcessClassifier::new(config.classifier, config.camera);
    classifier.acquire().await.unwrap();

    assert!(matches!(
        classifier.classify().await,
        Err(ClassifierError::Timeout { timeout_ms: 50 })
    ));
}
