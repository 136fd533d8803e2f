use super::*;
use crate::emotion::EmotionLabel;
use crate::error::ValidationError;
use std::collections::HashMap;

fn label(name: &str) -> EmotionLabel {
    EmotionLabel::new(name).unwrap()
}

#[test]
fn test_hex_color_parsing() {
    let color = HexColor::parse("#ffd700").unwrap();
    assert_eq!(color.rgb(), (0xFF, 0xD7, 0x00));
    assert_eq!(color.to_string(), "#FFD700");

    for invalid in ["FFD700", "#FFD70", "#FFD7000", "#GGGGGG", "", "#"] {
        assert!(
            matches!(
                HexColor::parse(invalid),
                Err(ValidationError::InvalidColor { .. })
            ),
            "expected '{}' to be rejected",
            invalid
        );
    }
}

#[test]
fn test_hex_color_conversions() {
    let blue = HexColor::parse("#4169E1").unwrap();
    assert_eq!(blue.scaled_rgb(100), (0x41, 0x69, 0xE1));
    assert_eq!(blue.scaled_rgb(50), (32, 52, 112));
    assert_eq!(blue.scaled_rgb(0), (0, 0, 0));

    let (h, s, v) = HexColor::from_rgb(255, 0, 0).hsv();
    assert_eq!((h, s, v), (0.0, 100.0, 100.0));

    let (h, s, _) = HexColor::from_rgb(255, 255, 255).hsv();
    assert_eq!((h, s), (0.0, 0.0));

    let (h, _, _) = HexColor::from_rgb(0, 0, 255).hsv();
    assert_eq!(h, 240.0);
}

#[test]
fn test_light_state_validation() {
    let state = LightState::new("#FF0000", 80, 0.5).unwrap();
    assert_eq!(state.brightness(), 80);
    assert_eq!(state.transition_speed(), 0.5);

    assert_eq!(
        LightState::new("#FF0000", 150, 0.5),
        Err(ValidationError::BrightnessOutOfRange { value: 150 })
    );
    assert_eq!(
        LightState::new("#FF0000", -1, 0.5),
        Err(ValidationError::BrightnessOutOfRange { value: -1 })
    );
    assert!(matches!(
        LightState::new("#FF0000", 50, 0.0),
        Err(ValidationError::InvalidTransitionSpeed { .. })
    ));
    assert!(LightState::new("#FF0000", 50, f64::NAN).is_err());
    assert!(LightState::new("red", 50, 1.0).is_err());

    // Boundaries are inclusive
    assert!(LightState::new("#000000", 0, 0.01).is_ok());
    assert!(LightState::new("#FFFFFF", 100, 10.0).is_ok());
}

#[test]
fn test_light_state_serde() {
    let state: LightState = serde_json::from_str(
        r##"{"color": "#ff69b4", "brightness": 90, "transition_speed": 0.3}"##,
    )
    .unwrap();
    assert_eq!(state.color().to_string(), "#FF69B4");

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["color"], "#FF69B4");
    assert_eq!(json["brightness"], 90);

    let invalid = serde_json::from_str::<LightState>(
        r##"{"color": "#ff69b4", "brightness": 101, "transition_speed": 0.3}"##,
    );
    assert!(invalid.is_err());
}

#[test]
fn test_default_mappings() {
    let table = MappingTable::with_defaults();
    assert_eq!(table.len(), 6);

    let happy = table.get(&label("happy")).unwrap();
    assert_eq!(happy.color().to_string(), "#FFD700");
    assert_eq!(happy.brightness(), 100);
    assert_eq!(happy.transition_speed(), 1.0);

    let fear = table.get(&label("fear")).unwrap();
    assert_eq!(fear.color().to_string(), "#800080");

    // Classifier vocabulary beyond the palette is simply unmapped
    assert!(table.get(&label("disgust")).is_none());
}

#[test]
fn test_set_rejects_invalid_and_keeps_prior() {
    let table = MappingTable::with_defaults();
    let before = table.get(&label("happy")).unwrap();

    let result = table.set("happy", LightSpec::new("#00FF00", 150, 1.0));
    assert_eq!(
        result,
        Err(ValidationError::BrightnessOutOfRange { value: 150 })
    );
    assert_eq!(table.get(&label("happy")).unwrap(), before);

    let stored = table.set("Happy", LightSpec::new("#00ff00", 40, 2.5)).unwrap();
    assert_eq!(table.get(&label("happy")).unwrap(), stored);
    assert_eq!(stored.color().to_string(), "#00FF00");
}

#[test]
fn test_set_new_label() {
    let table = MappingTable::new();
    assert!(table.is_empty());

    table
        .set("disgust", LightSpec::new("#556B2F", 60, 1.2))
        .unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.get(&label("disgust")).is_some());

    assert_eq!(
        table.set(" ", LightSpec::new("#556B2F", 60, 1.2)),
        Err(ValidationError::EmptyLabel)
    );
}

#[test]
fn test_bulk_update_partial_application() {
    let table = MappingTable::with_defaults();
    let sad_before = table.get(&label("sad")).unwrap();

    let mut updates = HashMap::new();
    updates.insert("happy".to_string(), LightSpec::new("#FFA500", 95, 0.8));
    updates.insert("sad".to_string(), LightSpec::new("#0000FF", 150, 2.0));
    updates.insert("disgust".to_string(), LightSpec::new("#556B2F", 60, 1.2));

    let report = table.set_bulk(updates);

    assert_eq!(report.applied.len(), 2);
    assert!(report.applied.contains(&label("happy")));
    assert!(report.applied.contains(&label("disgust")));
    assert_eq!(report.rejected.len(), 1);
    assert!(report.rejected["sad"].contains("150"));
    assert!(!report.is_complete());

    assert_eq!(
        table.get(&label("happy")).unwrap().color().to_string(),
        "#FFA500"
    );
    assert_eq!(table.get(&label("sad")).unwrap(), sad_before);
    assert!(table.get(&label("disgust")).is_some());
    assert_eq!(table.len(), 7);
}

#[test]
fn test_snapshot_is_sorted() {
    let table = MappingTable::with_defaults();
    let labels: Vec<String> = table
        .snapshot()
        .keys()
        .map(|l| l.as_str().to_string())
        .collect();

    assert_eq!(
        labels,
        vec!["angry", "fear", "happy", "neutral", "sad", "surprise"]
    );
}

#[tokio::test]
async fn test_console_sink_remembers_state() {
    let sink = ConsoleLightSink::new();
    assert!(sink.current_state().is_none());

    let state = LightState::new("#4169E1", 50, 2.0).unwrap();
    sink.apply(&state).await.unwrap();

    assert_eq!(sink.current_state(), Some(state));
    assert_eq!(sink.name(), "console");
}

#[tokio::test]
async fn test_recording_sink() {
    let sink = RecordingLightSink::new();
    let state = LightState::new("#FF0000", 80, 0.5).unwrap();

    sink.apply(&state).await.unwrap();
    sink.set_failing(true);
    assert!(sink.apply(&state).await.is_err());

    assert_eq!(sink.apply_count(), 1);
    assert_eq!(sink.current_state(), Some(state));
}
