use super::*;

fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::path::PathBuf::from("target").join("settings_tests");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn missing_file_gives_defaults() {
    let path = temp_path("does_not_exist.json");
    let _ = std::fs::remove_file(&path);
    let s = EditorSettings::load(&path).unwrap();
    assert_eq!(s, EditorSettings::default());
    assert_eq!(s.auto_save_on_layer_change, SavePreference::Ask);
    assert!(s.include_generator_link);
}

#[test]
fn save_then_load_keeps_values() {
    let path = temp_path("roundtrip.json");
    let s = EditorSettings {
        auto_save_on_layer_change: SavePreference::NeverSave,
        include_generator_link: false,
    };
    s.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"autoSaveOnLayerChange\": \"never-save\""));
    assert_eq!(EditorSettings::load(&path).unwrap(), s);
}

#[test]
fn partial_file_fills_in_defaults() {
    let s: EditorSettings = serde_json::from_str(r#"{"includeGeneratorLink":false}"#).unwrap();
    assert_eq!(s.auto_save_on_layer_change, SavePreference::Ask);
    assert!(!s.include_generator_link);
}

#[test]
fn invalid_file_is_a_validation_error() {
    let path = temp_path("broken.json");
    std::fs::write(&path, "{\"autoSaveOnLayerChange\": \"sometimes\"}").unwrap();
    assert!(matches!(
        EditorSettings::load(&path),
        Err(GlyphstackError::Validation(_))
    ));
}

#[test]
fn reset_restores_single_field() {
    let mut s = EditorSettings {
        auto_save_on_layer_change: SavePreference::AlwaysSave,
        include_generator_link: false,
    };
    assert!(s.reset("includeGeneratorLink"));
    assert!(s.include_generator_link);
    assert_eq!(s.auto_save_on_layer_change, SavePreference::AlwaysSave);
    assert!(!s.reset("theme"));
}
