use super::*;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.classifier.enabled);
    assert_eq!(config.classifier.model, "gpt-3.5-turbo");
    assert_eq!(config.classifier.max_tokens, 150);
    assert_eq!(config.rate_limits.max_calls_per_minute, 20);
    assert_eq!(config.rate_limits.max_calls_per_day, 1000);
    assert!(!config.extract.strict_visibility);
}

#[test]
fn test_classifier_thresholds_default() {
    let classifier = ClassifierConfig::default();
    assert!((classifier.confidence_threshold - 0.7).abs() < f32::EPSILON);
    assert!((classifier.temperature - 0.3).abs() < f32::EPSILON);
    assert_eq!(classifier.timeout_seconds, 30);
    assert!(!classifier.analyze_form_context);
}

#[test]
fn test_fill_config_default() {
    let fill = FillConfig::default();
    assert_eq!(fill.auto_fill_delay_ms, 2000);
    assert_eq!(fill.highlight_ms, 3000);
}

#[test]
fn test_is_configured_requires_key() {
    let mut classifier = ClassifierConfig::default();
    assert!(!classifier.is_configured());

    classifier.api_key = Some("sk-test".to_string());
    assert!(classifier.is_configured());
}

#[test]
fn test_is_configured_rejects_placeholder_and_blank() {
    let mut classifier = ClassifierConfig::default();
    classifier.api_key = Some(API_KEY_PLACEHOLDER.to_string());
    assert!(!classifier.is_configured());

    classifier.api_key = Some("   ".to_string());
    assert!(!classifier.is_configured());
}

#[test]
fn test_is_configured_respects_enabled_flag() {
    let mut classifier = ClassifierConfig::default();
    classifier.api_key = Some("sk-test".to_string());
    classifier.enabled = false;
    assert!(!classifier.is_configured());
}

#[test]
fn test_storage_path_explicit() {
    let storage = StorageConfig {
        path: Some("/var/lib/formfill/state.json".to_string()),
    };
    assert_eq!(
        storage.resolved_path(),
        std::path::PathBuf::from("/var/lib/formfill/state.json")
    );
}

#[test]
fn test_storage_path_default_ends_with_state_file() {
    let storage = StorageConfig::default();
    assert!(storage.resolved_path().ends_with(".formfill/state.json"));
}

#[test]
fn test_config_serialization_skips_missing_key() {
    let config = Config::default();
    let json = serde_json::to_string(&config).unwrap();
    assert!(json.contains("gpt-3.5-turbo"));
    assert!(!json.contains("api_key"));
}
