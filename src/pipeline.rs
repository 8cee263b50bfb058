//! Wiring: config to store, classifier and message handler.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use formfill_classifier_openai::OpenAIClassifier;
use formfill_config::Config;
use formfill_core::{
    Clock, FieldExtractor, FieldWriter, FormFiller, JsonFileStore, MessageHandler,
    ProfileManager, SystemClock, UsageTracker, ValueResolver,
};
use formfill_protocols::{ChatClassifier, KeyValueStore};

/// State file: the `--state` override, else `storage.path`.
pub(crate) fn state_path(config: &Config, state: Option<&Path>) -> PathBuf {
    state
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.storage.resolved_path())
}

pub(crate) async fn open_store(
    config: &Config,
    state: Option<&Path>,
) -> Result<Arc<dyn KeyValueStore>, Box<dyn std::error::Error>> {
    let path = state_path(config, state);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let store = JsonFileStore::open(&path).await?;
    info!("Using state file {}", path.display());
    Ok(Arc::new(store))
}

/// Build a ready message handler from configuration.
pub(crate) async fn build_handler(
    config: &Config,
    state: Option<&Path>,
) -> Result<MessageHandler, Box<dyn std::error::Error>> {
    let store = open_store(config, state).await?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let classifier = OpenAIClassifier::from_config(&config.classifier)
        .map(|c| Arc::new(c) as Arc<dyn ChatClassifier>);
    match &classifier {
        Some(c) => info!("Classifier '{}' configured", c.id()),
        None => info!("Classifier not configured, using fallback rules only"),
    }

    let usage = UsageTracker::load(store.as_ref(), config.rate_limits, clock.clone()).await?;
    let resolver = ValueResolver::new(classifier, usage, store.clone())
        .with_threshold(config.classifier.confidence_threshold);

    let filler = FormFiller::new(
        FieldExtractor::new(config.extract.strict_visibility),
        resolver,
        FieldWriter::new(config.fill.highlight_ms),
        ProfileManager::with_clock(store, clock.clone()),
    )
    .with_clock(clock)
    .with_form_analysis(config.classifier.analyze_form_context)
    .with_auto_fill_delay(Duration::from_millis(config.fill.auto_fill_delay_ms));

    let mut handler = MessageHandler::new(filler);
    handler.mark_ready();
    Ok(handler)
}

#[cfg(test)]
mod tests {
    use super::*;
    use formfill_core::Request;

    #[test]
    fn test_state_override_wins() {
        let config = Config::default();
        let path = state_path(&config, Some(Path::new("/tmp/x.json")));
        assert_eq!(path, PathBuf::from("/tmp/x.json"));
    }

    #[tokio::test]
    async fn test_build_handler_without_key_is_rules_only() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join("nested").join("state.json");
        let config = Config::default();

        let mut handler = build_handler(&config, Some(&state)).await.unwrap();
        assert!(handler.is_ready());
        assert!(!handler.filler().resolver().is_configured());

        let mut page = formfill_core::PageSnapshot::new("u", "t");
        let status = handler.handle(Request::GetAiStatus, &mut page).await.unwrap();
        let json = serde_json::to_value(status).unwrap();
        assert_eq!(json["stats"]["maxCallsPerMinute"], 20);
    }
}
