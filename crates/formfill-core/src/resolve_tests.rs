use super::*;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use formfill_config::RateLimitConfig;
use formfill_protocols::dom::ElementId;
use formfill_protocols::types::{FieldSource, TextKind, ToggleKind};

use crate::clock::ManualClock;
use crate::context::FormPurpose;
use crate::profile::BasicInfo;
use crate::store::{MemoryStore, RATE_LIMIT_KEY, USAGE_STATS_KEY};

/// Replies from a script, in order, and counts calls.
struct ScriptedClassifier {
    replies: parking_lot::Mutex<VecDeque<Result<String, ClassifierError>>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn new(replies: Vec<Result<&str, ClassifierError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: parking_lot::Mutex::new(
                replies
                    .into_iter()
                    .map(|r| r.map(str::to_string))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClassifier for ScriptedClassifier {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, _request: ClassificationRequest) -> Result<String, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(ClassifierError::Network("script exhausted".to_string())))
    }
}

/// Records what the store holds at the moment the call is made.
struct StoreWatchingClassifier {
    store: Arc<MemoryStore>,
    seen: parking_lot::Mutex<Vec<(Option<serde_json::Value>, Option<serde_json::Value>)>>,
}

#[async_trait]
impl ChatClassifier for StoreWatchingClassifier {
    fn id(&self) -> &str {
        "watching"
    }

    async fn complete(&self, _request: ClassificationRequest) -> Result<String, ClassifierError> {
        let stats = self.store.get(USAGE_STATS_KEY).await.unwrap();
        let rate = self.store.get(RATE_LIMIT_KEY).await.unwrap();
        self.seen.lock().push((stats, rate));
        Err(ClassifierError::Network("connection reset".to_string()))
    }
}

fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
    ))
}

fn limits(per_minute: u32, per_day: u32) -> RateLimitConfig {
    RateLimitConfig {
        max_calls_per_minute: per_minute,
        max_calls_per_day: per_day,
    }
}

fn resolver_with(
    classifier: Option<Arc<ScriptedClassifier>>,
    limits: RateLimitConfig,
    clock: Arc<ManualClock>,
) -> (ValueResolver, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let usage = UsageTracker::new(limits, clock);
    let classifier = classifier.map(|c| c as Arc<dyn ChatClassifier>);
    (ValueResolver::new(classifier, usage, store.clone()), store)
}

fn text(kind: TextKind, name: &str) -> FieldDescriptor {
    FieldDescriptor {
        element: ElementId(1),
        control: FieldControl::Text { kind },
        identifier: name.to_string(),
        placeholder: String::new(),
        label: String::new(),
        required: false,
        current_value: String::new(),
        source: FieldSource::MainPage,
    }
}

fn select(name: &str, values: &[&str]) -> FieldDescriptor {
    FieldDescriptor {
        control: FieldControl::Selection {
            options: values
                .iter()
                .map(|v| SelectOption {
                    value: v.to_string(),
                    text: v.to_string(),
                })
                .collect(),
        },
        ..text(TextKind::Text, name)
    }
}

fn profile() -> UserProfile {
    UserProfile {
        basic: BasicInfo {
            first_name: "Jane".to_string(),
            email: "jane@x.com".to_string(),
            ..BasicInfo::default()
        },
        ..UserProfile::default()
    }
}

fn page() -> PageContext {
    PageContext {
        url: "https://x.com/contact".to_string(),
        title: "Contact".to_string(),
        form_purpose: FormPurpose::Contact,
        analyzed_purpose: None,
    }
}

#[tokio::test]
async fn test_no_classifier_uses_rules() {
    let (resolver, _) = resolver_with(None, limits(20, 1000), clock());
    let result = resolver
        .resolve(&text(TextKind::Text, "user_email"), &profile(), &page())
        .await;
    assert_eq!(result.value, "jane@x.com");
    assert_eq!(result.source, ResolutionSource::Rule("email".to_string()));
    assert!(!resolver.is_configured());
}

#[tokio::test]
async fn test_confident_classifier_wins() {
    let classifier = ScriptedClassifier::new(vec![Ok(
        r#"{"value": "jane.roe@work.com", "confidence": 0.95, "reasoning": "work email"}"#,
    )]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(20, 1000), clock());

    let result = resolver
        .resolve(&text(TextKind::Email, "email"), &profile(), &page())
        .await;
    assert_eq!(result.value, "jane.roe@work.com");
    assert_eq!(result.source, ResolutionSource::Classifier);
    assert_eq!(result.rationale, "work email");
    assert_eq!(classifier.calls(), 1);
}

#[tokio::test]
async fn test_low_confidence_falls_back() {
    let classifier =
        ScriptedClassifier::new(vec![Ok(r#"{"value": "maybe@x.com", "confidence": 0.7}"#)]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(20, 1000), clock());

    // equal to the threshold is not enough
    let result = resolver
        .resolve(&text(TextKind::Email, "email"), &profile(), &page())
        .await;
    assert_eq!(result.value, "jane@x.com");
    assert_eq!(classifier.calls(), 1);

    let report = resolver.usage_report().await;
    assert_eq!(report.stats.successful_calls, 1);
}

#[tokio::test]
async fn test_custom_threshold() {
    let classifier =
        ScriptedClassifier::new(vec![Ok(r#"{"value": "maybe@x.com", "confidence": 0.7}"#)]);
    let (resolver, _) = resolver_with(Some(classifier), limits(20, 1000), clock());
    let resolver = resolver.with_threshold(0.5);

    let result = resolver
        .resolve(&text(TextKind::Email, "email"), &profile(), &page())
        .await;
    assert_eq!(result.value, "maybe@x.com");
}

#[tokio::test]
async fn test_classifier_errors_degrade_and_count_as_failures() {
    let classifier = ScriptedClassifier::new(vec![
        Err(ClassifierError::from_status(401, "bad key".to_string())),
        Err(ClassifierError::from_status(429, "slow".to_string())),
        Ok("this is not json"),
    ]);
    let (resolver, store) = resolver_with(Some(classifier.clone()), limits(20, 1000), clock());

    for _ in 0..3 {
        let result = resolver
            .resolve(&text(TextKind::Text, "user_email"), &profile(), &page())
            .await;
        assert_eq!(result.value, "jane@x.com");
    }

    assert_eq!(classifier.calls(), 3);
    let report = resolver.usage_report().await;
    assert_eq!(report.stats.total_calls, 3);
    assert_eq!(report.stats.failed_calls, 3);
    assert!(report.is_configured);

    let persisted = store.get(USAGE_STATS_KEY).await.unwrap().unwrap();
    assert_eq!(persisted["failedCalls"], 3);
}

#[tokio::test]
async fn test_exhausted_minute_budget_makes_no_call() {
    let clock = clock();
    let classifier = ScriptedClassifier::new(vec![
        Ok(r#"{"value": "a@x.com", "confidence": 0.9}"#),
        Ok(r#"{"value": "b@x.com", "confidence": 0.9}"#),
    ]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(1, 1000), clock.clone());
    let field = text(TextKind::Email, "email");

    let first = resolver.resolve(&field, &profile(), &page()).await;
    assert_eq!(first.value, "a@x.com");

    let second = resolver.resolve(&field, &profile(), &page()).await;
    assert_eq!(second.value, "jane@x.com");
    assert_eq!(classifier.calls(), 1);

    // a new window opens once more than a minute has passed
    clock.advance(Duration::seconds(61));
    let third = resolver.resolve(&field, &profile(), &page()).await;
    assert_eq!(third.value, "b@x.com");
    assert_eq!(classifier.calls(), 2);
}

#[tokio::test]
async fn test_exhausted_daily_budget_makes_no_call() {
    let classifier = ScriptedClassifier::new(vec![Ok(r#"{"value": "a@x.com", "confidence": 0.9}"#)]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(20, 0), clock());

    let result = resolver
        .resolve(&text(TextKind::Email, "email"), &profile(), &page())
        .await;
    assert_eq!(result.value, "jane@x.com");
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_select_accepts_exact_option() {
    let classifier =
        ScriptedClassifier::new(vec![Ok(r#"{"selectedOption": "red", "confidence": 0.2}"#)]);
    let (resolver, _) = resolver_with(Some(classifier), limits(20, 1000), clock());

    // selections have no confidence threshold
    let result = resolver
        .resolve(&select("color", &["", "green", "red"]), &profile(), &page())
        .await;
    assert_eq!(result.value, "red");
    assert_eq!(result.source, ResolutionSource::Classifier);
}

#[tokio::test]
async fn test_select_rejects_unknown_option() {
    let classifier = ScriptedClassifier::new(vec![Ok(
        r#"{"selectedOption": "Blue", "confidence": 0.99}"#,
    )]);
    let (resolver, _) = resolver_with(Some(classifier), limits(20, 1000), clock());

    let result = resolver
        .resolve(&select("color", &["", "green", "red"]), &profile(), &page())
        .await;
    assert_eq!(result.value, "green");
    assert_eq!(result.source, ResolutionSource::FirstOption);
}

#[tokio::test]
async fn test_select_without_valid_options_skips_classifier() {
    let classifier = ScriptedClassifier::new(vec![]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(20, 1000), clock());

    let result = resolver
        .resolve(&select("color", &["", "select-one"]), &profile(), &page())
        .await;
    assert!(result.is_empty());
    assert_eq!(classifier.calls(), 0);
}

#[tokio::test]
async fn test_toggle_fallback_is_empty() {
    let field = FieldDescriptor {
        control: FieldControl::Toggle {
            kind: ToggleKind::Checkbox,
        },
        ..text(TextKind::Text, "newsletter")
    };
    let (resolver, _) = resolver_with(None, limits(20, 1000), clock());
    assert!(resolver.resolve(&field, &profile(), &page()).await.is_empty());

    let classifier = ScriptedClassifier::new(vec![Ok(r#"{"value": "true", "confidence": 0.9}"#)]);
    let (resolver, _) = resolver_with(Some(classifier), limits(20, 1000), clock());
    assert_eq!(resolver.resolve(&field, &profile(), &page()).await.value, "true");
}

#[tokio::test]
async fn test_analyze_form() {
    let classifier = ScriptedClassifier::new(vec![Ok(
        r#"{"formType": "contact", "purpose": "sales enquiry", "suggestions": []}"#,
    )]);
    let (resolver, _) = resolver_with(Some(classifier.clone()), limits(20, 1000), clock());

    assert!(resolver.analyze_form(&[], &page()).await.is_none());
    assert_eq!(classifier.calls(), 0);

    let analysis = resolver
        .analyze_form(&[text(TextKind::Email, "email")], &page())
        .await
        .unwrap();
    assert_eq!(analysis.purpose, "sales enquiry");
    assert_eq!(resolver.usage_report().await.stats.total_calls, 1);
}

#[tokio::test]
async fn test_reserved_call_is_saved_before_sending() {
    let store = Arc::new(MemoryStore::new());
    let classifier = Arc::new(StoreWatchingClassifier {
        store: store.clone(),
        seen: parking_lot::Mutex::new(Vec::new()),
    });
    let resolver = ValueResolver::new(
        Some(classifier.clone() as Arc<dyn ChatClassifier>),
        UsageTracker::new(limits(20, 1000), clock()),
        store.clone(),
    );

    resolver
        .resolve(&text(TextKind::Text, "user_email"), &profile(), &page())
        .await;

    let seen = classifier.seen.lock();
    assert_eq!(seen.len(), 1);
    let (stats, rate) = &seen[0];
    let stats = stats.as_ref().expect("usage saved before the call");
    assert_eq!(stats["totalCalls"], 1);
    assert_eq!(stats["dailyCalls"], 1);
    assert_eq!(stats["failedCalls"], 0);
    assert_eq!(rate.as_ref().unwrap()["callsThisMinute"], 1);

    let after = store.get(USAGE_STATS_KEY).await.unwrap().unwrap();
    assert_eq!(after["failedCalls"], 1);
}
