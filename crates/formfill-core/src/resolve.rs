//! Value resolution.
//!
//! Each field moves `Unresolved -> Classifying -> Resolved` when a classifier
//! is configured and both budgets have room, and `Unresolved -> FallbackOnly
//! -> Resolved` otherwise. A classifier reply that fails, does not parse, or
//! is not good enough drops to the fallback rules; nothing is surfaced.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use formfill_protocols::classifier::{ChatClassifier, ClassificationRequest};
use formfill_protocols::error::ClassifierError;
use formfill_protocols::store::KeyValueStore;
use formfill_protocols::types::{
    FieldControl, FieldDescriptor, ResolutionResult, ResolutionSource, SelectOption,
};

use crate::context::PageContext;
use crate::profile::UserProfile;
use crate::prompt::{self, FormAnalysis};
use crate::rules::{RuleSet, valid_options};
use crate::usage::{BudgetCheck, UsageReport, UsageTracker};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.7;

/// Where a field is in its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Unresolved,
    Classifying,
    FallbackOnly,
    Resolved,
}

pub struct ValueResolver {
    classifier: Option<Arc<dyn ChatClassifier>>,
    rules: RuleSet,
    threshold: f32,
    usage: Mutex<UsageTracker>,
    store: Arc<dyn KeyValueStore>,
}

impl ValueResolver {
    /// `usage` should be the tracker restored from `store`; it is written
    /// back there after every call.
    pub fn new(
        classifier: Option<Arc<dyn ChatClassifier>>,
        usage: UsageTracker,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self {
            classifier,
            rules: RuleSet::standard(),
            threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            usage: Mutex::new(usage),
            store,
        }
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.classifier.is_some()
    }

    pub async fn usage_report(&self) -> UsageReport {
        self.usage.lock().await.report(self.is_configured())
    }

    /// Decide the value for one field.
    pub async fn resolve(
        &self,
        field: &FieldDescriptor,
        profile: &UserProfile,
        page: &PageContext,
    ) -> ResolutionResult {
        debug!(
            field = %field.identifier,
            kind = field.kind_name(),
            phase = ?Phase::Unresolved,
            "Resolving field"
        );

        let result = match &field.control {
            FieldControl::Selection { options } => {
                self.resolve_selection(field, options, profile, page).await
            }
            FieldControl::Text { .. } | FieldControl::Toggle { .. } => {
                self.resolve_free(field, profile, page).await
            }
        };

        debug!(
            field = %field.identifier,
            phase = ?Phase::Resolved,
            source = ?result.source,
            "{}",
            result.rationale
        );
        result
    }

    async fn resolve_free(
        &self,
        field: &FieldDescriptor,
        profile: &UserProfile,
        page: &PageContext,
    ) -> ResolutionResult {
        let request = prompt::field_request(field, profile, page);
        if let Some(suggestion) = self.classify(request, prompt::parse_field_reply).await {
            if suggestion.value.is_empty() {
                debug!(field = %field.identifier, "Classifier returned no value");
            } else if suggestion.confidence > self.threshold {
                return ResolutionResult::new(
                    suggestion.value,
                    suggestion.confidence,
                    suggestion.reasoning,
                    ResolutionSource::Classifier,
                );
            } else {
                debug!(
                    field = %field.identifier,
                    confidence = suggestion.confidence,
                    threshold = self.threshold,
                    "Classifier confidence too low, using fallback"
                );
            }
        }

        self.rules.resolve(field, profile)
    }

    async fn resolve_selection(
        &self,
        field: &FieldDescriptor,
        options: &[SelectOption],
        profile: &UserProfile,
        page: &PageContext,
    ) -> ResolutionResult {
        let valid = valid_options(options);
        if valid.is_empty() {
            debug!(field = %field.identifier, "No valid options");
            return self.rules.resolve_option(field, &valid, profile);
        }

        let request = prompt::select_request(field, &valid, profile, page);
        let parse = |raw: &str| prompt::parse_select_reply(raw, &valid);
        if let Some(suggestion) = self.classify(request, parse).await {
            match suggestion.selected_option {
                Some(selected) => {
                    return ResolutionResult::new(
                        selected,
                        suggestion.confidence,
                        suggestion.reasoning,
                        ResolutionSource::Classifier,
                    );
                }
                None => debug!(
                    field = %field.identifier,
                    "Classifier suggested an option that is not available"
                ),
            }
        }

        self.rules.resolve_option(field, &valid, profile)
    }

    /// Ask what the form as a whole is for. Draws from the same budget.
    pub async fn analyze_form(
        &self,
        fields: &[FieldDescriptor],
        page: &PageContext,
    ) -> Option<FormAnalysis> {
        if fields.is_empty() {
            return None;
        }
        let request = prompt::form_context_request(fields, page);
        let analysis = self.classify(request, prompt::parse_form_reply).await?;
        info!(
            form_type = %analysis.form_type,
            purpose = %analysis.purpose,
            "Form context analyzed"
        );
        Some(analysis)
    }

    /// Enter `Classifying` if allowed, reserving one call from the budget.
    /// The counters are saved before any call goes out.
    async fn enter(&self) -> Phase {
        if self.classifier.is_none() {
            return Phase::FallbackOnly;
        }
        let mut usage = self.usage.lock().await;
        let check = usage.try_acquire();
        if let Err(e) = usage.persist(self.store.as_ref()).await {
            warn!("Failed to persist usage statistics: {}", e);
        }
        match check {
            BudgetCheck::Allowed => Phase::Classifying,
            BudgetCheck::DailyExhausted => {
                info!("Daily classification budget exhausted, using fallback rules");
                Phase::FallbackOnly
            }
            BudgetCheck::MinuteExhausted { retry_in_secs } => {
                info!(
                    retry_in_secs,
                    "Per-minute classification budget exhausted, using fallback rules"
                );
                Phase::FallbackOnly
            }
        }
    }

    /// One classification round trip. Any failure, including a reply that
    /// does not parse, counts as a failed call and yields `None`.
    async fn classify<T>(
        &self,
        request: ClassificationRequest,
        parse: impl FnOnce(&str) -> Result<T, ClassifierError>,
    ) -> Option<T> {
        let phase = self.enter().await;
        let Some(classifier) = self.classifier.as_ref().filter(|_| phase == Phase::Classifying)
        else {
            return None;
        };

        let outcome = classifier
            .complete(request)
            .await
            .and_then(|raw| parse(&raw));

        {
            let mut usage = self.usage.lock().await;
            usage.record_outcome(outcome.is_ok());
            if let Err(e) = usage.persist(self.store.as_ref()).await {
                warn!("Failed to persist usage statistics: {}", e);
            }
        }

        match outcome {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log_classifier_error(classifier.id(), &e);
                None
            }
        }
    }
}

fn log_classifier_error(id: &str, error: &ClassifierError) {
    match error {
        ClassifierError::Unauthorized(_) => {
            warn!(classifier = id, "Classifier rejected the API key, using fallback rules")
        }
        ClassifierError::QuotaExceeded(_) => {
            warn!(classifier = id, "Classifier quota exceeded, using fallback rules")
        }
        ClassifierError::RateLimited(_) => {
            warn!(classifier = id, "Classifier rate limit hit, using fallback rules")
        }
        other => warn!(classifier = id, "Classification failed: {}", other),
    }
}

#[cfg(test)]
#[path = "resolve_tests.rs"]
mod tests;
