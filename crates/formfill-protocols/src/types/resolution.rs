//! Per-field resolution results.

use serde::{Deserialize, Serialize};

/// Which path produced a resolved value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Accepted classifier suggestion.
    Classifier,
    /// A fallback rule matched; carries the rule name.
    Rule(String),
    /// A contextual option rule matched; carries the rule name.
    ContextualOption(String),
    /// First valid option of a selection field.
    FirstOption,
    /// Type-appropriate generic default.
    Default,
    /// Selection field without any valid option.
    NoOptions,
}

/// The value chosen for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub value: String,
    /// Confidence in 0..=1.
    pub confidence: f32,
    pub rationale: String,
    pub source: ResolutionSource,
}

impl ResolutionResult {
    pub fn new(
        value: impl Into<String>,
        confidence: f32,
        rationale: impl Into<String>,
        source: ResolutionSource,
    ) -> Self {
        Self {
            value: value.into(),
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
            source,
        }
    }

    /// Empty values are never written.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}
