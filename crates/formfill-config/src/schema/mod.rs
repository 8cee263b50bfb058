//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

mod schema_fill;
mod schema_limits;

pub use schema_fill::*;
pub use schema_limits::*;

/// Placeholder key shipped in sample configs. Treated as "no key".
pub const API_KEY_PLACEHOLDER: &str = "YOUR_OPENAI_API_KEY_HERE";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub rate_limits: RateLimitConfig,

    #[serde(default)]
    pub fill: FillConfig,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// External classification call configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Chat-completion endpoint. Defaults to the OpenAI one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Text suggestions must score strictly above this to be used.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Spend one call per fill asking what the form is for.
    #[serde(default)]
    pub analyze_form_context: bool,
}

impl ClassifierConfig {
    /// Enabled and holding a real API key.
    pub fn is_configured(&self) -> bool {
        self.enabled
            && self
                .api_key
                .as_deref()
                .map(|key| !key.trim().is_empty() && key != API_KEY_PLACEHOLDER)
                .unwrap_or(false)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            api_key: None,
            api_url: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            confidence_threshold: default_confidence_threshold(),
            timeout_seconds: default_timeout_seconds(),
            analyze_form_context: false,
        }
    }
}

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_max_tokens() -> u32 {
    150
}

fn default_temperature() -> f32 {
    0.3
}

fn default_confidence_threshold() -> f32 {
    0.7
}

fn default_timeout_seconds() -> u64 {
    30
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
