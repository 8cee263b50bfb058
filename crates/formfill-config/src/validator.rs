//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// First error as a [`ConfigError`], for callers that want to bail.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(ConfigError::InvalidValue {
                field: err.path,
                message: err.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_classifier(config, &mut result);
        Self::validate_rate_limits(config, &mut result);
        Self::validate_fill(config, &mut result);

        result
    }

    fn validate_classifier(config: &Config, result: &mut ValidationResult) {
        let classifier = &config.classifier;

        if !(0.0..=1.0).contains(&classifier.confidence_threshold) {
            result.add_error(ValidationError::new(
                "classifier.confidence_threshold",
                "confidence_threshold must be between 0 and 1",
            ));
        }

        if !(0.0..=2.0).contains(&classifier.temperature) {
            result.add_error(ValidationError::new(
                "classifier.temperature",
                "temperature must be between 0 and 2",
            ));
        }

        if classifier.model.trim().is_empty() {
            result.add_error(ValidationError::new(
                "classifier.model",
                "model cannot be empty",
            ));
        }

        if classifier.max_tokens == 0 {
            result.add_error(ValidationError::new(
                "classifier.max_tokens",
                "max_tokens must be greater than 0",
            ));
        }

        if classifier.timeout_seconds == 0 {
            result.add_error(ValidationError::new(
                "classifier.timeout_seconds",
                "timeout_seconds must be greater than 0",
            ));
        }

        if let Some(ref url) = classifier.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                result.add_error(ValidationError::new(
                    "classifier.api_url",
                    "api_url must start with http:// or https://",
                ));
            }
        }

        if classifier.enabled && !classifier.is_configured() {
            result.add_warning(ValidationWarning::new(
                "classifier.api_key",
                "Classifier enabled but no API key set, every field will use fallback rules",
            ));
        }
    }

    fn validate_rate_limits(config: &Config, result: &mut ValidationResult) {
        let limits = &config.rate_limits;

        if limits.max_calls_per_minute == 0 || limits.max_calls_per_day == 0 {
            result.add_warning(ValidationWarning::new(
                "rate_limits",
                "A zero budget blocks every classification call",
            ));
        }

        if limits.max_calls_per_minute > limits.max_calls_per_day {
            result.add_warning(ValidationWarning::new(
                "rate_limits.max_calls_per_minute",
                "Per-minute budget exceeds the daily budget",
            ));
        }
    }

    fn validate_fill(config: &Config, result: &mut ValidationResult) {
        if config.fill.highlight_ms > 60_000 {
            result.add_warning(ValidationWarning::new(
                "fill.highlight_ms",
                "highlight_ms is over a minute, filled fields will stay highlighted for a long time",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
