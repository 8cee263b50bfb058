//! Configuration loader.

use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::schema::Config;

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a file, or defaults if the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => Ok(Config::default()),
            other => other,
        }
    }

    /// Load configuration from a string.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let config: Config = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Expand environment variables in the format `${VAR}`. Comment lines
    /// are left alone.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
        let mut lines = Vec::new();

        for line in content.lines() {
            if line.trim_start().starts_with('#') {
                lines.push(line.to_string());
                continue;
            }
            let mut expanded = line.to_string();
            for cap in re.captures_iter(line) {
                let var_name = &cap[1];
                let var_value = std::env::var(var_name)
                    .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
                expanded = expanded.replace(&cap[0], &var_value);
            }
            lines.push(expanded);
        }

        Ok(lines.join("\n"))
    }

    /// Expand shell-style paths (e.g., `~/.formfill`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_empty_config() {
        let config = ConfigLoader::load_str("").unwrap();
        assert_eq!(config.rate_limits.max_calls_per_minute, 20);
    }

    #[test]
    fn test_load_classifier_section() {
        let content = r#"
            [classifier]
            api_key = "sk-test"
            model = "gpt-4o-mini"
            confidence_threshold = 0.8
            analyze_form_context = true
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.classifier.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.classifier.model, "gpt-4o-mini");
        assert!(config.classifier.analyze_form_context);
        assert!(config.classifier.is_configured());
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
            [rate_limits]
            max_calls_per_minute = 5
            max_calls_per_day = 50

            [fill]
            highlight_ms = 500

            [extract]
            strict_visibility = true

            [storage]
            path = "/tmp/formfill.json"
        "#;
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.rate_limits.max_calls_per_minute, 5);
        assert_eq!(config.rate_limits.max_calls_per_day, 50);
        assert_eq!(config.fill.highlight_ms, 500);
        assert_eq!(config.fill.auto_fill_delay_ms, 2000);
        assert!(config.extract.strict_visibility);
        assert_eq!(config.storage.path.as_deref(), Some("/tmp/formfill.json"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[rate_limits]").unwrap();
        writeln!(file, "max_calls_per_day = 7").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.rate_limits.max_calls_per_day, 7);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = ConfigLoader::load(Path::new("/nonexistent/path/formfill.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_or_default_nonexistent_file() {
        let config =
            ConfigLoader::load_or_default(Path::new("/nonexistent/path/formfill.toml")).unwrap();
        assert_eq!(config.classifier.max_tokens, 150);
    }

    #[test]
    fn test_load_invalid_toml() {
        let content = "invalid = [unclosed";
        let result = ConfigLoader::load_str(content);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_env_vars() {
        // SAFETY: This test runs in isolation and sets a unique test-only env var
        unsafe {
            std::env::set_var("FORMFILL_TEST_CONFIG_VAR", "sk-from-env");
        }
        let content = "[classifier]\napi_key = \"${FORMFILL_TEST_CONFIG_VAR}\"";
        let config = ConfigLoader::load_str(content).unwrap();
        assert_eq!(config.classifier.api_key.as_deref(), Some("sk-from-env"));
        unsafe {
            std::env::remove_var("FORMFILL_TEST_CONFIG_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_not_set() {
        let content = "value = \"${NONEXISTENT_FORMFILL_VAR_12345}\"";
        let result = ConfigLoader::expand_env_vars(content);
        assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
    }

    #[test]
    fn test_expand_env_vars_skips_comments() {
        let content = "# api_key = \"${NONEXISTENT_FORMFILL_VAR_12345}\"\nmodel = \"m\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_env_vars_no_vars() {
        let content = "value = \"no variables here\"";
        let expanded = ConfigLoader::expand_env_vars(content).unwrap();
        assert_eq!(expanded, content);
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = ConfigLoader::expand_path("~/test");
        assert!(!expanded.starts_with('~'));
        assert!(expanded.ends_with("/test"));
    }
}
