//! Config command handlers.

use std::path::Path;

use formfill_config::{Config, ConfigValidator};

use crate::cli::ConfigAction;
use crate::pipeline;

pub(crate) fn handle_config_command(
    config: &Config,
    path: &Path,
    state: Option<&Path>,
    action: ConfigAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Check => {
            let result = ConfigValidator::validate(config);
            if path.exists() {
                println!("Checking {}", path.display());
            } else {
                println!("{} not found, checking built-in defaults", path.display());
            }

            for warning in &result.warnings {
                println!("  warning: {}: {}", warning.path, warning.message);
            }
            for error in &result.errors {
                println!("  error:   {}: {}", error.path, error.message);
            }

            println!(
                "Classifier: {}",
                if config.classifier.is_configured() {
                    "configured"
                } else {
                    "not configured (fallback rules only)"
                }
            );
            println!(
                "State file: {}",
                pipeline::state_path(config, state).display()
            );

            result.into_result()?;
            println!("Configuration OK");
        }

        ConfigAction::Show => {
            let mut shown = config.clone();
            if shown.classifier.api_key.is_some() {
                shown.classifier.api_key = Some("********".to_string());
            }
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_defaults_passes() {
        let config = Config::default();
        handle_config_command(
            &config,
            Path::new("does/not/exist.toml"),
            None,
            ConfigAction::Check,
        )
        .unwrap();
    }

    #[test]
    fn test_check_rejects_bad_threshold() {
        let mut config = Config::default();
        config.classifier.confidence_threshold = 1.5;
        let result = handle_config_command(
            &config,
            Path::new("does/not/exist.toml"),
            None,
            ConfigAction::Check,
        );
        assert!(result.is_err());
    }
}
