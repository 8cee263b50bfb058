//! CLI definitions for formfill.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// formfill CLI.
#[derive(Parser)]
#[command(name = "formfill")]
#[command(about = "Profile-driven web form filler")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// State file holding the profile and usage counters (overrides storage.path)
    #[arg(long, env = "FORMFILL_STATE", global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Fill every field of a captured page
    Fill {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Write the filled page, with its change log, here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only fill if the profile has auto-fill on, after the configured delay
        #[arg(long)]
        auto: bool,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// List the fields found on a page
    Analyze {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },

    /// Report embedded frames and their field counts
    Frames {
        /// Page snapshot (JSON)
        page: PathBuf,
    },

    /// Show classifier usage and budgets
    Stats,

    /// Check that the pipeline is ready
    Ping,

    /// Profile management commands
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum ProfileAction {
    /// Show a profile summary
    Show {
        /// Print the full profile as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the profile as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the profile with an exported one
    Import {
        /// Profile JSON file
        file: PathBuf,
    },

    /// Show the profile completion score
    Score,
}

#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Validate the configuration file
    Check,

    /// Print the effective configuration
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill() {
        let cli = Cli::try_parse_from(["formfill", "fill", "page.json", "-o", "out.json"]).unwrap();
        match cli.command {
            Commands::Fill {
                page, output, auto, ..
            } => {
                assert_eq!(page, PathBuf::from("page.json"));
                assert_eq!(output, Some(PathBuf::from("out.json")));
                assert!(!auto);
            }
            _ => panic!("expected fill"),
        }
        assert_eq!(cli.config, PathBuf::from("config/default.toml"));
    }

    #[test]
    fn test_parse_profile_import_with_global_config() {
        let cli = Cli::try_parse_from([
            "formfill",
            "profile",
            "import",
            "me.json",
            "--config",
            "custom.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("custom.toml"));
        assert!(matches!(
            cli.command,
            Commands::Profile {
                action: ProfileAction::Import { .. }
            }
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["formfill"]).is_err());
    }
}
