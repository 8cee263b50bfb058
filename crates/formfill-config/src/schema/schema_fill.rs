//! Fill, extraction and storage configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Writer and auto-fill timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillConfig {
    /// Delay before an automatic fill once the page is ready.
    #[serde(default = "default_auto_fill_delay_ms")]
    pub auto_fill_delay_ms: u64,

    /// How long the "just filled" highlight stays on an element.
    #[serde(default = "default_highlight_ms")]
    pub highlight_ms: u64,
}

fn default_auto_fill_delay_ms() -> u64 {
    2000
}

fn default_highlight_ms() -> u64 {
    3000
}

impl Default for FillConfig {
    fn default() -> Self {
        Self {
            auto_fill_delay_ms: default_auto_fill_delay_ms(),
            highlight_ms: default_highlight_ms(),
        }
    }
}

/// Field extraction switches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Require an element to pass the style check AND intersect the
    /// viewport. Off by default: either one is enough.
    #[serde(default)]
    pub strict_visibility: bool,
}

/// Persisted state location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON state file. Defaults to `~/.formfill/state.json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl StorageConfig {
    /// Resolved state file path with `~` expanded.
    pub fn resolved_path(&self) -> PathBuf {
        match &self.path {
            Some(path) => PathBuf::from(shellexpand::tilde(path).to_string()),
            None => dirs::home_dir()
                .map(|h| h.join(".formfill").join("state.json"))
                .unwrap_or_else(|| PathBuf::from(".formfill/state.json")),
        }
    }
}
