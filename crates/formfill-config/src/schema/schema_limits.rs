//! Classification budget configuration.

use serde::{Deserialize, Serialize};

/// Hard ceilings on classification calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_max_calls_per_minute")]
    pub max_calls_per_minute: u32,

    #[serde(default = "default_max_calls_per_day")]
    pub max_calls_per_day: u32,
}

fn default_max_calls_per_minute() -> u32 {
    20
}

fn default_max_calls_per_day() -> u32 {
    1000
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_calls_per_minute: default_max_calls_per_minute(),
            max_calls_per_day: default_max_calls_per_day(),
        }
    }
}
