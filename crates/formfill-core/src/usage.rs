//! Classification usage statistics and rate-limit budgets.
//!
//! Two budgets gate every classification call: a per-minute window that
//! resets once more than sixty seconds have passed since it opened, and a
//! per-day counter that resets when the UTC calendar date changes. A call
//! reserves its slot before it is sent, so a call that fails still spends
//! budget.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use formfill_config::RateLimitConfig;
use formfill_protocols::error::StoreError;
use formfill_protocols::store::KeyValueStore;

use crate::clock::Clock;
use crate::store::{RATE_LIMIT_KEY, USAGE_STATS_KEY};

/// Cumulative call counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UsageStats {
    pub total_calls: u64,
    pub successful_calls: u64,
    pub failed_calls: u64,
    pub last_call_time: Option<DateTime<Utc>>,
    pub daily_calls: u32,
    pub last_reset_date: Option<NaiveDate>,
}

/// The current per-minute window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RateLimitState {
    pub calls_this_minute: u32,
    pub last_minute_reset: Option<DateTime<Utc>>,
}

/// Outcome of a budget check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetCheck {
    Allowed,
    DailyExhausted,
    MinuteExhausted { retry_in_secs: i64 },
}

impl BudgetCheck {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Snapshot returned by the `getAIStatus` action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    #[serde(flatten)]
    pub stats: UsageStats,
    pub rate_limit: RateLimitState,
    pub max_calls_per_minute: u32,
    pub max_calls_per_day: u32,
    pub is_configured: bool,
}

const MINUTE_WINDOW_SECS: i64 = 60;

/// Owns the usage counters for one process.
pub struct UsageTracker {
    stats: UsageStats,
    rate: RateLimitState,
    limits: RateLimitConfig,
    clock: Arc<dyn Clock>,
}

impl UsageTracker {
    pub fn new(limits: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            stats: UsageStats::default(),
            rate: RateLimitState::default(),
            limits,
            clock,
        }
    }

    /// Restore counters from the store. Unreadable entries start from zero.
    pub async fn load(
        store: &dyn KeyValueStore,
        limits: RateLimitConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let mut tracker = Self::new(limits, clock);

        if let Some(value) = store.get(USAGE_STATS_KEY).await? {
            match serde_json::from_value(value) {
                Ok(stats) => tracker.stats = stats,
                Err(e) => warn!("Ignoring unreadable usage stats: {}", e),
            }
        }
        if let Some(value) = store.get(RATE_LIMIT_KEY).await? {
            match serde_json::from_value(value) {
                Ok(rate) => tracker.rate = rate,
                Err(e) => warn!("Ignoring unreadable rate-limit state: {}", e),
            }
        }

        tracker.roll_windows();
        Ok(tracker)
    }

    pub async fn persist(&self, store: &dyn KeyValueStore) -> Result<(), StoreError> {
        store
            .set(USAGE_STATS_KEY, serde_json::to_value(&self.stats)?)
            .await?;
        store
            .set(RATE_LIMIT_KEY, serde_json::to_value(&self.rate)?)
            .await
    }

    fn roll_windows(&mut self) {
        let now = self.clock.now();
        let today = now.date_naive();

        if self.stats.last_reset_date != Some(today) {
            if self.stats.daily_calls > 0 {
                debug!("New day, resetting daily call counter");
            }
            self.stats.daily_calls = 0;
            self.stats.last_reset_date = Some(today);
        }

        match self.rate.last_minute_reset {
            Some(opened) if now - opened <= Duration::seconds(MINUTE_WINDOW_SECS) => {}
            _ => {
                self.rate.calls_this_minute = 0;
                self.rate.last_minute_reset = Some(now);
            }
        }
    }

    /// Check both budgets without spending anything.
    pub fn check(&mut self) -> BudgetCheck {
        self.roll_windows();

        if self.stats.daily_calls >= self.limits.max_calls_per_day {
            return BudgetCheck::DailyExhausted;
        }
        if self.rate.calls_this_minute >= self.limits.max_calls_per_minute {
            let elapsed = self
                .rate
                .last_minute_reset
                .map(|opened| (self.clock.now() - opened).num_seconds())
                .unwrap_or(0);
            return BudgetCheck::MinuteExhausted {
                retry_in_secs: (MINUTE_WINDOW_SECS - elapsed).max(0),
            };
        }
        BudgetCheck::Allowed
    }

    /// Check both budgets and, if allowed, reserve one call.
    pub fn try_acquire(&mut self) -> BudgetCheck {
        let check = self.check();
        if check.is_allowed() {
            self.stats.total_calls += 1;
            self.stats.daily_calls += 1;
            self.stats.last_call_time = Some(self.clock.now());
            self.rate.calls_this_minute += 1;
        }
        check
    }

    /// Record how a reserved call ended.
    pub fn record_outcome(&mut self, success: bool) {
        if success {
            self.stats.successful_calls += 1;
        } else {
            self.stats.failed_calls += 1;
        }
    }

    pub fn stats(&self) -> &UsageStats {
        &self.stats
    }

    pub fn rate_limit(&self) -> &RateLimitState {
        &self.rate
    }

    pub fn report(&self, is_configured: bool) -> UsageReport {
        UsageReport {
            stats: self.stats.clone(),
            rate_limit: self.rate.clone(),
            max_calls_per_minute: self.limits.max_calls_per_minute,
            max_calls_per_day: self.limits.max_calls_per_day,
            is_configured,
        }
    }
}

#[cfg(test)]
#[path = "usage_tests.rs"]
mod tests;
