//! Gateway configuration from TOML (`[gateway]` section)
//!
//! ```toml
//! [gateway]
//! timeout_secs = 30       # per attempt
//! max_attempts = 3        # including the first
//! backoff_base_ms = 500
//! backoff_cap_ms = 8000
//! max_concurrency = 4     # attempts in flight, process-wide
//! jitter = true
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use superposition_application::GatewayPolicy;
use superposition_domain::{ConfigIssue, ConfigIssueCode};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileGatewayConfig {
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_cap_ms: u64,
    pub max_concurrency: usize,
    pub jitter: bool,
}

impl Default for FileGatewayConfig {
    fn default() -> Self {
        let policy = GatewayPolicy::default();
        Self {
            timeout_secs: policy.call_timeout.as_secs(),
            max_attempts: policy.max_attempts,
            backoff_base_ms: policy.backoff_base.as_millis() as u64,
            backoff_cap_ms: policy.backoff_cap.as_millis() as u64,
            max_concurrency: policy.max_concurrency,
            jitter: policy.jitter,
        }
    }
}

impl FileGatewayConfig {
    /// Convert to a [`GatewayPolicy`], replacing invalid values by defaults.
    pub fn to_policy(&self) -> (GatewayPolicy, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let defaults = GatewayPolicy::default();
        let mut policy = defaults.clone();

        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "gateway.timeout_secs: must be at least 1",
            ));
        } else {
            policy.call_timeout = Duration::from_secs(self.timeout_secs);
        }

        if self.max_attempts == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "gateway.max_attempts: must be at least 1",
            ));
        } else {
            policy = policy.with_max_attempts(self.max_attempts);
        }

        if self.max_concurrency == 0 {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::OutOfRange,
                "gateway.max_concurrency: must be at least 1",
            ));
        } else {
            policy = policy.with_max_concurrency(self.max_concurrency);
        }

        let base = Duration::from_millis(self.backoff_base_ms);
        let mut cap = Duration::from_millis(self.backoff_cap_ms);
        if cap < base {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::OutOfRange,
                format!(
                    "gateway.backoff_cap_ms ({}) is below backoff_base_ms ({}); using the base as cap",
                    self.backoff_cap_ms, self.backoff_base_ms
                ),
            ));
            cap = base;
        }
        policy = policy.with_backoff(base, cap).with_jitter(self.jitter);

        (policy, issues)
    }
}
