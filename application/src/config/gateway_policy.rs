//! Gateway policy: timeouts, retries and the concurrency ceiling.

use std::time::Duration;

/// Policy applied by [`ModelGateway`](crate::gateway::ModelGateway) to every
/// model invocation.
///
/// # Backoff
///
/// Attempt `n` (1-based) that fails transiently waits
/// `min(cap, base * 2^(n-1))`, scaled by a jitter factor in `[0.5, 1.0]`
/// when `jitter` is on. A provider `retry_after` hint raises the delay but
/// never past `backoff_cap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPolicy {
    /// Timeout for a single attempt.
    pub call_timeout: Duration,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
    /// Maximum attempts in flight across the whole process.
    pub max_concurrency: usize,
    pub jitter: bool,
}

impl Default for GatewayPolicy {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(30),
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            backoff_cap: Duration::from_secs(8),
            max_concurrency: 4,
            jitter: true,
        }
    }
}

impl GatewayPolicy {
    // ==================== Builder Methods ====================

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, base: Duration, cap: Duration) -> Self {
        self.backoff_base = base;
        self.backoff_cap = cap;
        self
    }

    pub fn with_max_concurrency(mut self, permits: usize) -> Self {
        self.max_concurrency = permits.max(1);
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    // ==================== Backoff ====================

    /// Delay before retrying after failed attempt `attempt` (1-based).
    ///
    /// `jitter_factor` is only applied when jitter is enabled and is clamped
    /// to `[0.5, 1.0]`.
    pub fn backoff_delay(
        &self,
        attempt: u32,
        retry_after: Option<Duration>,
        jitter_factor: f64,
    ) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let raw = self.backoff_base.saturating_mul(1u32 << exponent);
        let mut delay = raw.min(self.backoff_cap);

        if self.jitter {
            delay = delay.mul_f64(jitter_factor.clamp(0.5, 1.0));
        }
        if let Some(hint) = retry_after {
            delay = delay.max(hint);
        }
        delay.min(self.backoff_cap)
    }
}
