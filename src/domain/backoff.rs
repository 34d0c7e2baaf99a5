//! Bounded reconnect backoff.
//!
//! [`ReconnectPolicy`] holds the ceiling and the linear-with-cap delay
//! curve. [`RetryCounter`] is the mutable counter the connection manager
//! advances on every unexpected close.

use std::time::Duration;

/// Retry ceiling and delay curve for automatic reconnects.
///
/// The n-th retry (1-based) waits `min(n * step, max_delay)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    ceiling: u32,
    step: Duration,
    max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(5, Duration::from_millis(2_000), Duration::from_millis(10_000))
    }
}

impl ReconnectPolicy {
    /// Creates a policy with the given ceiling, step and cap.
    #[must_use]
    pub const fn new(ceiling: u32, step: Duration, max_delay: Duration) -> Self {
        Self {
            ceiling,
            step,
            max_delay,
        }
    }

    /// Maximum number of automatic retries.
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Delay before the given 1-based retry, or `None` when the attempt
    /// lies outside `1..=ceiling`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.ceiling {
            return None;
        }
        Some(self.step.saturating_mul(attempt).min(self.max_delay))
    }
}

/// Number of consecutive unexpected closes since the last success.
///
/// Never exceeds the policy ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryCounter(u32);

impl RetryCounter {
    /// Current value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Back to zero.
    pub fn reset(&mut self) {
        self.0 = 0;
    }

    /// Returns `true` once no further retry is allowed under `policy`.
    #[must_use]
    pub const fn is_exhausted(self, policy: &ReconnectPolicy) -> bool {
        self.0 >= policy.ceiling
    }

    /// Consumes one retry, returning the new attempt number and its delay,
    /// or `None` (without incrementing) when the ceiling has been reached.
    pub fn advance(&mut self, policy: &ReconnectPolicy) -> Option<(u32, Duration)> {
        if self.is_exhausted(policy) {
            return None;
        }
        self.0 += 1;
        policy.delay_for(self.0).map(|delay| (self.0, delay))
    }
}
