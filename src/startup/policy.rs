//! Fixed-delay retry budget for the startup probe

use std::time::Duration;

use crate::config::StartupConfig;

/// Attempt budget and the constant pause between attempts.
///
/// Unlike an exponential backoff the delay never grows and carries no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT_MAX_RETRIES: u32 = 5;
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(2000);

    /// A budget of zero attempts is raised to one.
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries: max_retries.max(1),
            delay,
        }
    }

    /// Total number of attempts, including the first one
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Pause to take after `attempt` (1-based) failed, or `None` when that
    /// was the last allowed attempt.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries {
            None
        } else {
            Some(self.delay)
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RETRIES, Self::DEFAULT_DELAY)
    }
}

impl From<&StartupConfig> for RetryPolicy {
    fn from(config: &StartupConfig) -> Self {
        Self::new(config.max_retries, config.retry_delay())
    }
}
