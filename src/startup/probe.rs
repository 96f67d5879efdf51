use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::{LivenessCheck, RetryPolicy};
use crate::error::DatabaseError;
use crate::metrics::ProbeMetrics;

/// Progress of the startup probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProbeState {
    /// No attempt made yet
    NotStarted = 0,
    /// An attempt is in flight
    Attempting = 1,
    /// The last attempt failed, waiting for the next one
    Retrying = 2,
    /// The database answered
    Succeeded = 3,
    /// Every attempt failed
    Exhausted = 4,
}

impl ProbeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeState::NotStarted => "not_started",
            ProbeState::Attempting => "attempting",
            ProbeState::Retrying => "retrying",
            ProbeState::Succeeded => "succeeded",
            ProbeState::Exhausted => "exhausted",
        }
    }
}

impl From<u8> for ProbeState {
    fn from(value: u8) -> Self {
        match value {
            1 => ProbeState::Attempting,
            2 => ProbeState::Retrying,
            3 => ProbeState::Succeeded,
            4 => ProbeState::Exhausted,
            _ => ProbeState::NotStarted,
        }
    }
}

/// Outcome of a successful probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSuccess {
    /// Attempts made, including the successful one
    pub attempts: u32,
    /// Server clock reported by the liveness query
    pub server_time: DateTime<Utc>,
}

/// Verifies the database is reachable before the rest of the process
/// depends on it.
///
/// Attempts run strictly one after another. Between two attempts the probe
/// sleeps for the policy's fixed delay without blocking the runtime. The
/// probe only reports the outcome; deciding to exit is up to the caller.
pub struct StartupProber {
    policy: RetryPolicy,
    state: AtomicU8,
}

impl StartupProber {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            state: AtomicU8::new(ProbeState::NotStarted as u8),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn state(&self) -> ProbeState {
        ProbeState::from(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: ProbeState) {
        self.state.store(state as u8, Ordering::Release);
        tracing::debug!(state = state.as_str(), "Startup probe state changed");
    }

    /// Probe `target` until it answers or the attempt budget runs out.
    ///
    /// On exhaustion the error of the final attempt is returned as is.
    #[tracing::instrument(
        name = "startup_probe",
        skip(self, target),
        fields(
            max_retries = self.policy.max_retries(),
            delay_ms = self.policy.delay().as_millis() as u64
        )
    )]
    pub async fn run<T>(&self, target: &T) -> Result<ProbeSuccess, DatabaseError>
    where
        T: LivenessCheck + ?Sized,
    {
        let max_retries = self.policy.max_retries();
        let mut attempt = 1;

        loop {
            self.set_state(ProbeState::Attempting);
            tracing::info!(
                attempt,
                max_retries,
                "Database connection attempt {}/{}",
                attempt,
                max_retries
            );

            let err = match target.check().await {
                Ok(server_time) => {
                    ProbeMetrics::record_success();
                    self.set_state(ProbeState::Succeeded);
                    tracing::info!(attempt, %server_time, "Database connected successfully");
                    return Ok(ProbeSuccess {
                        attempts: attempt,
                        server_time,
                    });
                }
                Err(err) => err,
            };

            ProbeMetrics::record_failure();

            let Some(delay) = self.policy.delay_after(attempt) else {
                self.set_state(ProbeState::Exhausted);
                tracing::error!(
                    attempts = attempt,
                    error = %err,
                    "Failed to connect to database after {} attempts",
                    attempt
                );
                return Err(err);
            };

            self.set_state(ProbeState::Retrying);
            tracing::warn!(
                attempt,
                max_retries,
                error = %err,
                retry_in_ms = delay.as_millis() as u64,
                "Database connection attempt failed, retrying"
            );
            ProbeMetrics::record_delay();
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

impl Default for StartupProber {
    fn default() -> Self {
        Self::new(RetryPolicy::default())
    }
}

/// Probe `target` with `max_retries` attempts spaced `delay` apart.
pub async fn connect_with_retry<T>(
    target: &T,
    max_retries: u32,
    delay: Duration,
) -> Result<ProbeSuccess, DatabaseError>
where
    T: LivenessCheck + ?Sized,
{
    StartupProber::new(RetryPolicy::new(max_retries, delay))
        .run(target)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_state_roundtrip() {
        for state in [
            ProbeState::NotStarted,
            ProbeState::Attempting,
            ProbeState::Retrying,
            ProbeState::Succeeded,
            ProbeState::Exhausted,
        ] {
            assert_eq!(ProbeState::from(state as u8), state);
        }
        assert_eq!(ProbeState::from(200), ProbeState::NotStarted);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(ProbeState::NotStarted.as_str(), "not_started");
        assert_eq!(ProbeState::Retrying.as_str(), "retrying");
        assert_eq!(ProbeState::Exhausted.as_str(), "exhausted");
    }

    #[test]
    fn test_new_prober_not_started() {
        let prober = StartupProber::default();
        assert_eq!(prober.state(), ProbeState::NotStarted);
        assert_eq!(prober.policy().max_retries(), 5);
    }
}
