//! Restart backoff after fatal playback failures

use hype_common::config::RestartConfig;
use std::time::Duration;

/// Whether and how fast the scheduler is restarted after a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestartPolicy {
    pub enabled: bool,
    pub delay: Duration,
    pub max_delay: Duration,
    /// Consecutive restarts before playback stays halted
    pub max_attempts: u32,
}

impl RestartPolicy {
    pub fn new(delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            enabled: true,
            delay,
            max_delay,
            max_attempts,
        }
    }

    /// Halt on the first failure
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::from(&RestartConfig::default())
        }
    }

    pub fn from_config(restart_on_error: bool, config: &RestartConfig) -> Self {
        Self {
            enabled: restart_on_error,
            ..Self::from(config)
        }
    }

    /// Delay before restart number `attempt` (1-based), doubling up to
    /// `max_delay`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let doublings = attempt.saturating_sub(1).min(31);
        self.delay
            .saturating_mul(1u32 << doublings)
            .min(self.max_delay)
    }
}

impl From<&RestartConfig> for RestartPolicy {
    fn from(config: &RestartConfig) -> Self {
        Self::new(config.delay(), config.max_delay(), config.max_attempts)
    }
}
