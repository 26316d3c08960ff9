//! Schedule of waits before each result request.

use std::time::Duration;

use crate::error::{LensError, LensResult};

/// The single wait the web form used before fetching a result.
pub const LEGACY_DELAY: Duration = Duration::from_secs(120);

/// Exponential backoff between result requests.
///
/// Attempt `n` (1-based) is issued after
/// `min(initial_delay * multiplier^(n-1), max_delay)`.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(15),
            multiplier: 2.0,
            max_delay: Duration::from_secs(60),
            max_attempts: 12,
        }
    }
}

impl PollPolicy {
    /// One request after a fixed wait.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: 1,
        }
    }

    /// Wait before attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        let capped = secs.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// All waits, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..=self.max_attempts).map(move |attempt| self.delay_for(attempt))
    }

    /// Sum of every wait; an upper bound on how long polling can idle.
    pub fn total_wait(&self) -> Duration {
        self.delays().sum()
    }

    pub fn validate(&self) -> LensResult<()> {
        if self.max_attempts == 0 {
            return Err(LensError::config("poll.max_attempts must be at least 1"));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(LensError::config(format!(
                "poll.multiplier must be a finite number >= 1.0, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }
}
