//! Bounded exponential backoff

use std::time::Duration;

use rand::Rng;

use crate::config::BackoffConfig;

/// Tracks consecutive failures and yields the delay before the next retry
#[derive(Debug, Clone)]
pub struct Backoff {
    config: BackoffConfig,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config, attempt: 0 }
    }

    /// Consecutive failures recorded since the last reset
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Record a failure and return the delay before retrying, or `None`
    /// once the failures exceed `max_attempts` retries.
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);
        if self
            .config
            .max_attempts
            .is_some_and(|max| self.attempt > max)
        {
            return None;
        }
        let ceiling = self.ceiling(self.attempt);
        if !self.config.jitter || ceiling.is_zero() {
            return Some(ceiling);
        }
        let millis = ceiling.as_millis() as u64;
        let jittered = rand::thread_rng().gen_range(millis / 2..=millis);
        Some(Duration::from_millis(jittered))
    }

    /// Delay for the given attempt before jitter: `initial * multiplier^(n-1)`
    /// capped at `max_delay_ms`.
    pub fn ceiling(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let raw = self.config.initial_delay_ms as f64 * self.config.multiplier.max(1.0).powi(exponent);
        let capped = raw.min(self.config.max_delay_ms as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Forget past failures after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(jitter: bool, max_attempts: Option<u32>) -> BackoffConfig {
        BackoffConfig {
            jitter,
            max_attempts,
            ..BackoffConfig::default()
        }
    }

    #[test]
    fn test_exponential_growth_is_capped() {
        let mut backoff = Backoff::new(config(false, None));
        let delays: Vec<u64> = (0..8)
            .map(|_| backoff.next_delay().unwrap().as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 16000, 30000, 30000]);
    }

    #[test]
    fn test_max_attempts() {
        let mut backoff = Backoff::new(config(false, Some(2)));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        backoff.reset();
        assert_eq!(backoff.attempt(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_jitter_stays_in_upper_half() {
        let mut backoff = Backoff::new(config(true, None));
        for attempt in 1..=10 {
            let delay = backoff.next_delay().unwrap();
            let ceiling = backoff.ceiling(attempt);
            assert!(delay <= ceiling);
            assert!(delay >= ceiling / 2);
        }
    }
}
