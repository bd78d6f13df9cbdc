//! Reconnect scheduling.

use crate::config::ReconnectConfig;
use rand::Rng;
use std::time::Duration;

/// Decides whether and when to re-dial after a drop.
#[derive(Debug, Clone)]
pub(crate) struct ReconnectPolicy {
    config: ReconnectConfig,
}

/// Outcome of asking the policy about the next attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Retry {
    /// Re-dial after the given delay (zero means now).
    After(Duration),
    /// The retry limit is exhausted.
    GiveUp,
}

impl ReconnectPolicy {
    pub(crate) fn new(config: ReconnectConfig) -> Self {
        Self { config }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// `failures` counts consecutive failures since the last successful open,
    /// including the one that just happened.
    pub(crate) fn next(&self, failures: u32) -> Retry {
        if self.config.max_retries > 0 && failures > self.config.max_retries {
            return Retry::GiveUp;
        }
        Retry::After(self.delay(failures))
    }

    fn delay(&self, failures: u32) -> Duration {
        if self.config.backoff_ms == 0 {
            return Duration::ZERO;
        }

        let exponent = failures.saturating_sub(1).min(31);
        let base = self
            .config
            .backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.config.max_backoff_ms);

        if self.config.jitter <= 0.0 {
            return Duration::from_millis(base);
        }

        let jitter = f64::from(self.config.jitter);
        let factor = rand::thread_rng().gen_range(1.0 - jitter..=1.0 + jitter);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let millis = (base as f64 * factor).round() as u64;
        Duration::from_millis(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(backoff_ms: u64, max_backoff_ms: u64, max_retries: u32, jitter: f32) -> ReconnectPolicy {
        ReconnectPolicy::new(ReconnectConfig {
            enabled: true,
            max_retries,
            backoff_ms,
            max_backoff_ms,
            jitter,
        })
    }

    #[test]
    fn test_default_is_immediate_and_unbounded() {
        let policy = ReconnectPolicy::new(ReconnectConfig::default());
        assert!(policy.enabled());
        for failures in [1, 2, 50, 10_000, u32::MAX] {
            assert_eq!(policy.next(failures), Retry::After(Duration::ZERO));
        }
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = policy(100, 1_000, 0, 0.0);
        assert_eq!(policy.next(1), Retry::After(Duration::from_millis(100)));
        assert_eq!(policy.next(2), Retry::After(Duration::from_millis(200)));
        assert_eq!(policy.next(3), Retry::After(Duration::from_millis(400)));
        assert_eq!(policy.next(4), Retry::After(Duration::from_millis(800)));
        assert_eq!(policy.next(5), Retry::After(Duration::from_millis(1_000)));
        assert_eq!(policy.next(200), Retry::After(Duration::from_millis(1_000)));
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let policy = policy(0, 30_000, 3, 0.0);
        assert_eq!(policy.next(3), Retry::After(Duration::ZERO));
        assert_eq!(policy.next(4), Retry::GiveUp);
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let policy = policy(1_000, 30_000, 0, 0.5);
        for _ in 0..100 {
            match policy.next(1) {
                Retry::After(delay) => {
                    assert!(delay >= Duration::from_millis(500), "{delay:?}");
                    assert!(delay <= Duration::from_millis(1_500), "{delay:?}");
                }
                Retry::GiveUp => panic!("unbounded policy gave up"),
            }
        }
    }
}
