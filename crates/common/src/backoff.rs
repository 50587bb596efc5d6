//! Retry delay calculation strategies
//!
//! A `BackoffStrategy` maps a 1-based attempt number to a wait duration.
//! Consumers decide *whether* to retry; this module only answers *how long*
//! to wait before the next attempt.

use std::time::Duration;

/// Backoff strategy for calculating retry delays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed(Duration),
    /// Linear backoff: initial_delay + (attempt * increment)
    ///
    /// With a zero `initial_delay`, attempt *k* waits exactly
    /// *k* × `increment`.
    Linear { initial_delay: Duration, increment: Duration },
    /// Exponential backoff: initial_delay * 2^(attempt - 1), capped
    Exponential { initial_delay: Duration, max_delay: Duration },
}

impl BackoffStrategy {
    /// Linear backoff growing by `base` per attempt, starting at `base`.
    pub fn linear(base: Duration) -> Self {
        Self::Linear { initial_delay: Duration::ZERO, increment: base }
    }

    /// Calculate the delay for the given attempt (1-based).
    ///
    /// Attempt 0 is treated as attempt 1 so callers that have not yet
    /// incremented their counter still get a sane delay.
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self {
            Self::Fixed(delay) => *delay,
            Self::Linear { initial_delay, increment } => {
                *initial_delay + increment.saturating_mul(attempt)
            }
            Self::Exponential { initial_delay, max_delay } => {
                let shift = (attempt - 1).min(16);
                let factor = 2u32.saturating_pow(shift);
                initial_delay.saturating_mul(factor).min(*max_delay)
            }
        }
    }
}

impl Default for BackoffStrategy {
    fn default() -> Self {
        Self::linear(Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_ignores_attempt_number() {
        let strategy = BackoffStrategy::Fixed(Duration::from_millis(100));

        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(5), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(100), Duration::from_millis(100));
    }

    #[test]
    fn linear_grows_by_increment() {
        let strategy = BackoffStrategy::linear(Duration::from_millis(500));

        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(500));
        assert_eq!(strategy.calculate_delay(2), Duration::from_millis(1000));
        assert_eq!(strategy.calculate_delay(3), Duration::from_millis(1500));
    }

    #[test]
    fn linear_with_initial_delay_offsets() {
        let strategy = BackoffStrategy::Linear {
            initial_delay: Duration::from_millis(100),
            increment: Duration::from_millis(50),
        };

        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(150));
        assert_eq!(strategy.calculate_delay(2), Duration::from_millis(200));
    }

    #[test]
    fn exponential_doubles_and_caps() {
        let strategy = BackoffStrategy::Exponential {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
        };

        assert_eq!(strategy.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(strategy.calculate_delay(2), Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(3), Duration::from_millis(400));
        assert_eq!(strategy.calculate_delay(4), Duration::from_millis(800));
        // Capped at max_delay from here on
        assert_eq!(strategy.calculate_delay(5), Duration::from_secs(1));
        assert_eq!(strategy.calculate_delay(30), Duration::from_secs(1));
    }

    #[test]
    fn attempt_zero_is_clamped_to_one() {
        let strategy = BackoffStrategy::linear(Duration::from_millis(200));
        assert_eq!(strategy.calculate_delay(0), Duration::from_millis(200));
    }

    #[test]
    fn default_is_one_second_linear() {
        let strategy = BackoffStrategy::default();
        assert_eq!(strategy.calculate_delay(2), Duration::from_secs(2));
    }
}
