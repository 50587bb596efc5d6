//! Time abstraction for testability
//!
//! Timing-based behavior (inactivity watchdogs, backoff bookkeeping) is
//! built against this trait rather than ambient wall-clock calls, so tests
//! can drive time forward without real sleeps.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable deterministic testing
///
/// Production code uses [`SystemClock`]; tests inject a [`MockClock`] and
/// advance it explicitly to exercise timeout paths.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;

    /// Get current system time (wall clock)
    fn system_time(&self) -> SystemTime;

    /// Get milliseconds since UNIX epoch
    fn millis_since_epoch(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Mock clock for deterministic testing
///
/// Time only moves when a test calls [`MockClock::advance`], so elapsed-time
/// checks become exact instead of sleep-and-hope.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Set the mock clock to a specific elapsed time
    pub fn set_elapsed(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed = duration;
        }
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        self.start + elapsed
    }

    fn system_time(&self) -> SystemTime {
        let elapsed = self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO);
        SystemTime::UNIX_EPOCH + elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn mock_clock_starts_at_zero_elapsed() {
        let clock = MockClock::new();
        assert_eq!(clock.elapsed(), Duration::ZERO);
    }

    #[test]
    fn mock_clock_advance_moves_now() {
        let clock = MockClock::new();
        let before = clock.now();

        clock.advance(Duration::from_secs(5));

        assert_eq!(clock.now() - before, Duration::from_secs(5));
        assert_eq!(clock.elapsed(), Duration::from_secs(5));
    }

    #[test]
    fn mock_clock_advance_millis_accumulates() {
        let clock = MockClock::new();
        clock.advance_millis(100);
        clock.advance_millis(250);
        assert_eq!(clock.elapsed(), Duration::from_millis(350));
    }

    #[test]
    fn mock_clock_set_elapsed_overrides() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(10));

        clock.set_elapsed(Duration::from_secs(2));

        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(3));

        assert_eq!(other.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn arc_clock_delegates() {
        let clock = Arc::new(MockClock::new());
        clock.advance(Duration::from_secs(1));

        let now_via_arc = Clock::now(&clock);
        assert_eq!(now_via_arc, (*clock).now());
    }

    #[test]
    fn mock_clock_system_time_tracks_elapsed() {
        let clock = MockClock::new();
        clock.advance(Duration::from_secs(60));
        assert_eq!(clock.millis_since_epoch(), 60_000);
    }
}
