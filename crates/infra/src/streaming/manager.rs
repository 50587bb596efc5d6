//! Stream recovery manager
//!
//! Owns the inactivity watchdog and the bounded-retry recovery state for one
//! streaming session. The manager never returns errors and never panics:
//! recovery outcomes are booleans, and every classified error is reported
//! through the policy hooks.
//!
//! State machine: Idle → Monitoring → Stopped, with a transient retrying
//! phase inside [`StreamRecoveryManager::attempt_recovery`]. Invariants:
//! - `retry_count` never exceeds `policy.max_retries`
//! - at most one watchdog timer is armed at any instant; arming a new one
//!   always cancels the previous
//! - `stop()` is idempotent and always leaves zero armed timers

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rivulet_common::{Clock, SystemClock};
use rivulet_core::classify::is_recoverable;
use rivulet_core::RecoveryPolicy;
use rivulet_domain::StreamError;
use tracing::{debug, warn};

/// Observable manager state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Constructed, watchdog not started
    Idle,
    /// Watchdog armed, activity being tracked
    Monitoring,
    /// Terminal; only `reset()` revives the manager
    Stopped,
}

impl fmt::Display for ManagerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Monitoring => write!(f, "MONITORING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Cancellation handle for one armed watchdog timer
#[derive(Debug, Clone)]
struct WatchdogHandle {
    cancelled: Arc<AtomicBool>,
}

impl WatchdogHandle {
    fn new() -> Self {
        Self { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// State shared between the manager handle and its watchdog tasks
struct ManagerShared<C> {
    policy: RecoveryPolicy,
    clock: C,
    retry_count: AtomicU32,
    monitoring: AtomicBool,
    stopped: AtomicBool,
    last_activity: Mutex<Option<Instant>>,
    watchdog: Mutex<Option<WatchdogHandle>>,
}

impl<C: Clock> ManagerShared<C> {
    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn is_monitoring(&self) -> bool {
        self.monitoring.load(Ordering::SeqCst)
    }

    fn touch_activity(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Some(self.clock.now());
        }
    }

    fn observed_inactivity(&self) -> Duration {
        let last = self.last_activity.lock().ok().and_then(|guard| *guard);
        match last {
            Some(instant) => self.clock.now().saturating_duration_since(instant),
            None => Duration::ZERO,
        }
    }

    /// Cancel and drop the armed timer, if any.
    fn disarm(&self) {
        let previous = self.watchdog.lock().ok().and_then(|mut slot| slot.take());
        if let Some(handle) = previous {
            handle.cancel();
        }
    }
}

/// Inactivity watchdog and bounded-retry recovery for one stream session.
///
/// Cheap to clone; clones share the same state, so the stream decorator and
/// the watchdog task observe a single retry budget.
pub struct StreamRecoveryManager<C: Clock = SystemClock> {
    shared: Arc<ManagerShared<C>>,
}

impl<C: Clock> Clone for StreamRecoveryManager<C> {
    fn clone(&self) -> Self {
        Self { shared: Arc::clone(&self.shared) }
    }
}

impl<C: Clock> fmt::Debug for StreamRecoveryManager<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamRecoveryManager")
            .field("state", &self.state())
            .field("retry_count", &self.retry_count())
            .field("policy", &self.shared.policy)
            .finish()
    }
}

impl StreamRecoveryManager<SystemClock> {
    /// Create a manager using the system clock.
    pub fn new(policy: RecoveryPolicy) -> Self {
        Self::with_clock(policy, SystemClock)
    }
}

impl<C: Clock> StreamRecoveryManager<C> {
    /// Create a manager with an injected clock (useful for testing).
    pub fn with_clock(policy: RecoveryPolicy, clock: C) -> Self {
        Self {
            shared: Arc::new(ManagerShared {
                policy,
                clock,
                retry_count: AtomicU32::new(0),
                monitoring: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                last_activity: Mutex::new(None),
                watchdog: Mutex::new(None),
            }),
        }
    }

    /// Current state.
    pub fn state(&self) -> ManagerState {
        if self.shared.is_stopped() {
            ManagerState::Stopped
        } else if self.shared.is_monitoring() {
            ManagerState::Monitoring
        } else {
            ManagerState::Idle
        }
    }

    /// Recovery attempts consumed so far.
    pub fn retry_count(&self) -> u32 {
        self.shared.retry_count.load(Ordering::SeqCst)
    }

    /// Whether the retry budget is spent.
    pub fn retries_exhausted(&self) -> bool {
        self.retry_count() >= self.shared.policy.max_retries
    }

    /// Time since the last recorded activity.
    pub fn observed_inactivity(&self) -> Duration {
        self.shared.observed_inactivity()
    }

    /// Start (or restart) inactivity monitoring.
    ///
    /// Must be called from within a tokio runtime; the watchdog is a spawned
    /// task holding a cancellation handle.
    pub fn start_monitoring(&self) {
        if self.shared.is_stopped() {
            return;
        }
        self.shared.monitoring.store(true, Ordering::SeqCst);
        self.shared.touch_activity();
        Self::arm(&self.shared);
        debug!(timeout_ms = self.shared.policy.inactivity_timeout.as_millis() as u64, "watchdog armed");
    }

    /// Record stream activity: refresh the activity timestamp and re-arm the
    /// watchdog, superseding whatever timer was previously armed.
    ///
    /// This is what keeps a timeout scheduled before a successful read from
    /// firing against a stale deadline.
    pub fn record_activity(&self) {
        if self.shared.is_stopped() || !self.shared.is_monitoring() {
            return;
        }
        self.shared.touch_activity();
        Self::arm(&self.shared);
    }

    /// Attempt one recovery step.
    ///
    /// Returns `false` immediately (no hooks, no state change) when the
    /// retry budget is spent; the manager stays in Monitoring so later
    /// manual calls remain possible. Otherwise: consume one retry, notify
    /// the retry hook, wait the linear-backoff delay, re-arm monitoring and
    /// return `true`.
    pub async fn attempt_recovery(&self) -> bool {
        Self::attempt(&self.shared).await
    }

    /// Route an error through the recovery pipeline.
    ///
    /// The error hook always fires. Errors whose message matches the
    /// transient allow-list delegate to [`Self::attempt_recovery`]; anything
    /// else fails fast without consuming retry budget.
    pub async fn handle_error(&self, error: &StreamError) -> bool {
        self.shared.policy.notify_error(error);

        if self.shared.is_stopped() {
            return false;
        }

        let message = error.to_string();
        if is_recoverable(&message) {
            debug!(error = %message, "transient error, attempting recovery");
            Self::attempt(&self.shared).await
        } else {
            debug!(error = %message, "non-recoverable error");
            false
        }
    }

    /// Stop monitoring and cancel any armed timer. Idempotent.
    pub fn stop(&self) {
        if self.shared.stopped.swap(true, Ordering::SeqCst) {
            return;
        }
        self.shared.monitoring.store(false, Ordering::SeqCst);
        self.shared.disarm();
        debug!("recovery manager stopped");
    }

    /// Reuse this manager for a fresh session: zero the retry budget,
    /// re-mark active and re-arm monitoring.
    pub fn reset(&self) {
        self.shared.retry_count.store(0, Ordering::SeqCst);
        self.shared.stopped.store(false, Ordering::SeqCst);
        self.shared.monitoring.store(true, Ordering::SeqCst);
        self.shared.touch_activity();
        Self::arm(&self.shared);
        debug!("recovery manager reset");
    }

    /// Arm the watchdog, cancelling whichever timer was previously armed so
    /// at most one is ever live.
    fn arm(shared: &Arc<ManagerShared<C>>) {
        let handle = WatchdogHandle::new();
        let previous = shared
            .watchdog
            .lock()
            .ok()
            .and_then(|mut slot| slot.replace(handle.clone()));
        if let Some(previous) = previous {
            previous.cancel();
        }

        let timeout = shared.policy.inactivity_timeout;
        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if handle.is_cancelled() || shared.is_stopped() || !shared.is_monitoring() {
                return;
            }
            Self::expire(&shared).await;
        });
    }

    /// Watchdog expiry: report the observed inactivity, then try to recover.
    async fn expire(shared: &Arc<ManagerShared<C>>) {
        let observed = shared.observed_inactivity();
        warn!(inactivity_ms = observed.as_millis() as u64, "stream inactive, watchdog fired");
        shared.policy.notify_timeout(observed);
        let _recovered = Self::attempt(shared).await;
    }

    async fn attempt(shared: &Arc<ManagerShared<C>>) -> bool {
        if shared.is_stopped() {
            return false;
        }

        // Claim one unit of retry budget; refuse without side effects when
        // the budget is spent.
        let max_retries = shared.policy.max_retries;
        let claim = shared.retry_count.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| {
            if count >= max_retries {
                None
            } else {
                Some(count + 1)
            }
        });
        let attempt = match claim {
            Ok(previous) => previous + 1,
            Err(_) => {
                warn!(max_retries, "retry budget exhausted, giving up");
                return false;
            }
        };

        // Disarm while waiting out the backoff so the watchdog cannot fire a
        // concurrent second attempt mid-delay.
        shared.disarm();

        let delay = shared.policy.retry_delay(attempt);
        debug!(attempt, max_retries, delay_ms = delay.as_millis() as u64, "recovery attempt");
        shared.policy.notify_retry(attempt);

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if shared.is_stopped() {
            return false;
        }

        // Completing the attempt counts as activity: refresh and re-arm.
        if shared.is_monitoring() {
            shared.touch_activity();
            Self::arm(shared);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicU32;

    use rivulet_common::MockClock;

    use super::*;

    fn policy_with_counters(
        max_retries: u32,
        retries: &Arc<AtomicU32>,
        timeouts: &Arc<AtomicU32>,
    ) -> RecoveryPolicy {
        let retries = Arc::clone(retries);
        let timeouts = Arc::clone(timeouts);
        RecoveryPolicy::builder()
            .max_retries(max_retries)
            .retry_delay_base(Duration::from_millis(1))
            .inactivity_timeout(Duration::from_millis(100))
            .on_retry(move |_| {
                retries.fetch_add(1, Ordering::SeqCst);
            })
            .on_timeout(move |_| {
                timeouts.fetch_add(1, Ordering::SeqCst);
            })
            .build()
            .expect("valid policy")
    }

    #[tokio::test]
    async fn starts_idle_and_monitors_after_start() {
        let manager = StreamRecoveryManager::new(RecoveryPolicy::default());
        assert_eq!(manager.state(), ManagerState::Idle);

        manager.start_monitoring();
        assert_eq!(manager.state(), ManagerState::Monitoring);

        manager.stop();
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test]
    async fn retry_hook_fires_at_most_max_retries_times() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(2, &retries, &timeouts));

        assert!(manager.attempt_recovery().await);
        assert!(manager.attempt_recovery().await);
        // Budget spent: the third call fails without invoking the hook again
        assert!(!manager.attempt_recovery().await);

        assert_eq!(retries.load(Ordering::SeqCst), 2);
        assert_eq!(manager.retry_count(), 2);
        assert!(manager.retries_exhausted());
    }

    #[tokio::test]
    async fn exhausted_budget_does_not_change_state() {
        let manager = StreamRecoveryManager::new(
            RecoveryPolicy::builder()
                .max_retries(0)
                .retry_delay_base(Duration::from_millis(1))
                .build()
                .expect("valid policy"),
        );
        manager.start_monitoring();

        assert!(!manager.attempt_recovery().await);
        // Still Monitoring: future manual calls remain possible
        assert_eq!(manager.state(), ManagerState::Monitoring);
    }

    #[tokio::test]
    async fn recoverable_error_delegates_to_recovery() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(3, &retries, &timeouts));

        let err = StreamError::network("read ECONNRESET");
        assert!(manager.handle_error(&err).await);
        assert_eq!(manager.retry_count(), 1);
        assert_eq!(retries.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn non_recoverable_error_fails_fast_without_spending_budget() {
        let errors = Arc::new(AtomicU32::new(0));
        let errors_clone = Arc::clone(&errors);
        let manager = StreamRecoveryManager::new(
            RecoveryPolicy::builder()
                .on_error(move |_| {
                    errors_clone.fetch_add(1, Ordering::SeqCst);
                })
                .build()
                .expect("valid policy"),
        );

        let err = StreamError::Authentication("invalid_api_key".to_string());
        assert!(!manager.handle_error(&err).await);

        assert_eq!(manager.retry_count(), 0);
        // The error hook still fired for observability
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn activity_supersedes_pending_timeout() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(3, &retries, &timeouts));

        manager.start_monitoring();

        // Refresh shortly before the 100 ms deadline
        tokio::time::sleep(Duration::from_millis(70)).await;
        manager.record_activity();

        // The original deadline (t = 100 ms) must not fire
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(timeouts.load(Ordering::SeqCst), 0);

        // The refreshed deadline (t = 170 ms) does
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(timeouts.load(Ordering::SeqCst) >= 1);

        manager.stop();
    }

    #[tokio::test]
    async fn watchdog_fires_and_recovers_on_silence() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(3, &retries, &timeouts));

        manager.start_monitoring();
        tokio::time::sleep(Duration::from_millis(160)).await;

        assert!(timeouts.load(Ordering::SeqCst) >= 1);
        assert!(retries.load(Ordering::SeqCst) >= 1);
        assert!(manager.retry_count() <= 3);

        manager.stop();
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_silences_watchdog() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(3, &retries, &timeouts));

        manager.start_monitoring();
        manager.stop();
        manager.stop();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(timeouts.load(Ordering::SeqCst), 0);
        assert_eq!(manager.state(), ManagerState::Stopped);
    }

    #[tokio::test]
    async fn reset_restores_budget_and_monitoring() {
        let retries = Arc::new(AtomicU32::new(0));
        let timeouts = Arc::new(AtomicU32::new(0));
        let manager =
            StreamRecoveryManager::new(policy_with_counters(1, &retries, &timeouts));

        assert!(manager.attempt_recovery().await);
        assert!(!manager.attempt_recovery().await);
        manager.stop();

        manager.reset();
        assert_eq!(manager.state(), ManagerState::Monitoring);
        assert_eq!(manager.retry_count(), 0);
        assert!(manager.attempt_recovery().await);

        manager.stop();
    }

    #[tokio::test]
    async fn observed_inactivity_uses_injected_clock() {
        let clock = MockClock::new();
        let manager =
            StreamRecoveryManager::with_clock(RecoveryPolicy::default(), clock.clone());

        manager.start_monitoring();
        clock.advance(Duration::from_secs(7));

        assert_eq!(manager.observed_inactivity(), Duration::from_secs(7));
        manager.stop();
    }

    #[tokio::test]
    async fn record_activity_is_a_noop_before_start() {
        let manager = StreamRecoveryManager::new(RecoveryPolicy::default());
        manager.record_activity();
        assert_eq!(manager.state(), ManagerState::Idle);
    }
}
