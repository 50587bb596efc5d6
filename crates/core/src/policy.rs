//! Recovery policy configuration
//!
//! A [`RecoveryPolicy`] is immutable for the lifetime of one recovery
//! manager: the retry budget, the linear-backoff base, the inactivity
//! timeout, and three optional observability hooks.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use rivulet_common::BackoffStrategy;
use rivulet_domain::StreamError;
use thiserror::Error;

/// Hook invoked for each recovery attempt, with the 1-based attempt number.
pub type RetryHook = Arc<dyn Fn(u32) + Send + Sync>;

/// Hook invoked when the inactivity watchdog fires, with the observed
/// inactivity duration.
pub type TimeoutHook = Arc<dyn Fn(Duration) + Send + Sync>;

/// Hook invoked for every error routed through the recovery manager.
pub type ErrorHook = Arc<dyn Fn(&StreamError) + Send + Sync>;

/// Configuration validation error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Configuration for stream recovery behavior
///
/// Defaults: 3 retries, 1 s backoff base, 30 s inactivity timeout.
#[derive(Clone)]
pub struct RecoveryPolicy {
    /// Maximum number of recovery attempts per session
    pub max_retries: u32,
    /// Base delay for linear backoff (attempt k waits k times this)
    pub retry_delay_base: Duration,
    /// How long the stream may stay silent before the watchdog fires
    pub inactivity_timeout: Duration,
    /// Called for each recovery attempt
    pub on_retry: Option<RetryHook>,
    /// Called when the inactivity watchdog fires
    pub on_timeout: Option<TimeoutHook>,
    /// Called for every error seen by the manager
    pub on_error: Option<ErrorHook>,
}

impl fmt::Debug for RecoveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPolicy")
            .field("max_retries", &self.max_retries)
            .field("retry_delay_base", &self.retry_delay_base)
            .field("inactivity_timeout", &self.inactivity_timeout)
            .field("on_retry", &self.on_retry.is_some())
            .field("on_timeout", &self.on_timeout.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_base: Duration::from_millis(1000),
            inactivity_timeout: Duration::from_millis(30_000),
            on_retry: None,
            on_timeout: None,
            on_error: None,
        }
    }
}

impl RecoveryPolicy {
    /// Create a policy builder.
    pub fn builder() -> RecoveryPolicyBuilder {
        RecoveryPolicyBuilder::new()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inactivity_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                message: "inactivity_timeout must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// The backoff schedule this policy prescribes.
    pub fn backoff(&self) -> BackoffStrategy {
        BackoffStrategy::linear(self.retry_delay_base)
    }

    /// Delay before the given 1-based recovery attempt.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        self.backoff().calculate_delay(attempt)
    }

    /// Invoke the retry hook, if configured.
    pub fn notify_retry(&self, attempt: u32) {
        if let Some(hook) = &self.on_retry {
            hook(attempt);
        }
    }

    /// Invoke the timeout hook, if configured.
    pub fn notify_timeout(&self, observed_inactivity: Duration) {
        if let Some(hook) = &self.on_timeout {
            hook(observed_inactivity);
        }
    }

    /// Invoke the error hook, if configured.
    pub fn notify_error(&self, error: &StreamError) {
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }
}

/// Builder for [`RecoveryPolicy`] with fluent API
#[derive(Default)]
pub struct RecoveryPolicyBuilder {
    policy: RecoveryPolicy,
}

impl RecoveryPolicyBuilder {
    pub fn new() -> Self {
        Self { policy: RecoveryPolicy::default() }
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.policy.max_retries = retries;
        self
    }

    pub fn retry_delay_base(mut self, base: Duration) -> Self {
        self.policy.retry_delay_base = base;
        self
    }

    pub fn inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.policy.inactivity_timeout = timeout;
        self
    }

    pub fn on_retry<F>(mut self, hook: F) -> Self
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        self.policy.on_retry = Some(Arc::new(hook));
        self
    }

    pub fn on_timeout<F>(mut self, hook: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.policy.on_timeout = Some(Arc::new(hook));
        self
    }

    pub fn on_error<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StreamError) + Send + Sync + 'static,
    {
        self.policy.on_error = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> Result<RecoveryPolicy, ConfigError> {
        self.policy.validate()?;
        Ok(self.policy)
    }
}
