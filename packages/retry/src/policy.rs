//! Retry policy configuration

use batchline_common::{
    Config, DEFAULT_BACKOFF_FACTOR, DEFAULT_BACKOFF_INITIAL_MS, DEFAULT_RETRY_ATTEMPTS,
};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

type BackoffFn = dyn Fn(u32) -> Duration + Send + Sync;

/// Delay to wait after a failed attempt
///
/// `attempt` is 1-based: `delay(1)` is the pause between the first and the
/// second attempt.
#[derive(Clone)]
pub enum Backoff {
    /// `initial * factor^(attempt - 1)`; a factor below 1.0 shrinks the delay
    /// on every attempt, above 1.0 grows it
    Geometric {
        /// Delay after the first failed attempt
        initial: Duration,
        /// Multiplier applied per attempt
        factor: f64,
    },
    /// Caller supplied delay function
    Custom(Arc<BackoffFn>),
}

impl Backoff {
    /// Geometric backoff starting at `initial`
    #[must_use]
    pub fn geometric(initial: Duration, factor: f64) -> Self {
        Self::Geometric { initial, factor }
    }

    /// Constant delay between attempts
    #[must_use]
    pub fn fixed(delay: Duration) -> Self {
        Self::Geometric {
            initial: delay,
            factor: 1.0,
        }
    }

    /// Backoff computed by `f(attempt)`
    #[must_use]
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(u32) -> Duration + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    /// Delay after the given failed attempt (1-based)
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Geometric { initial, factor } => {
                if attempt <= 1 || *factor == 1.0 {
                    return *initial;
                }
                let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
                let secs = initial.as_secs_f64() * factor.powi(exponent);
                Duration::try_from_secs_f64(secs).unwrap_or(if secs.is_nan() || secs < 0.0 {
                    Duration::ZERO
                } else {
                    Duration::MAX
                })
            }
            Self::Custom(f) => f(attempt),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::geometric(
            Duration::from_millis(DEFAULT_BACKOFF_INITIAL_MS),
            DEFAULT_BACKOFF_FACTOR,
        )
    }
}

impl fmt::Debug for Backoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometric { initial, factor } => f
                .debug_struct("Geometric")
                .field("initial", initial)
                .field("factor", factor)
                .finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Retry policy shared read-only by every operation a client issues
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Backoff,
    max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_ATTEMPTS,
            backoff: Backoff::default(),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` below 1 is raised to 1
    #[must_use]
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            max_delay: None,
        }
    }

    /// Single attempt, never retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self::new(1, Backoff::fixed(Duration::ZERO))
    }

    /// Derive a geometric policy from the shared configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.retry_attempts,
            Backoff::geometric(
                Duration::from_millis(config.backoff_initial_ms),
                config.backoff_factor,
            ),
        )
    }

    /// Cap every computed delay at `max_delay`
    #[must_use]
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Total attempts, including the first
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff function in use
    #[must_use]
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Delay before retrying after `attempt` failed, with the cap applied
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.backoff.delay(attempt);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }

    /// Sum of every delay a fully exhausted call sleeps
    #[must_use]
    pub fn total_delay(&self) -> Duration {
        (1..self.max_attempts)
            .map(|attempt| self.delay_for(attempt))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}
