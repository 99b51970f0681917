//! Batching policy values.
//!
//! A policy says *when* pending calls are flushed; it carries no behavior of
//! its own. The engine resolves a policy into a concrete scheduler once, at
//! construction.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("max wait must be greater than zero")]
    ZeroMaxWait,
    #[error("max wait requires a debounce delay")]
    MaxWaitWithoutDebounce,
}

/// Trailing-edge debounce with an optional cap on how long a batch may wait.
///
/// Every new call restarts the `debounce` window. When `max` is set, the
/// first call of a batch also starts a cap timer that forces a flush once
/// `max` has elapsed, even under continuous arrivals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebouncePolicy {
    debounce: Duration,
    max: Option<Duration>,
}

impl DebouncePolicy {
    #[must_use]
    pub const fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            max: None,
        }
    }

    pub fn with_max(self, max: Duration) -> Result<Self, PolicyError> {
        if max.is_zero() {
            return Err(PolicyError::ZeroMaxWait);
        }
        Ok(Self {
            max: Some(max),
            ..self
        })
    }

    pub fn from_millis(debounce_ms: u64, max_ms: Option<u64>) -> Result<Self, PolicyError> {
        let policy = Self::new(Duration::from_millis(debounce_ms));
        match max_ms {
            Some(max_ms) => policy.with_max(Duration::from_millis(max_ms)),
            None => Ok(policy),
        }
    }

    #[must_use]
    pub const fn debounce(&self) -> Duration {
        self.debounce
    }

    #[must_use]
    pub const fn max(&self) -> Option<Duration> {
        self.max
    }
}

/// Declarative batching policy, as written in configuration.
///
/// `Tick` flushes on the next scheduling turn, collecting every call made in
/// the current synchronous burst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    #[default]
    Tick,
    Debounce(DebouncePolicy),
}

impl BatchPolicy {
    /// Build a policy from optional millisecond settings.
    ///
    /// No debounce and no max gives `Tick`; a max without a debounce is
    /// rejected.
    pub fn from_millis(debounce_ms: Option<u64>, max_ms: Option<u64>) -> Result<Self, PolicyError> {
        match (debounce_ms, max_ms) {
            (None, None) => Ok(Self::Tick),
            (None, Some(_)) => Err(PolicyError::MaxWaitWithoutDebounce),
            (Some(debounce_ms), max_ms) => {
                DebouncePolicy::from_millis(debounce_ms, max_ms).map(Self::Debounce)
            }
        }
    }

    #[must_use]
    pub const fn is_tick(&self) -> bool {
        matches!(self, Self::Tick)
    }
}

impl From<DebouncePolicy> for BatchPolicy {
    fn from(policy: DebouncePolicy) -> Self {
        Self::Debounce(policy)
    }
}
