//! Bulkage facade, the public entry point.
//!
//! A [`Bulkage`] pairs one resolver with one scheduler. Each
//! [`call`](Bulkage::call) is admitted to the scheduler's ledger immediately
//! and returns a future for that call's share of the eventual bulk result.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bulkage_types::{BatchPolicy, ConstructionError, DebouncePolicy};

use crate::deferred::{BulkFuture, Deferred};
use crate::resolver::BulkResolver;
use crate::runner::BulkRunner;
use crate::scheduler::{BulkScheduler, DebounceScheduler, TickScheduler};
use crate::{CallArgs, CallResult};

/// How a [`Bulkage`] decides when to flush.
///
/// Usually built through `From`: a `u64` is a debounce in milliseconds, a
/// `Duration` a debounce delay, and an `Arc` of any [`BulkScheduler`] is used
/// as-is.
pub enum SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    Tick,
    Debounce(DebouncePolicy),
    Scheduler(Arc<dyn BulkScheduler<A, R, E>>),
}

impl<A, R, E> SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    /// Debounce with an optional max wait, both in milliseconds.
    pub fn debounce_ms(debounce_ms: u64, max_ms: Option<u64>) -> Result<Self, ConstructionError> {
        Ok(Self::Debounce(DebouncePolicy::from_millis(debounce_ms, max_ms)?))
    }

    /// Resolve into a scheduler instance.
    ///
    /// Timer-driven variants capture the current tokio runtime.
    pub fn into_scheduler(self) -> Result<Arc<dyn BulkScheduler<A, R, E>>, ConstructionError> {
        let scheduler: Arc<dyn BulkScheduler<A, R, E>> = match self {
            Self::Tick => Arc::new(TickScheduler::new()?),
            Self::Debounce(policy) => Arc::new(DebounceScheduler::new(policy)?),
            Self::Scheduler(scheduler) => scheduler,
        };
        Ok(scheduler)
    }
}

impl<A, R, E> Default for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::Tick
    }
}

impl<A, R, E> fmt::Debug for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tick => f.write_str("Tick"),
            Self::Debounce(policy) => f.debug_tuple("Debounce").field(policy).finish(),
            Self::Scheduler(_) => f.write_str("Scheduler(..)"),
        }
    }
}

impl<A, R, E> From<u64> for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn from(debounce_ms: u64) -> Self {
        Self::Debounce(DebouncePolicy::new(Duration::from_millis(debounce_ms)))
    }
}

impl<A, R, E> From<Duration> for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn from(debounce: Duration) -> Self {
        Self::Debounce(DebouncePolicy::new(debounce))
    }
}

impl<A, R, E> From<DebouncePolicy> for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn from(policy: DebouncePolicy) -> Self {
        Self::Debounce(policy)
    }
}

impl<A, R, E> From<BatchPolicy> for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn from(policy: BatchPolicy) -> Self {
        match policy {
            BatchPolicy::Tick => Self::Tick,
            BatchPolicy::Debounce(policy) => Self::Debounce(policy),
        }
    }
}

impl<A, R, E, S> From<Arc<S>> for SchedulePolicy<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
    S: BulkScheduler<A, R, E>,
{
    fn from(scheduler: Arc<S>) -> Self {
        Self::Scheduler(scheduler)
    }
}

/// Collapses individual calls into bulk resolver invocations.
///
/// Calls whose arguments are structurally equal while a batch is open share
/// one resolver slot; every caller still gets its own future.
pub struct Bulkage<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    scheduler: Arc<dyn BulkScheduler<A, R, E>>,
    runner: BulkRunner<A, R, E>,
}

impl<A, R, E> Clone for Bulkage<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            runner: self.runner.clone(),
        }
    }
}

impl<A, R, E> fmt::Debug for Bulkage<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulkage")
            .field("resolver", &self.runner.label())
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

impl<A, R, E> Bulkage<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    /// Batch calls made within the same scheduling turn.
    pub fn new<Res>(resolver: Res) -> Result<Self, ConstructionError>
    where
        Res: BulkResolver<A, R, Error = E>,
    {
        Self::with_policy(SchedulePolicy::Tick, resolver)
    }

    pub fn with_policy<Res>(
        policy: impl Into<SchedulePolicy<A, R, E>>,
        resolver: Res,
    ) -> Result<Self, ConstructionError>
    where
        Res: BulkResolver<A, R, Error = E>,
    {
        let policy = policy.into();
        tracing::debug!(target: crate::diagnostics::TARGET, ?policy, "Creating bulkage");
        let scheduler = policy.into_scheduler()?;
        let runner = BulkRunner::new(resolver);
        scheduler.set_runner(runner.clone());
        Ok(Self { scheduler, runner })
    }

    /// Label the resolver in diagnostics. Defaults to its type name.
    #[must_use]
    pub fn named(mut self, label: impl Into<Arc<str>>) -> Self {
        self.runner = self.runner.with_label(label);
        self.scheduler.set_runner(self.runner.clone());
        self
    }

    /// Admit one call. The call joins the open batch before this returns.
    pub fn call(&self, args: A) -> BulkFuture<R, E> {
        let (deferred, future) = Deferred::new();
        self.scheduler.add_pending_call(args, deferred);
        future
    }

    /// Distinct argument lists waiting for the next flush.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.scheduler.pending().len()
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.runner.label()
    }
}
