//! Schedulers decide *when* a ledger is flushed.
//!
//! Every scheduler owns one [`PendingCalls`] (ledger plus registered runner)
//! and reacts to admissions through [`BulkScheduler::on_new_call`].

mod debounce;
mod manual;
mod tick;

use std::sync::{Mutex, MutexGuard, PoisonError};

use bulkage_types::SchedulerError;

use crate::deferred::Deferred;
use crate::diagnostics;
use crate::ledger::{Admission, Bulk, Ledger};
use crate::runner::BulkRunner;
use crate::{CallArgs, CallResult};

pub use debounce::DebounceScheduler;
pub use manual::ManualScheduler;
pub use tick::TickScheduler;

/// Ledger and runner shared by every scheduler implementation.
///
/// Both locks are only held for synchronous sections; nothing awaits while
/// holding them.
pub struct PendingCalls<A, R, E> {
    ledger: Mutex<Ledger<A, R, E>>,
    runner: Mutex<Option<BulkRunner<A, R, E>>>,
}

impl<A, R, E> Default for PendingCalls<A, R, E> {
    fn default() -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            runner: Mutex::new(None),
        }
    }
}

impl<A, R, E> PendingCalls<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_runner(&self, runner: BulkRunner<A, R, E>) {
        *lock(&self.runner) = Some(runner);
    }

    pub fn add(&self, args: A, waiter: Deferred<R, E>) -> Admission {
        lock(&self.ledger).add(args, waiter)
    }

    /// Distinct argument lists waiting for the next flush.
    #[must_use]
    pub fn len(&self) -> usize {
        lock(&self.ledger).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        lock(&self.ledger).is_empty()
    }

    #[must_use]
    pub fn waiter_count(&self) -> usize {
        lock(&self.ledger).waiter_count()
    }

    /// Swap the ledger out together with the runner that will resolve it.
    ///
    /// Without a runner the ledger is left untouched so the calls survive
    /// until one is registered. An empty ledger yields `Ok(None)`.
    pub fn detach(&self) -> Result<Option<(Bulk<A, R, E>, BulkRunner<A, R, E>)>, SchedulerError> {
        let Some(runner) = lock(&self.runner).clone() else {
            return Err(SchedulerError::NoRunner);
        };
        let bulk = lock(&self.ledger).take();
        if bulk.is_empty() {
            return Ok(None);
        }
        Ok(Some((bulk, runner)))
    }

    /// Detach the current ledger and resolve it.
    pub async fn flush(&self) -> Result<(), SchedulerError> {
        match self.detach()? {
            Some((bulk, runner)) => runner.run(bulk).await,
            None => {
                tracing::trace!(target: diagnostics::TARGET, "Flush with no pending calls");
            }
        }
        Ok(())
    }
}

/// The contract every scheduler fulfils.
///
/// Implementors supply [`pending`](Self::pending) and
/// [`on_new_call`](Self::on_new_call); admission and runner registration
/// come for free.
pub trait BulkScheduler<A, R, E>: Send + Sync + 'static
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn pending(&self) -> &PendingCalls<A, R, E>;

    /// Called exactly once after every admitted call, merged or not.
    fn on_new_call(&self);

    fn set_runner(&self, runner: BulkRunner<A, R, E>) {
        self.pending().set_runner(runner);
    }

    fn add_pending_call(&self, args: A, waiter: Deferred<R, E>) -> Admission {
        let admission = self.pending().add(args, waiter);
        tracing::trace!(
            target: diagnostics::TRACE_TARGET,
            ?admission,
            pending = self.pending().len(),
            "Call admitted"
        );
        self.on_new_call();
        admission
    }
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
