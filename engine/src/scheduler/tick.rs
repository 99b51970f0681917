use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::runtime::{Handle, RuntimeFlavor};

use bulkage_types::ConstructionError;

use super::{BulkScheduler, PendingCalls};
use crate::diagnostics;
use crate::{CallArgs, CallResult};

struct TickState<A, R, E> {
    pending: PendingCalls<A, R, E>,
    armed: AtomicBool,
}

/// Flushes on the next scheduling turn.
///
/// The first call of a burst spawns one flush task; later calls in the same
/// burst see the armed flag and only join the ledger. The task runs once the
/// calling task yields, so everything admitted before that lands in one bulk.
///
/// That holds only on a current-thread runtime. On a multi-thread runtime an
/// idle worker can pick the flush up mid-burst, so construction there fails
/// with [`ConstructionError::TickNeedsCurrentThread`]; use a debounce policy
/// instead.
pub struct TickScheduler<A, R, E> {
    state: Arc<TickState<A, R, E>>,
    handle: Handle,
}

impl<A, R, E> TickScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    pub fn new() -> Result<Self, ConstructionError> {
        let handle = Handle::try_current().map_err(|_| ConstructionError::NoRuntime)?;
        Self::with_handle(handle)
    }

    pub fn with_handle(handle: Handle) -> Result<Self, ConstructionError> {
        if handle.runtime_flavor() != RuntimeFlavor::CurrentThread {
            return Err(ConstructionError::TickNeedsCurrentThread);
        }
        Ok(Self {
            state: Arc::new(TickState {
                pending: PendingCalls::new(),
                armed: AtomicBool::new(false),
            }),
            handle,
        })
    }
}

impl<A, R, E> BulkScheduler<A, R, E> for TickScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn pending(&self) -> &PendingCalls<A, R, E> {
        &self.state.pending
    }

    fn on_new_call(&self) {
        if self.state.armed.swap(true, Ordering::AcqRel) {
            return;
        }

        let state = Arc::clone(&self.state);
        self.handle.spawn(async move {
            state.armed.store(false, Ordering::Release);
            if let Err(err) = state.pending.flush().await {
                tracing::warn!(target: diagnostics::TARGET, "Tick flush skipped: {}", err);
            }
        });
    }
}
