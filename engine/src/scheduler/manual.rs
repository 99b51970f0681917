use bulkage_types::SchedulerError;

use super::{BulkScheduler, PendingCalls};
use crate::{CallArgs, CallResult};

/// A scheduler that never flushes on its own.
///
/// Calls accumulate until the owner awaits [`ManualScheduler::flush`]. Needs
/// no runtime handle.
pub struct ManualScheduler<A, R, E> {
    pending: PendingCalls<A, R, E>,
}

impl<A, R, E> Default for ManualScheduler<A, R, E> {
    fn default() -> Self {
        Self {
            pending: PendingCalls::default(),
        }
    }
}

impl<A, R, E> ManualScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn flush(&self) -> Result<(), SchedulerError> {
        self.pending.flush().await
    }
}

impl<A, R, E> BulkScheduler<A, R, E> for ManualScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn pending(&self) -> &PendingCalls<A, R, E> {
        &self.pending
    }

    fn on_new_call(&self) {}
}
