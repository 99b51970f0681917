//! Trailing-edge debounce with an optional max-wait cap.
//!
//! Two independent timers per batch:
//!
//! - **trailing**: restarted by every call; fires after `debounce` of quiet.
//! - **max wait**: armed by the first call of a batch when a cap is set;
//!   forces a flush while the trailing timer is still pending.
//!
//! Whichever fires first claims the flush and cancels the other. Each armed
//! timer carries a generation; a timer that finds a different generation in
//! its slot was superseded and exits without flushing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::future::{AbortHandle, Abortable};
use tokio::runtime::Handle;
use tokio::time::Instant;

use bulkage_types::{ConstructionError, DebouncePolicy, SchedulerError};

use super::{BulkScheduler, PendingCalls, lock};
use crate::diagnostics;
use crate::{CallArgs, CallResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Trailing,
    MaxWait,
}

struct ArmedTimer {
    generation: u64,
    abort: AbortHandle,
}

#[derive(Default)]
struct DebounceTimers {
    generation: u64,
    trailing: Option<ArmedTimer>,
    max_wait: Option<ArmedTimer>,
}

impl DebounceTimers {
    fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    fn slot(&mut self, kind: TimerKind) -> &mut Option<ArmedTimer> {
        match kind {
            TimerKind::Trailing => &mut self.trailing,
            TimerKind::MaxWait => &mut self.max_wait,
        }
    }

    /// Take the timer in `kind`'s slot if it is still `generation`.
    fn claim(&mut self, kind: TimerKind, generation: u64) -> bool {
        let slot = self.slot(kind);
        if slot.as_ref().is_some_and(|timer| timer.generation == generation) {
            *slot = None;
            true
        } else {
            false
        }
    }

    fn cancel(&mut self, kind: TimerKind) -> bool {
        match self.slot(kind).take() {
            Some(timer) => {
                timer.abort.abort();
                true
            }
            None => false,
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(TimerKind::Trailing);
        self.cancel(TimerKind::MaxWait);
    }
}

struct DebounceState<A, R, E> {
    pending: PendingCalls<A, R, E>,
    policy: DebouncePolicy,
    timers: Mutex<DebounceTimers>,
    handle: Handle,
}

impl<A, R, E> DebounceState<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    /// Spawn a timer whose deadline counts from now, not from the task's
    /// first poll.
    fn arm(self: &Arc<Self>, kind: TimerKind, generation: u64, delay: Duration) -> ArmedTimer {
        let deadline = Instant::now() + delay;
        let (abort, registration) = AbortHandle::new_pair();
        let state = Arc::clone(self);
        let timer = Abortable::new(
            async move {
                tokio::time::sleep_until(deadline).await;
                state.fire(kind, generation).await;
            },
            registration,
        );
        self.handle.spawn(timer);
        ArmedTimer { generation, abort }
    }

    async fn fire(&self, kind: TimerKind, generation: u64) {
        let detached = {
            let mut timers = lock(&self.timers);
            if !timers.claim(kind, generation) {
                return;
            }
            match kind {
                TimerKind::Trailing => {
                    timers.cancel(TimerKind::MaxWait);
                }
                TimerKind::MaxWait => {
                    // The trailing flush already ran and cleared this batch.
                    if !timers.cancel(TimerKind::Trailing) {
                        return;
                    }
                    tracing::debug!(
                        target: diagnostics::TARGET,
                        max_wait = ?self.policy.max(),
                        "Max wait reached; forcing flush"
                    );
                }
            }
            self.pending.detach()
        };

        match detached {
            Ok(Some((bulk, runner))) => runner.run(bulk).await,
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(target: diagnostics::TARGET, "Debounce flush skipped: {}", err);
            }
        }
    }
}

/// Flushes once calls go quiet for `debounce`, or after `max` at the latest.
pub struct DebounceScheduler<A, R, E> {
    state: Arc<DebounceState<A, R, E>>,
}

impl<A, R, E> DebounceScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    pub fn new(policy: DebouncePolicy) -> Result<Self, ConstructionError> {
        let handle = Handle::try_current().map_err(|_| ConstructionError::NoRuntime)?;
        Ok(Self::with_handle(policy, handle))
    }

    #[must_use]
    pub fn with_handle(policy: DebouncePolicy, handle: Handle) -> Self {
        Self {
            state: Arc::new(DebounceState {
                pending: PendingCalls::new(),
                policy,
                timers: Mutex::new(DebounceTimers::default()),
                handle,
            }),
        }
    }

    /// Cancel both timers and flush whatever is pending right away.
    pub async fn flush_now(&self) -> Result<(), SchedulerError> {
        let detached = {
            let mut timers = lock(&self.state.timers);
            timers.cancel_all();
            self.state.pending.detach()?
        };
        if let Some((bulk, runner)) = detached {
            runner.run(bulk).await;
        }
        Ok(())
    }
}

impl<A, R, E> BulkScheduler<A, R, E> for DebounceScheduler<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    fn pending(&self) -> &PendingCalls<A, R, E> {
        &self.state.pending
    }

    fn on_new_call(&self) {
        let mut timers = lock(&self.state.timers);

        timers.cancel(TimerKind::Trailing);
        let generation = timers.next_generation();
        timers.trailing = Some(self.state.arm(
            TimerKind::Trailing,
            generation,
            self.state.policy.debounce(),
        ));

        if let Some(max) = self.state.policy.max()
            && timers.max_wait.is_none()
        {
            let generation = timers.next_generation();
            timers.max_wait = Some(self.state.arm(TimerKind::MaxWait, generation, max));
        }
    }
}
