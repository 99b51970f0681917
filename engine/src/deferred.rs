//! Single-assignment completion handles.
//!
//! A [`Deferred`] is the settle side held by the ledger; the matching
//! [`BulkFuture`] is handed to the caller. Settling is first-wins: later
//! `resolve`/`reject` calls are ignored.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use bulkage_types::BulkError;

type Settlement<R, E> = Result<R, BulkError<E>>;

pub struct Deferred<R, E> {
    sender: Option<oneshot::Sender<Settlement<R, E>>>,
}

impl<R, E> Deferred<R, E> {
    /// Create a pending handle and the future that observes it.
    #[must_use]
    pub fn new() -> (Self, BulkFuture<R, E>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            BulkFuture { receiver },
        )
    }

    pub fn resolve(&mut self, value: R) {
        self.settle(Ok(value));
    }

    pub fn reject(&mut self, error: BulkError<E>) {
        self.settle(Err(error));
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.sender.is_none()
    }

    fn settle(&mut self, outcome: Settlement<R, E>) {
        if let Some(sender) = self.sender.take() {
            // The caller may have stopped observing; the call still counts as settled.
            let _ = sender.send(outcome);
        }
    }
}

impl<R, E> fmt::Debug for Deferred<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

/// The caller's view of one batched call.
///
/// Dropping it does not withdraw the call; the bulk still runs and the
/// result is discarded. If the settle side is dropped unsettled the future
/// resolves to [`BulkError::Abandoned`].
#[must_use = "a BulkFuture does nothing unless awaited"]
pub struct BulkFuture<R, E> {
    receiver: oneshot::Receiver<Settlement<R, E>>,
}

impl<R, E> Future for BulkFuture<R, E> {
    type Output = Settlement<R, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.receiver)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| Err(BulkError::Abandoned)))
    }
}

impl<R, E> fmt::Debug for BulkFuture<R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkFuture").finish_non_exhaustive()
    }
}
