//! The resolver contract, the one piece of user code the engine calls.

use std::future::Future;

/// What a resolver may hand back for one bulk.
///
/// `Vec<R>` must line up 1:1 with the bulk's argument lists. `None` (or `()`)
/// means the resolver produced no value, and every caller receives
/// `R::default()`.
pub trait IntoBulkOutput<R> {
    fn into_bulk_output(self) -> Option<Vec<R>>;
}

impl<R> IntoBulkOutput<R> for Vec<R> {
    fn into_bulk_output(self) -> Option<Vec<R>> {
        Some(self)
    }
}

impl<R> IntoBulkOutput<R> for Option<Vec<R>> {
    fn into_bulk_output(self) -> Option<Vec<R>> {
        self
    }
}

impl<R> IntoBulkOutput<R> for () {
    fn into_bulk_output(self) -> Option<Vec<R>> {
        None
    }
}

/// Computes results for one bulk of argument lists.
///
/// Implemented for every `Fn(Vec<A>) -> impl Future<Output = Result<O, E>>`
/// where `O: IntoBulkOutput<R>`. A synchronous resolver returns
/// `std::future::ready(..)`.
pub trait BulkResolver<A, R>: Send + Sync + 'static {
    type Error: Send + Sync + 'static;

    fn resolve(
        &self,
        bulk: Vec<A>,
    ) -> impl Future<Output = Result<Option<Vec<R>>, Self::Error>> + Send;
}

impl<A, R, E, O, F, Fut> BulkResolver<A, R> for F
where
    A: Send,
    F: Fn(Vec<A>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O, E>> + Send,
    O: IntoBulkOutput<R>,
    E: Send + Sync + 'static,
{
    type Error = E;

    fn resolve(
        &self,
        bulk: Vec<A>,
    ) -> impl Future<Output = Result<Option<Vec<R>>, Self::Error>> + Send {
        // Invoked on first poll, so a panicking closure is caught by the runner.
        async move { (self)(bulk).await.map(IntoBulkOutput::into_bulk_output) }
    }
}
