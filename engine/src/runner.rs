//! Bulk runner: calls the resolver once per flushed bulk and settles every
//! waiter from the outcome.
//!
//! Each waiter is settled on exactly one path:
//!
//! | resolver outcome | every waiter of entry `i` |
//! |---|---|
//! | `Some(results)`, `results.len() == bulk.len()` | resolves to `results[i]` |
//! | `Some(results)`, any other length | rejects with `SizeMismatch` |
//! | `None` | resolves to `R::default()` |
//! | `Err(e)` | rejects with `Resolver(e)` |
//! | panic | rejects with `ResolverPanicked` |

use std::any::{Any, type_name};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use bulkage_types::BulkError;

use crate::deferred::Deferred;
use crate::diagnostics;
use crate::ledger::Bulk;
use crate::resolver::BulkResolver;
use crate::{CallArgs, CallResult};

type ResolverOutcome<R, E> = Result<Option<Vec<R>>, BulkError<E>>;

type Invoke<A, R, E> = dyn Fn(Vec<A>) -> BoxFuture<'static, ResolverOutcome<R, E>> + Send + Sync;

/// A type-erased resolver plus the label diagnostics report it under.
pub struct BulkRunner<A, R, E> {
    invoke: Arc<Invoke<A, R, E>>,
    label: Arc<str>,
}

impl<A, R, E> Clone for BulkRunner<A, R, E> {
    fn clone(&self) -> Self {
        Self {
            invoke: Arc::clone(&self.invoke),
            label: Arc::clone(&self.label),
        }
    }
}

impl<A, R, E> std::fmt::Debug for BulkRunner<A, R, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkRunner")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl<A, R, E> BulkRunner<A, R, E>
where
    A: CallArgs,
    R: CallResult,
    E: Send + Sync + 'static,
{
    pub fn new<Res>(resolver: Res) -> Self
    where
        Res: BulkResolver<A, R, Error = E>,
    {
        let resolver = Arc::new(resolver);
        let invoke = move |args: Vec<A>| -> BoxFuture<'static, ResolverOutcome<R, E>> {
            let resolver = Arc::clone(&resolver);
            Box::pin(async move {
                let call = AssertUnwindSafe(async move { resolver.resolve(args).await });
                match call.catch_unwind().await {
                    Ok(Ok(output)) => Ok(output),
                    Ok(Err(error)) => Err(BulkError::Resolver(Arc::new(error))),
                    Err(payload) => Err(BulkError::ResolverPanicked(panic_message(&*payload))),
                }
            })
        };

        Self {
            invoke: Arc::new(invoke),
            label: Arc::from(type_name::<Res>()),
        }
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolve one bulk and settle all of its waiters.
    pub async fn run(&self, bulk: Bulk<A, R, E>) {
        let expected = bulk.len();
        tracing::debug!(
            target: diagnostics::TARGET,
            size = expected,
            waiters = bulk.waiter_count(),
            resolver = %self.label,
            "Resolving bulk"
        );
        diagnostics::trace_bulk(&bulk);

        let (args, mut groups) = bulk.into_parts();
        match (self.invoke)(args).await {
            Ok(Some(results)) if results.len() == expected => {
                for (result, waiters) in results.into_iter().zip(groups.iter_mut()) {
                    for waiter in waiters {
                        waiter.resolve(result.clone());
                    }
                }
            }
            Ok(Some(results)) => {
                let error = BulkError::SizeMismatch {
                    actual: results.len(),
                    expected,
                };
                tracing::warn!(
                    target: diagnostics::TARGET,
                    resolver = %self.label,
                    actual = results.len(),
                    expected,
                    "Resolver result size does not match bulk"
                );
                reject_all(&mut groups, &error);
            }
            Ok(None) => {
                for waiter in groups.iter_mut().flatten() {
                    waiter.resolve(R::default());
                }
            }
            Err(error) => {
                tracing::debug!(
                    target: diagnostics::TARGET,
                    resolver = %self.label,
                    "Resolver failed; rejecting {} waiters",
                    groups.iter().map(Vec::len).sum::<usize>()
                );
                reject_all(&mut groups, &error);
            }
        }
    }
}

fn reject_all<R, E>(groups: &mut [Vec<Deferred<R, E>>], error: &BulkError<E>) {
    for waiter in groups.iter_mut().flatten() {
        waiter.reject(error.clone());
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
