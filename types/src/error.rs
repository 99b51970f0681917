//! Error taxonomy.
//!
//! Construction and scheduler errors are synchronous and returned to whoever
//! set things up. [`BulkError`] is the only error a caller ever observes
//! through its future.

use std::sync::Arc;

use thiserror::Error;

use crate::PolicyError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("timer-driven schedulers must be built inside a tokio runtime")]
    NoRuntime,
    #[error("tick batching needs a current-thread tokio runtime; use a debounce policy instead")]
    TickNeedsCurrentThread,
    #[error("invalid batching policy: {0}")]
    InvalidPolicy(#[from] PolicyError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("no runner registered for this scheduler")]
    NoRunner,
}

/// Why a batched call did not produce its value.
///
/// Every waiter of a failed bulk receives a clone of the same error; the
/// resolver's own error is shared behind an `Arc` rather than copied.
#[derive(Debug, Error)]
pub enum BulkError<E> {
    #[error(
        "Resolver gave a bulk result of size {actual} but a result of size {expected} was expected"
    )]
    SizeMismatch { actual: usize, expected: usize },
    #[error("{0}")]
    Resolver(Arc<E>),
    #[error("resolver panicked: {0}")]
    ResolverPanicked(String),
    #[error("call was dropped before its bulk settled")]
    Abandoned,
}

impl<E> BulkError<E> {
    /// The resolver's error, when this is a resolver failure.
    #[must_use]
    pub fn resolver_error(&self) -> Option<&E> {
        match self {
            Self::Resolver(error) => Some(&**error),
            _ => None,
        }
    }

    /// `(actual, expected)` result counts for a size mismatch.
    #[must_use]
    pub fn size_mismatch(&self) -> Option<(usize, usize)> {
        match self {
            Self::SizeMismatch { actual, expected } => Some((*actual, *expected)),
            _ => None,
        }
    }

    /// Whether two errors are the same settlement: identical variant and, for
    /// resolver failures, the very same shared error value.
    #[must_use]
    pub fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::SizeMismatch { actual, expected },
                Self::SizeMismatch {
                    actual: other_actual,
                    expected: other_expected,
                },
            ) => actual == other_actual && expected == other_expected,
            (Self::Resolver(left), Self::Resolver(right)) => Arc::ptr_eq(left, right),
            (Self::ResolverPanicked(left), Self::ResolverPanicked(right)) => left == right,
            (Self::Abandoned, Self::Abandoned) => true,
            _ => false,
        }
    }
}

impl<E> Clone for BulkError<E> {
    fn clone(&self) -> Self {
        match self {
            Self::SizeMismatch { actual, expected } => Self::SizeMismatch {
                actual: *actual,
                expected: *expected,
            },
            Self::Resolver(error) => Self::Resolver(Arc::clone(error)),
            Self::ResolverPanicked(message) => Self::ResolverPanicked(message.clone()),
            Self::Abandoned => Self::Abandoned,
        }
    }
}
