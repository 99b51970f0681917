//! Bulkage engine: collapses many single-item async calls into one bulk
//! resolver invocation.
//!
//! ```no_run
//! use std::future::ready;
//!
//! use bulkage::Bulkage;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let users = Bulkage::new(|ids: Vec<(u32,)>| {
//!     ready(Ok::<_, std::io::Error>(
//!         ids.into_iter().map(|(id,)| format!("user-{id}")).collect::<Vec<_>>(),
//!     ))
//! })?;
//!
//! let (a, b) = tokio::join!(users.call((1,)), users.call((2,)));
//! assert_eq!(a?, "user-1");
//! assert_eq!(b?, "user-2");
//! # Ok(())
//! # }
//! ```
//!
//! Flow: [`Bulkage::call`] admits the call into a [`Ledger`] owned by a
//! [`BulkScheduler`]; the scheduler flushes the ledger into a [`Bulk`]; the
//! [`BulkRunner`] calls the resolver once and settles every waiter.

use std::fmt::Debug;

mod deferred;
pub mod diagnostics;
mod facade;
mod ledger;
mod resolver;
mod runner;
mod scheduler;

pub use bulkage_types::{
    BatchPolicy, BulkError, ConstructionError, DebouncePolicy, PolicyError, SchedulerError,
    StructuralEq, structurally_equal,
};

pub use deferred::{BulkFuture, Deferred};
pub use facade::{Bulkage, SchedulePolicy};
pub use ledger::{Admission, Bulk, Ledger, PendingCall};
pub use resolver::{BulkResolver, IntoBulkOutput};
pub use runner::BulkRunner;
pub use scheduler::{
    BulkScheduler, DebounceScheduler, ManualScheduler, PendingCalls, TickScheduler,
};

/// Bounds on one call's argument list.
pub trait CallArgs: StructuralEq + Debug + Send + 'static {}

impl<T> CallArgs for T where T: StructuralEq + Debug + Send + 'static {}

/// Bounds on one call's result.
///
/// `Clone` hands every merged waiter its own copy; `Default` stands in when
/// the resolver produces no value.
pub trait CallResult: Clone + Default + Send + 'static {}

impl<T> CallResult for T where T: Clone + Default + Send + 'static {}
