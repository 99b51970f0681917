//! Core domain types for Bulkage.
//!
//! This crate contains pure types with no IO, no async, and minimal dependencies:
//! the structural equality used to deduplicate calls, batching policy values,
//! and the error taxonomy shared by the engine and configuration crates.

mod equality;
mod error;
mod policy;

pub use equality::{StructuralEq, structurally_equal};
pub use error::{BulkError, ConstructionError, SchedulerError};
pub use policy::{BatchPolicy, DebouncePolicy, PolicyError};
