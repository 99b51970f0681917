//! Read-only tracing of batch activity.
//!
//! Nothing here feeds back into scheduling or dedup.

use std::fmt::Debug;

use crate::ledger::Bulk;

/// Target for per-bulk debug events.
pub const TARGET: &str = "bulkage";

/// Target for per-entry trace events.
pub const TRACE_TARGET: &str = "bulkage::trace";

/// Longest rendered argument list, in characters, before truncation.
pub const MAX_ARGS_CHARS: usize = 120;

const ELLIPSIS: &str = "…";

/// Render an argument list for a trace line, capped at [`MAX_ARGS_CHARS`].
#[must_use]
pub fn render_args<A: Debug + ?Sized>(args: &A) -> String {
    let rendered = format!("{args:?}");
    if rendered.chars().count() <= MAX_ARGS_CHARS {
        return rendered;
    }
    let take = MAX_ARGS_CHARS.saturating_sub(ELLIPSIS.chars().count());
    let head: String = rendered.chars().take(take).collect();
    format!("{head}{ELLIPSIS}")
}

/// Emit one trace event per entry of `bulk`: waiter count and arguments.
pub fn trace_bulk<A: Debug, R, E>(bulk: &Bulk<A, R, E>) {
    if !tracing::enabled!(target: TRACE_TARGET, tracing::Level::TRACE) {
        return;
    }
    for call in bulk.calls() {
        tracing::trace!(
            target: TRACE_TARGET,
            "{} waiting for {}",
            call.waiter_count(),
            render_args(call.args())
        );
    }
}
