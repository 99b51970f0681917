//! Pending-call ledger: accumulates calls until their scheduler flushes.
//!
//! Entries keep first-seen order. A call whose arguments are structurally
//! equal to an existing entry joins that entry's waiters instead of opening
//! a new resolver slot.

use bulkage_types::StructuralEq;

use crate::deferred::Deferred;

/// Whether an admitted call opened a new entry or joined an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Inserted,
    Merged,
}

/// One distinct argument list and every caller waiting on it.
///
/// Never empty: an entry is created together with its first waiter.
pub struct PendingCall<A, R, E> {
    args: A,
    waiters: Vec<Deferred<R, E>>,
}

impl<A, R, E> PendingCall<A, R, E> {
    #[must_use]
    pub fn args(&self) -> &A {
        &self.args
    }

    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.waiters.len()
    }
}

pub struct Ledger<A, R, E> {
    calls: Vec<PendingCall<A, R, E>>,
}

impl<A, R, E> Default for Ledger<A, R, E> {
    fn default() -> Self {
        Self { calls: Vec::new() }
    }
}

impl<A: StructuralEq, R, E> Ledger<A, R, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, args: A, waiter: Deferred<R, E>) -> Admission {
        if let Some(existing) = self
            .calls
            .iter_mut()
            .find(|call| call.args.structural_eq(&args))
        {
            existing.waiters.push(waiter);
            return Admission::Merged;
        }

        self.calls.push(PendingCall {
            args,
            waiters: vec![waiter],
        });
        Admission::Inserted
    }
}

impl<A, R, E> Ledger<A, R, E> {
    /// Number of distinct argument lists.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn waiter_count(&self) -> usize {
        self.calls.iter().map(PendingCall::waiter_count).sum()
    }

    /// Swap the contents out, leaving the ledger empty.
    pub fn take(&mut self) -> Bulk<A, R, E> {
        Bulk {
            calls: std::mem::take(&mut self.calls),
        }
    }
}

/// Frozen snapshot of a ledger, handed to the runner at flush time.
pub struct Bulk<A, R, E> {
    calls: Vec<PendingCall<A, R, E>>,
}

impl<A, R, E> Bulk<A, R, E> {
    /// Number of resolver slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    #[must_use]
    pub fn waiter_count(&self) -> usize {
        self.calls.iter().map(PendingCall::waiter_count).sum()
    }

    #[must_use]
    pub fn calls(&self) -> &[PendingCall<A, R, E>] {
        &self.calls
    }

    /// Split into the resolver input and the aligned waiter groups.
    pub(crate) fn into_parts(self) -> (Vec<A>, Vec<Vec<Deferred<R, E>>>) {
        self.calls
            .into_iter()
            .map(|call| (call.args, call.waiters))
            .unzip()
    }
}
