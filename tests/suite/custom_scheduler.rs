//! User-supplied schedulers plug into the facade unchanged.

use std::future::ready;
use std::sync::Arc;

use bulkage::{BulkScheduler, Bulkage, ManualScheduler, PendingCalls};
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

use crate::common::{Recorder, next_turn};

fn identity(args: &(u32,)) -> u32 {
    args.0
}

#[tokio::test]
async fn manual_scheduler_runs_resolver_only_when_flushed() {
    let recorder = Recorder::new();
    let scheduler = Arc::new(ManualScheduler::<(u32,), u32, String>::new());
    let bulkage =
        Bulkage::with_policy(Arc::clone(&scheduler), recorder.resolver(identity)).unwrap();

    let _one = bulkage.call((1,));
    let _two = bulkage.call((2,));
    scheduler.flush().await.unwrap();
    let _three = bulkage.call((3,));
    scheduler.flush().await.unwrap();
    let _four = bulkage.call((4,));
    next_turn().await;

    assert_eq!(recorder.bulks(), vec![vec![(1,), (2,)], vec![(3,)]]);
    assert_eq!(bulkage.pending_len(), 1);
}

/// Flushes as soon as a batch holds `size` distinct calls.
struct SizeScheduler {
    pending: Arc<PendingCalls<(u32,), u32, String>>,
    size: usize,
    handle: Handle,
}

impl BulkScheduler<(u32,), u32, String> for SizeScheduler {
    fn pending(&self) -> &PendingCalls<(u32,), u32, String> {
        &self.pending
    }

    fn on_new_call(&self) {
        if self.pending.len() < self.size {
            return;
        }
        let pending = Arc::clone(&self.pending);
        self.handle.spawn(async move {
            pending.flush().await.unwrap();
        });
    }
}

#[tokio::test]
async fn size_triggered_scheduler() {
    let recorder = Recorder::new();
    let scheduler = Arc::new(SizeScheduler {
        pending: Arc::new(PendingCalls::new()),
        size: 3,
        handle: Handle::current(),
    });
    let bulkage = Bulkage::with_policy(scheduler, recorder.resolver(identity)).unwrap();

    let first = bulkage.call((1,));
    let _merged = bulkage.call((1,));
    let _second = bulkage.call((2,));
    next_turn().await;
    assert_eq!(recorder.calls(), 0);

    let _third = bulkage.call((3,));
    assert_eq!(first.await.unwrap(), 1);
    assert_eq!(recorder.bulks(), vec![vec![(1,), (2,), (3,)]]);
}

#[tokio::test]
async fn named_resolver_label_is_reported() {
    let bulkage = Bulkage::new(|bulk: Vec<(u32,)>| {
        ready(Ok::<_, String>(bulk.into_iter().map(|(n,)| n).collect::<Vec<_>>()))
    })
    .unwrap()
    .named("echo");

    assert_eq!(bulkage.label(), "echo");
    assert_eq!(bulkage.call((2,)).await.unwrap(), 2);
}
