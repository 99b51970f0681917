//! Debounced batching under paused time.

use std::time::Duration;

use bulkage::{Bulkage, DebouncePolicy, SchedulePolicy};
use pretty_assertions::assert_eq;

use crate::common::{Recorder, elapse};

fn identity(args: &(u32,)) -> u32 {
    args.0
}

#[tokio::test(start_paused = true)]
async fn numeric_policy_waits_for_quiet_period() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::with_policy(5_u64, recorder.resolver(identity)).unwrap();

    let future = bulkage.call((1,));
    elapse(4).await;
    assert_eq!(recorder.calls(), 0);

    elapse(1).await;
    assert_eq!(recorder.calls(), 1);
    assert_eq!(future.await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn each_call_restarts_the_window() {
    let recorder = Recorder::new();
    let bulkage =
        Bulkage::with_policy(Duration::from_millis(5), recorder.resolver(identity)).unwrap();

    let first = bulkage.call((1,));
    elapse(4).await;
    let second = bulkage.call((1,));
    elapse(4).await;
    assert_eq!(recorder.calls(), 0);

    elapse(1).await;
    assert_eq!(recorder.bulks(), vec![vec![(1,)]]);
    assert_eq!(first.await.unwrap(), 1);
    assert_eq!(second.await.unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn calls_after_window_form_new_bulk() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::with_policy(5_u64, recorder.resolver(identity)).unwrap();

    let _first = bulkage.call((1,));
    elapse(5).await;
    assert_eq!(recorder.calls(), 1);

    let _second = bulkage.call((2,));
    elapse(5).await;
    assert_eq!(recorder.bulks(), vec![vec![(1,)], vec![(2,)]]);
}

#[tokio::test(start_paused = true)]
async fn max_wait_bounds_continuous_arrivals() {
    let recorder = Recorder::new();
    let policy = SchedulePolicy::debounce_ms(6, Some(15)).unwrap();
    let bulkage = Bulkage::with_policy(policy, recorder.resolver(identity)).unwrap();

    let mut futures = Vec::new();
    for _ in 0..3 {
        futures.push(bulkage.call((8,)));
        elapse(4).await;
        assert_eq!(recorder.calls(), 0);
    }
    futures.push(bulkage.call((8,)));
    elapse(4).await;

    assert_eq!(recorder.bulks(), vec![vec![(8,)]]);
    for future in futures {
        assert_eq!(future.await.unwrap(), 8);
    }
}

#[tokio::test(start_paused = true)]
async fn max_wait_is_irrelevant_when_quiet_period_ends_first() {
    let recorder = Recorder::new();
    let policy = DebouncePolicy::from_millis(3, Some(50)).unwrap();
    let bulkage = Bulkage::with_policy(policy, recorder.resolver(identity)).unwrap();

    let _first = bulkage.call((1,));
    elapse(3).await;
    assert_eq!(recorder.calls(), 1);

    elapse(60).await;
    assert_eq!(recorder.calls(), 1);
}
