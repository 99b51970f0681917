//! Next-turn batching through the public facade.

use std::time::Duration;

use bulkage::Bulkage;
use futures_util::future::join_all;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use crate::common::{Counter, Recorder, next_turn};

fn identity(args: &(u32,)) -> u32 {
    args.0
}

fn sum(args: &(u32, u32)) -> u32 {
    args.0 + args.1
}

// ── Resolver invocation count ──

#[tokio::test]
async fn single_call_invokes_resolver_once() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let _pending = bulkage.call((1,));
    assert_eq!(recorder.calls(), 0);

    next_turn().await;
    assert_eq!(recorder.calls(), 1);
}

#[tokio::test]
async fn same_turn_calls_share_one_invocation() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let _first = bulkage.call((1,));
    let _second = bulkage.call((2,));
    next_turn().await;

    assert_eq!(recorder.calls(), 1);
}

#[tokio::test]
async fn separate_turns_invoke_resolver_twice() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let _first = bulkage.call((1,));
    next_turn().await;
    let _second = bulkage.call((1,));
    next_turn().await;

    assert_eq!(recorder.bulks(), vec![vec![(1,)], vec![(1,)]]);
}

// ── Result delivery ──

#[tokio::test]
async fn single_call_resolves_its_value() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    assert_eq!(bulkage.call((8,)).await.unwrap(), 8);
}

#[tokio::test]
async fn two_values_in_one_turn_form_one_bulk() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let results = join_all([bulkage.call((8,)), bulkage.call((18,))]).await;

    let values: Vec<u32> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![8, 18]);
    assert_eq!(recorder.bulks(), vec![vec![(8,), (18,)]]);
}

#[tokio::test]
async fn equal_arguments_share_one_slot() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let results = join_all([bulkage.call((8,)), bulkage.call((8,))]).await;

    let values: Vec<u32> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![8, 8]);
    assert_eq!(recorder.bulks(), vec![vec![(8,)]]);
}

#[tokio::test]
async fn separate_turns_resolve_independently() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    let first = bulkage.call((8,)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;
    let second = bulkage.call((18,)).await.unwrap();

    assert_eq!((first, second), (8, 18));
    assert_eq!(recorder.calls(), 2);
}

// ── Multi-argument calls ──

#[tokio::test]
async fn pairs_resolve_their_sums() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(sum)).unwrap();

    let results = join_all([bulkage.call((2, 3)), bulkage.call((8, 13))]).await;

    let values: Vec<u32> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![5, 21]);
}

#[tokio::test]
async fn matching_first_argument_alone_does_not_merge() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(sum)).unwrap();

    let results = join_all([bulkage.call((8, 13)), bulkage.call((8, 10))]).await;

    let values: Vec<u32> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![21, 18]);
    assert_eq!(recorder.bulks(), vec![vec![(8, 13), (8, 10)]]);
}

#[tokio::test]
async fn json_arguments_merge_by_value() {
    let recorder = Recorder::<(Value,)>::new();
    let bulkage =
        Bulkage::new(recorder.resolver(|(query,): &(Value,)| query["id"].clone())).unwrap();

    let results = join_all([
        bulkage.call((json!({"id": 7, "fields": ["name", "email"]}),)),
        bulkage.call((json!({"fields": ["name", "email"], "id": 7}),)),
        bulkage.call((json!({"id": 7, "fields": ["email", "name"]}),)),
    ])
    .await;

    let values: Vec<Value> = results.into_iter().map(Result::unwrap).collect();
    assert_eq!(values, vec![json!(7), json!(7), json!(7)]);
    // Key order is irrelevant; array order is not.
    assert_eq!(recorder.bulks()[0].len(), 2);
}

// ── Concurrency ──

#[tokio::test]
async fn calls_during_resolution_open_a_new_batch() {
    let recorder = Recorder::<(u32,)>::new();
    let inner = recorder.clone();
    let bulkage = Bulkage::new(move |bulk: Vec<(u32,)>| {
        inner.record(&bulk);
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, String>(bulk.into_iter().map(|(n,)| n).collect::<Vec<_>>())
        }
    })
    .unwrap();

    let first = bulkage.call((1,));
    next_turn().await;
    assert_eq!(recorder.calls(), 1);

    // The first bulk is still in flight.
    let second = bulkage.call((1,));
    next_turn().await;

    assert_eq!(first.await.unwrap(), 1);
    assert_eq!(second.await.unwrap(), 1);
    assert_eq!(recorder.bulks(), vec![vec![(1,)], vec![(1,)]]);
}

#[tokio::test]
async fn clones_share_one_ledger_across_tasks() {
    let counter = Counter::default();
    let invocations = counter.clone();
    let bulkage = Bulkage::new(move |bulk: Vec<(u32,)>| {
        invocations.bump();
        std::future::ready(Ok::<_, String>(
            bulk.into_iter().map(|(n,)| n * 2).collect::<Vec<_>>(),
        ))
    })
    .unwrap();

    let handles: Vec<_> = (0..10_u32)
        .map(|n| {
            let bulkage = bulkage.clone();
            tokio::spawn(async move { bulkage.call((n % 5,)).await })
        })
        .collect();

    let mut values = Vec::new();
    for handle in handles {
        values.push(handle.await.unwrap().unwrap());
    }

    assert_eq!(values, vec![0, 2, 4, 6, 8, 0, 2, 4, 6, 8]);
    assert_eq!(counter.get(), 1);
}

#[tokio::test]
async fn dropped_future_does_not_withdraw_call() {
    let recorder = Recorder::new();
    let bulkage = Bulkage::new(recorder.resolver(identity)).unwrap();

    drop(bulkage.call((3,)));
    let kept = bulkage.call((4,));

    assert_eq!(kept.await.unwrap(), 4);
    assert_eq!(recorder.bulks(), vec![vec![(3,), (4,)]]);
}
