//! Config-driven policy selection end to end.

use std::io::Write;

use bulkage::{BatchPolicy, Bulkage};
use bulkage_config::{BulkageConfig, ConfigError};
use pretty_assertions::assert_eq;

use crate::common::{Recorder, elapse};

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[tokio::test(start_paused = true)]
async fn debounce_section_drives_scheduler() {
    let file = write_config("[batch]\ndebounce_ms = 10\nlabel = \"lookup\"\n");
    let config = BulkageConfig::load_from(file.path()).unwrap();
    let policy = config.batch_policy().unwrap();
    assert!(!policy.is_tick());

    let recorder = Recorder::new();
    let bulkage = Bulkage::with_policy(policy, recorder.resolver(|(n,): &(u32,)| *n))
        .unwrap()
        .named(config.label().unwrap());

    let _pending = bulkage.call((4,));
    elapse(9).await;
    assert_eq!(recorder.calls(), 0);
    elapse(1).await;
    assert_eq!(recorder.calls(), 1);
    assert_eq!(bulkage.label(), "lookup");
}

#[tokio::test]
async fn empty_config_batches_per_turn() {
    let file = write_config("");
    let config = BulkageConfig::load_from(file.path()).unwrap();
    assert_eq!(config.batch_policy().unwrap(), BatchPolicy::Tick);

    let recorder = Recorder::new();
    let bulkage =
        Bulkage::with_policy(config.batch_policy().unwrap(), recorder.resolver(|(n,): &(u32,)| *n))
            .unwrap();

    assert_eq!(bulkage.call((4,)).await.unwrap(), 4);
}

#[test]
fn invalid_policy_is_reported() {
    let file = write_config("[batch]\nmax_wait_ms = 15\n");
    let config = BulkageConfig::load_from(file.path()).unwrap();

    let err = ConfigError::from(config.batch_policy().unwrap_err());
    assert_eq!(err.to_string(), "max wait requires a debounce delay");
    assert!(err.path().is_none());
}
