//! Bulkage demo - collapses an N+1 lookup pattern into bulk fetches.
//!
//! Loads the batching policy from `~/.bulkage/config.toml` (or
//! `$BULKAGE_CONFIG`), fires a burst of single-user lookups with repeated
//! ids, and reports how many round trips the store actually saw. Passing id
//! `0` makes the store refuse the trip, and every lookup batched with it
//! reports the same error.
//!
//! Set `RUST_LOG=bulkage=debug` to watch bulks form, or
//! `RUST_LOG=bulkage::trace=trace` for per-entry detail.

mod store;

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::future::join_all;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bulkage::{BatchPolicy, Bulkage};
use bulkage_config::BulkageConfig;

use store::UserStore;

const STORE_LATENCY: Duration = Duration::from_millis(20);

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

/// Ids from the command line, or a default burst with duplicates.
fn requested_ids() -> Result<Vec<u32>> {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return Ok(vec![1, 8, 2, 8, 13, 1, 99, 3]);
    }
    args.iter()
        .map(|arg| {
            arg.parse::<u32>()
                .with_context(|| format!("invalid user id: {arg}"))
        })
        .collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let config = BulkageConfig::load()
        .context("loading bulkage config")?
        .unwrap_or_default();
    let policy = config.batch_policy().context("reading [batch] policy")?;
    let label = config.label().unwrap_or_else(|| "user-store".to_string());
    match policy {
        BatchPolicy::Tick => tracing::info!("Batching per scheduling turn"),
        BatchPolicy::Debounce(debounce) => tracing::info!(
            debounce = ?debounce.debounce(),
            max_wait = ?debounce.max(),
            "Batching with debounce"
        ),
    }

    let ids = requested_ids()?;
    let store = UserStore::seeded(STORE_LATENCY);
    let resolver_store = store.clone();
    let users = Bulkage::with_policy(policy, move |ids: Vec<(u32,)>| {
        let store = resolver_store.clone();
        async move { store.fetch_many(ids).await }
    })?
    .named(label);

    let lookups = ids.iter().map(|&id| users.call((id,)));
    let results = join_all(lookups).await;

    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(user) if user.name.is_empty() => println!("{id:>4}  <unknown>"),
            Ok(user) => println!("{id:>4}  {}", user.name),
            Err(err) => println!("{id:>4}  error: {err}"),
        }
    }
    println!(
        "{} lookups, {} round trip(s) via {}",
        ids.len(),
        store.round_trips(),
        users.label()
    );

    Ok(())
}
