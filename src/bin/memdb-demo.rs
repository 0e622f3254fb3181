//! memdb Demo
//!
//! Fills a guarded store from several threads, prints its contents and
//! optionally waits to show the sweeper reclaiming expired records.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use memdb::{SharedStore, StoreConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// memdb demo - insert, list and expire records
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of values to insert
    #[arg(short, long, default_value_t = 20)]
    count: u64,

    /// TTL of every inserted value, in seconds
    #[arg(short, long, default_value_t = 100)]
    ttl: u64,

    /// Number of inserting threads (0 = auto-detect based on CPU cores)
    #[arg(short, long, default_value_t = 0)]
    workers: usize,

    /// Sweep interval in milliseconds
    #[arg(long, default_value_t = 1000)]
    sweep_interval_ms: u64,

    /// Seconds to wait after inserting before reporting again
    #[arg(long, default_value_t = 0)]
    wait: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("memdb=info".parse()?))
        .init();

    let args = Args::parse();
    let workers = match args.workers {
        0 => num_cpus::get(),
        n => n,
    };

    let config =
        StoreConfig::new().with_sweep_interval(Duration::from_millis(args.sweep_interval_ms));
    let store = Arc::new(SharedStore::with_config(config));

    info!(
        "Inserting {} values with ttl={}s from {} threads",
        args.count, args.ttl, workers
    );

    let started = Instant::now();
    let threads: Vec<_> = (0..workers)
        .map(|w| {
            let store = Arc::clone(&store);
            let (count, ttl) = (args.count, args.ttl);
            thread::Builder::new()
                .name(format!("inserter-{}", w))
                .spawn(move || {
                    for i in (w as u64..count).step_by(workers) {
                        store.insert(i, ttl);
                    }
                })
        })
        .collect::<Result<_, _>>()?;

    for handle in threads {
        handle
            .join()
            .map_err(|_| anyhow::anyhow!("inserter thread panicked"))?;
    }

    info!("Inserted {} records in {:?}", store.len(), started.elapsed());
    let mut values = store.get_all();
    values.sort_unstable();
    println!("{:?}", values);

    if args.wait > 0 {
        tokio::time::sleep(Duration::from_secs(args.wait)).await;
        info!(
            "After {}s: {} records left, {} expired",
            args.wait,
            store.len(),
            store.stats().expired
        );
    }

    store.close();
    Ok(())
}
