//! Memo Cache maintenance tool
//!
//! Inspects, purges or flushes the persisted snapshot of a named cache.
//!
//! ```text
//! memo_cache <inspect|purge|flush> <name>
//! ```
//!
//! The snapshot directory comes from `MEMO_CACHE_DIR` (default: `__local_cache__`).

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use chrono::Utc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use memo_cache::cache::EntryStore;
use memo_cache::persist::merge_snapshot;
use memo_cache::{CacheOptions, FileSnapshotStore, MemoCache, Snapshot, SnapshotStore};

const USAGE: &str = "usage: memo_cache <inspect|purge|flush> <name>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Print live and expired entry counts
    Inspect,
    /// Rewrite the snapshot without expired entries
    Purge,
    /// Rewrite the snapshot empty
    Flush,
}

fn main() -> ExitCode {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memo_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: &[String]) -> anyhow::Result<(Command, String)> {
    let [command, name] = args else {
        bail!("{USAGE}");
    };

    let command = match command.as_str() {
        "inspect" => Command::Inspect,
        "purge" => Command::Purge,
        "flush" => Command::Flush,
        other => bail!("unknown command '{other}'\n{USAGE}"),
    };
    Ok((command, name.clone()))
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let (command, name) = parse_args(args)?;

    let options = CacheOptions::from_env(&name).with_persisted(true);
    options.validate()?;
    let backend = FileSnapshotStore::from_options(&options);

    match command {
        Command::Inspect => {
            let now = Utc::now();
            match backend.load().context("reading snapshot")? {
                Some(snapshot) => {
                    let live = snapshot.live_count(now);
                    println!(
                        "{name}: {} entries ({live} live, {} expired) in {}",
                        snapshot.len(),
                        snapshot.len() - live,
                        backend.describe()
                    );
                }
                None => println!("{name}: no snapshot at {}", backend.describe()),
            }
        }
        Command::Purge => {
            let Some(snapshot) = backend.load().context("reading snapshot")? else {
                info!(cache = %name, "Nothing to purge");
                return Ok(());
            };

            let before = snapshot.len();
            let mut store = EntryStore::new();
            merge_snapshot(&mut store, snapshot, Utc::now());
            backend
                .save(&Snapshot::from_store(&store))
                .context("writing snapshot")?;

            info!(cache = %name, removed = before - store.len(), kept = store.len(), "Snapshot purged");
        }
        Command::Flush => {
            MemoCache::new(options)?.flush().context("flushing snapshot")?;
        }
    }

    Ok(())
}
