use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, warn, LevelFilter};
use simple_logger::SimpleLogger;
use tokio::{
    fs::File,
    io::{AsyncBufReadExt, BufReader},
};
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use tally::{
    db::models::{Account, Approval, DailySnapshot, TokenSupply, Transfer},
    worker::ShutdownReport,
    Aggregator, ChainRouter, MemoryStore, Settings, TokenEvent,
};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .context("Failed to initialize logger")?;

    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let feed_path = settings
        .feed
        .as_ref()
        .map(|f| f.path.clone())
        .context("No event feed configured (feed.path)")?;

    let cancellation_token = CancellationToken::new();

    let aggregator = Arc::new(Aggregator::new(settings.snapshot.clone()));
    let router = ChainRouter::new(
        aggregator,
        &settings.worker,
        |_| MemoryStore::new(),
        cancellation_token.child_token(),
    );

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("Replaying events from {}. Press Ctrl+C to stop.", feed_path);

    let replay = replay_feed(router, &feed_path, cancellation_token.clone());
    tokio::pin!(replay);

    #[cfg(unix)]
    let result = {
        tokio::select! {
            result = &mut replay => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
                cancellation_token.cancel();
                replay.await
            },
            _ = sigterm_stream.recv() => {
                info!("Received SIGTERM, exiting gracefully...");
                cancellation_token.cancel();
                replay.await
            },
        }
    };

    #[cfg(not(unix))]
    let result = {
        tokio::select! {
            result = &mut replay => result,
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
                cancellation_token.cancel();
                replay.await
            },
        }
    };

    let report = result?;
    for (chain_id, store) in &report.stores {
        summarize(*chain_id, store);
    }
    for (chain_id, e) in &report.failures {
        error!("Chain {} stopped early: {:#}", chain_id, e);
    }

    report.into_result()?;
    info!("All workers stopped");
    Ok(())
}

/// Read the newline-delimited JSON feed, route every event to its chain
/// worker, then drain all workers.
async fn replay_feed<F>(
    mut router: ChainRouter<MemoryStore, F>,
    path: &str,
    cancellation_token: CancellationToken,
) -> anyhow::Result<ShutdownReport<MemoryStore>>
where
    F: Fn(u64) -> MemoryStore,
{
    let file = File::open(path)
        .await
        .with_context(|| format!("Failed to open event feed {path}"))?;
    let mut lines = BufReader::new(file).lines();

    let mut routed: u64 = 0;
    let mut line_number: u64 = 0;
    loop {
        if cancellation_token.is_cancelled() {
            warn!("Replay cancelled after {} events", routed);
            break;
        }

        line_number += 1;
        let Some(line) = lines
            .next_line()
            .await
            .with_context(|| format!("Failed to read line {}", line_number))?
        else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let event: TokenEvent = serde_json::from_str(&line)
            .with_context(|| format!("Invalid event on line {}", line_number))?;

        if let Err(e) = router.route(event).await {
            error!("Stopping replay: {:#}", e);
            break;
        }
        routed += 1;
    }

    info!("Routed {} events, waiting for workers to drain...", routed);
    Ok(router.shutdown().await)
}

fn summarize(chain_id: u64, store: &MemoryStore) {
    info!(
        "Chain {}: {} transfers, {} accounts, {} approvals, {} daily snapshots",
        chain_id,
        store.count::<Transfer>(),
        store.count::<Account>(),
        store.count::<Approval>(),
        store.count::<DailySnapshot>(),
    );

    let mut supplies = store.records::<TokenSupply>();
    supplies.sort_by(|a, b| a.token.cmp(&b.token));
    for supply in supplies {
        match serde_json::to_string(&supply) {
            Ok(json) => info!("{}", json),
            Err(e) => warn!("Failed to serialize supply of {}: {}", supply.token, e),
        }
    }
}
