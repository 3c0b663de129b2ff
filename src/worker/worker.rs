use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use log::{info, warn};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{
    aggregator::Aggregator,
    db::Store,
    worker::events::TokenEvent,
};

/// Interval for logging progress updates (10 seconds)
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

pub enum WorkerMessage {
    /// Next event of the partition, in (block, log index) order
    Event(TokenEvent),
    /// Stop after everything queued before this message was applied
    Shutdown,
}

/// Single writer for one chain's state.
///
/// Owns the chain's store outright and applies events strictly in the order
/// they arrive on its channel, which gives every read-modify-write in the
/// reducers exclusive access without locks.
pub struct PartitionWorker<S> {
    chain_id: u64,
    store: S,
    aggregator: Arc<Aggregator>,
    receiver: mpsc::Receiver<WorkerMessage>,
}

impl<S: Store + Send + 'static> PartitionWorker<S> {
    pub fn new(
        chain_id: u64,
        store: S,
        aggregator: Arc<Aggregator>,
        receiver: mpsc::Receiver<WorkerMessage>,
    ) -> Self {
        Self {
            chain_id,
            store,
            aggregator,
            receiver,
        }
    }

    /// Apply events until shutdown, cancellation, or the first failing event.
    ///
    /// Hands the store back on a clean stop. On error the failing event was
    /// not applied (see [`Aggregator::apply`]) and can be retried as is.
    pub async fn run(mut self, cancellation_token: CancellationToken) -> anyhow::Result<S> {
        let mut applied: u64 = 0;
        let mut last_progress_log = Instant::now();

        loop {
            tokio::select! {
                biased; // Check cancellation first

                _ = cancellation_token.cancelled() => {
                    info!("Worker for chain {} received cancellation signal", self.chain_id);
                    break;
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(WorkerMessage::Event(event)) => {
                            if event.chain_id() != self.chain_id {
                                warn!(
                                    "Worker for chain {} dropped an event of chain {}",
                                    self.chain_id,
                                    event.chain_id()
                                );
                                continue;
                            }

                            self.aggregator.apply(&mut self.store, &event)?;
                            applied += 1;

                            if last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                                info!(
                                    "Chain {}: {} events applied, at block {}",
                                    self.chain_id,
                                    applied,
                                    event.block_number()
                                );
                                last_progress_log = Instant::now();
                            }
                        }
                        Some(WorkerMessage::Shutdown) | None => {
                            info!("Worker for chain {} received shutdown signal", self.chain_id);
                            break;
                        }
                    }
                }
            }
        }

        info!(
            "Worker for chain {} stopped after {} events",
            self.chain_id, applied
        );
        Ok(self.store)
    }
}
