use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    aggregator::Aggregator,
    config::WorkerSettings,
    db::Store,
    worker::{
        events::TokenEvent,
        worker::{PartitionWorker, WorkerMessage},
    },
};

/// Represents a running chain partition
struct RunningPartition<S> {
    sender: mpsc::Sender<WorkerMessage>,
    handle: JoinHandle<Result<S>>,
}

/// Routes events to one [`PartitionWorker`] per chain.
///
/// Chains never share state (every key is chain scoped), so their workers run
/// concurrently without coordination. Events of one chain all go through the
/// same bounded channel and are applied in the order they were routed.
///
/// Workers are spawned lazily on the first event of a chain, each with a
/// fresh store from `store_factory`.
pub struct ChainRouter<S, F> {
    partitions: HashMap<u64, RunningPartition<S>>,
    aggregator: Arc<Aggregator>,
    channel_size: usize,
    store_factory: F,
    cancellation_token: CancellationToken,
}

impl<S, F> ChainRouter<S, F>
where
    S: Store + Send + 'static,
    F: Fn(u64) -> S,
{
    pub fn new(
        aggregator: Arc<Aggregator>,
        settings: &WorkerSettings,
        store_factory: F,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            partitions: HashMap::new(),
            aggregator,
            channel_size: settings.channel_size.max(1),
            store_factory,
            cancellation_token,
        }
    }

    /// Chains with a running worker.
    pub fn chains(&self) -> Vec<u64> {
        let mut chains: Vec<u64> = self.partitions.keys().copied().collect();
        chains.sort_unstable();
        chains
    }

    fn start_partition(&mut self, chain_id: u64) -> &RunningPartition<S> {
        self.partitions.entry(chain_id).or_insert_with(|| {
            info!("Starting worker for chain {}", chain_id);

            let (sender, receiver) = mpsc::channel(self.channel_size);
            let worker = PartitionWorker::new(
                chain_id,
                (self.store_factory)(chain_id),
                self.aggregator.clone(),
                receiver,
            );
            let worker_token = self.cancellation_token.child_token();

            let handle = tokio::spawn(async move {
                let result = worker.run(worker_token).await;
                if let Err(e) = &result {
                    error!("Worker for chain {} failed: {:#}", chain_id, e);
                }
                result
            });

            RunningPartition { sender, handle }
        })
    }

    /// Queue an event on its chain's worker, waiting while the queue is full.
    pub async fn route(&mut self, event: TokenEvent) -> Result<()> {
        let chain_id = event.chain_id();
        let partition = self.start_partition(chain_id);

        partition
            .sender
            .send(WorkerMessage::Event(event))
            .await
            .map_err(|_| anyhow!("Worker for chain {} has stopped", chain_id))
    }

    /// Stop every worker after it drained its queue and collect the stores.
    ///
    /// All workers are stopped even if some of them failed. Stores of the
    /// healthy chains are returned alongside the failures.
    pub async fn shutdown(self) -> ShutdownReport<S> {
        let mut report = ShutdownReport {
            stores: Vec::with_capacity(self.partitions.len()),
            failures: Vec::new(),
        };

        let mut partitions: Vec<(u64, RunningPartition<S>)> = self.partitions.into_iter().collect();
        partitions.sort_unstable_by_key(|(chain_id, _)| *chain_id);

        for (chain_id, partition) in partitions {
            // A failed worker has already dropped its receiver.
            let _ = partition.sender.send(WorkerMessage::Shutdown).await;

            let result = partition
                .handle
                .await
                .with_context(|| format!("Failed to join worker task for chain {}", chain_id))
                .and_then(|r| r);

            match result {
                Ok(store) => report.stores.push((chain_id, store)),
                Err(e) => report.failures.push((chain_id, e)),
            }
        }

        info!(
            "All chain workers stopped ({} healthy, {} failed)",
            report.stores.len(),
            report.failures.len()
        );
        report
    }
}

/// Stores and failures collected by [`ChainRouter::shutdown`], ordered by chain.
pub struct ShutdownReport<S> {
    pub stores: Vec<(u64, S)>,
    pub failures: Vec<(u64, anyhow::Error)>,
}

impl<S> ShutdownReport<S> {
    /// All stores, or the first failure.
    pub fn into_result(self) -> Result<Vec<(u64, S)>> {
        match self.failures.into_iter().next() {
            Some((chain_id, e)) => Err(e.context(format!("Worker for chain {} failed", chain_id))),
            None => Ok(self.stores),
        }
    }
}
