pub mod abis;
pub mod aggregator;
pub mod config;
pub mod db;
pub mod utils;
pub mod worker;

pub use aggregator::{Aggregator, EventOutcome};
pub use config::Settings;
pub use db::{MemoryStore, Store};
pub use worker::{ChainRouter, PartitionWorker, TokenEvent};
