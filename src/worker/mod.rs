pub mod chains;
pub mod events;
pub mod parser;
pub mod worker;

pub use chains::{ChainRouter, ShutdownReport};
pub use events::{ApprovalEvent, TokenEvent, TransferEvent};
pub use parser::{parse_log, parse_logs};
pub use worker::{PartitionWorker, WorkerMessage};
