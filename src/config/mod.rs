#[allow(clippy::module_inception)]
mod config;

pub use config::{FeedSettings, Settings, SnapshotSettings, WorkerSettings};
