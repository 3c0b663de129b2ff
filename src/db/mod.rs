//! Storage boundary of the aggregator.
//!
//! The aggregator talks to storage only through the [`Store`] trait:
//! - [`MemoryStore`] keeps every entity table in process memory.
//! - [`StagedStore`] buffers the writes of a single event so they reach the
//!   backing store all at once, or not at all.

mod memory;
pub mod models;
mod staged;
mod store;

pub use memory::MemoryStore;
pub use staged::StagedStore;
pub use store::{Entity, EntityKind, Store};
