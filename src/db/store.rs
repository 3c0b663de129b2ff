//! Keyed store abstraction consumed by the aggregator.
//!
//! The aggregator only needs three operations per entity type: `get`, a full
//! overwrite `set`, and `get_or_create`. How records are physically kept is up
//! to the implementation.

use std::any::Any;

/// Discriminates the entity tables of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Account,
    TokenSupply,
    Transfer,
    AccountBalanceSnapshot,
    HourlySnapshot,
    DailySnapshot,
    WeeklySnapshot,
    CrossTokenDailySnapshot,
    AccountDailyActivity,
    DailyActiveAddress,
    WeeklyActiveAddress,
    Approval,
}

/// A record that can be kept in a [`Store`].
pub trait Entity: Any + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Composite key of this record (see [`crate::utils::ids`]).
    fn id(&self) -> &str;
}

pub trait Store {
    fn get<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>>;

    /// Upsert with full overwrite.
    fn set<E: Entity>(&mut self, record: E) -> anyhow::Result<()>;

    /// Returns the stored record, inserting `default()` first when absent.
    /// Never overwrites an existing record.
    fn get_or_create<E, F>(&mut self, id: &str, default: F) -> anyhow::Result<E>
    where
        E: Entity,
        F: FnOnce() -> E,
    {
        if let Some(existing) = self.get::<E>(id)? {
            return Ok(existing);
        }

        let record = default();
        self.set(record.clone())?;
        Ok(record)
    }

    fn contains<E: Entity>(&self, id: &str) -> anyhow::Result<bool> {
        Ok(self.get::<E>(id)?.is_some())
    }
}
