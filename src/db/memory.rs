use std::any::Any;

use anyhow::anyhow;
use rustc_hash::FxHashMap;

use super::store::{Entity, EntityKind, Store};

type Table = FxHashMap<String, Box<dyn Any + Send + Sync>>;

/// In-process keyed store, one hash table per entity kind.
///
/// Each partition worker owns one of these for its chain, so no locking is
/// needed.
#[derive(Default)]
pub struct MemoryStore {
    tables: FxHashMap<EntityKind, Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records of kind `E`.
    pub fn count<E: Entity>(&self) -> usize {
        self.tables.get(&E::KIND).map_or(0, |t| t.len())
    }

    /// All records of kind `E`, in no particular order.
    pub fn records<E: Entity>(&self) -> Vec<E> {
        self.tables
            .get(&E::KIND)
            .map(|table| {
                table
                    .values()
                    .filter_map(|r| r.downcast_ref::<E>().cloned())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl Store for MemoryStore {
    fn get<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>> {
        let Some(record) = self.tables.get(&E::KIND).and_then(|t| t.get(id)) else {
            return Ok(None);
        };

        record
            .downcast_ref::<E>()
            .cloned()
            .map(Some)
            .ok_or_else(|| anyhow!("Record {:?}/{} has an unexpected type", E::KIND, id))
    }

    fn set<E: Entity>(&mut self, record: E) -> anyhow::Result<()> {
        let id = record.id().to_string();
        self.tables
            .entry(E::KIND)
            .or_default()
            .insert(id, Box::new(record));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::Approval;
    use num_bigint::BigInt;

    fn approval(amount: i64) -> Approval {
        Approval::new(1, "0xtoken", "0xowner", "0xspender", BigInt::from(amount), 10, 1_000)
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = MemoryStore::new();
        assert!(store.get::<Approval>("nope").unwrap().is_none());
        assert_eq!(store.count::<Approval>(), 0);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = MemoryStore::new();
        store.set(approval(100)).unwrap();
        store.set(approval(50)).unwrap();

        let id = approval(0).id;
        let stored: Approval = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.amount, BigInt::from(50));
        assert_eq!(store.count::<Approval>(), 1);
    }

    #[test]
    fn test_get_or_create_keeps_existing() {
        let mut store = MemoryStore::new();
        store.set(approval(100)).unwrap();

        let id = approval(0).id;
        let got = store.get_or_create(&id, || approval(7)).unwrap();
        assert_eq!(got.amount, BigInt::from(100));

        let stored: Approval = store.get(&id).unwrap().unwrap();
        assert_eq!(stored.amount, BigInt::from(100));
    }
}
