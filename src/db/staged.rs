use std::any::Any;

use anyhow::{anyhow, Context};
use rustc_hash::FxHashMap;

use super::store::{Entity, EntityKind, Store};

/// A buffered write that knows how to flush itself into the backing store.
trait StagedRecord<S: Store>: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn write(self: Box<Self>, store: &mut S) -> anyhow::Result<()>;
}

impl<S: Store, E: Entity> StagedRecord<S> for E {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn write(self: Box<Self>, store: &mut S) -> anyhow::Result<()> {
        store.set(*self)
    }
}

/// Write buffer over a backing store, scoped to a single event.
///
/// Reads see buffered writes first. Nothing reaches the backing store until
/// [`commit`](Self::commit); dropping the stage discards every buffered write,
/// so a reducer that fails halfway leaves the backing store untouched.
pub struct StagedStore<'a, S: Store> {
    inner: &'a mut S,
    pending: FxHashMap<(EntityKind, String), Box<dyn StagedRecord<S> + 'a>>,
    // write order, so commit replays in the order the reducer issued writes
    order: Vec<(EntityKind, String)>,
}

impl<'a, S: Store> StagedStore<'a, S> {
    pub fn new(inner: &'a mut S) -> Self {
        Self {
            inner,
            pending: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    /// Number of distinct records written so far.
    pub fn pending_writes(&self) -> usize {
        self.order.len()
    }

    /// Flush every buffered record into the backing store.
    pub fn commit(mut self) -> anyhow::Result<usize> {
        let count = self.order.len();
        for key in std::mem::take(&mut self.order) {
            if let Some(record) = self.pending.remove(&key) {
                record
                    .write(self.inner)
                    .with_context(|| format!("Failed to commit {:?}/{}", key.0, key.1))?;
            }
        }
        Ok(count)
    }
}

impl<'a, S: Store> Store for StagedStore<'a, S> {
    fn get<E: Entity>(&self, id: &str) -> anyhow::Result<Option<E>> {
        if let Some(staged) = self.pending.get(&(E::KIND, id.to_string())) {
            return staged
                .as_any()
                .downcast_ref::<E>()
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    anyhow!("Staged record {:?}/{} has an unexpected type", E::KIND, id)
                });
        }
        self.inner.get(id)
    }

    fn set<E: Entity>(&mut self, record: E) -> anyhow::Result<()> {
        let key = (E::KIND, record.id().to_string());
        if !self.pending.contains_key(&key) {
            self.order.push(key.clone());
        }
        self.pending.insert(key, Box::new(record));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{models::Approval, MemoryStore};
    use num_bigint::BigInt;

    fn approval(spender: &str, amount: i64) -> Approval {
        Approval::new(1, "0xtoken", "0xowner", spender, BigInt::from(amount), 10, 1_000)
    }

    #[test]
    fn test_reads_see_staged_writes() {
        let mut store = MemoryStore::new();
        let mut staged = StagedStore::new(&mut store);
        let record = approval("0xspender", 5);
        let id = record.id.clone();
        staged.set(record).unwrap();

        let got: Approval = staged.get(&id).unwrap().unwrap();
        assert_eq!(got.amount, BigInt::from(5));
        assert_eq!(staged.pending_writes(), 1);
    }

    #[test]
    fn test_drop_discards_writes() {
        let mut store = MemoryStore::new();
        {
            let mut staged = StagedStore::new(&mut store);
            staged.set(approval("0xspender", 5)).unwrap();
        }
        assert_eq!(store.count::<Approval>(), 0);
    }

    #[test]
    fn test_commit_flushes_latest_value() {
        let mut store = MemoryStore::new();
        let mut staged = StagedStore::new(&mut store);
        staged.set(approval("0xa", 1)).unwrap();
        staged.set(approval("0xb", 2)).unwrap();
        staged.set(approval("0xa", 3)).unwrap();
        assert_eq!(staged.commit().unwrap(), 2);

        let a: Approval = store.get(&approval("0xa", 0).id).unwrap().unwrap();
        assert_eq!(a.amount, BigInt::from(3));
        assert_eq!(store.count::<Approval>(), 2);
    }

    /// Foreign record type claiming the approval table.
    #[derive(Clone, Debug)]
    struct Impostor {
        id: String,
    }

    impl Entity for Impostor {
        const KIND: EntityKind = EntityKind::Approval;

        fn id(&self) -> &str {
            &self.id
        }
    }

    #[test]
    fn test_mismatched_staged_type_is_an_error() {
        let mut store = MemoryStore::new();
        let mut staged = StagedStore::new(&mut store);
        let record = approval("0xspender", 5);
        let id = record.id.clone();
        staged.set(record).unwrap();

        let err = staged.get::<Impostor>(&id).unwrap_err();
        assert!(err.to_string().contains("unexpected type"));
        // the matching type still reads fine
        assert!(staged.get::<Approval>(&id).unwrap().is_some());
    }
}
