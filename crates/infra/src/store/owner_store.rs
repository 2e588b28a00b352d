use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use invoiceai_core::OwnerId;

/// Record storage partitioned by owner.
///
/// Callers always name the owner; there is no operation that reaches across
/// partitions, so one owner's keys never resolve for another.
pub trait OwnerStore<K, V>: Send + Sync {
    fn get(&self, owner: &OwnerId, key: &K) -> Option<V>;
    fn upsert(&self, owner: &OwnerId, key: K, value: V);
    /// Remove and return the record, if present.
    fn remove(&self, owner: &OwnerId, key: &K) -> Option<V>;
    /// Every record in the owner's partition, in no particular order.
    fn list(&self, owner: &OwnerId) -> Vec<V>;
}

impl<K, V, S> OwnerStore<K, V> for Arc<S>
where
    S: OwnerStore<K, V> + ?Sized,
{
    fn get(&self, owner: &OwnerId, key: &K) -> Option<V> {
        S::get(self, owner, key)
    }

    fn upsert(&self, owner: &OwnerId, key: K, value: V) {
        S::upsert(self, owner, key, value)
    }

    fn remove(&self, owner: &OwnerId, key: &K) -> Option<V> {
        S::remove(self, owner, key)
    }

    fn list(&self, owner: &OwnerId) -> Vec<V> {
        S::list(self, owner)
    }
}

type Partitions<K, V> = HashMap<OwnerId, HashMap<K, V>>;

/// Process-local [`OwnerStore`]: one map per owner behind a single lock.
///
/// A writer that panicked mid-operation leaves the lock poisoned; the map is
/// still consistent (every mutation is a single insert/remove), so the guard
/// is recovered and operations carry on.
#[derive(Debug)]
pub struct InMemoryOwnerStore<K, V> {
    partitions: RwLock<Partitions<K, V>>,
}

impl<K, V> InMemoryOwnerStore<K, V> {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Partitions<K, V>> {
        self.partitions.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Partitions<K, V>> {
        self.partitions.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> Default for InMemoryOwnerStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> OwnerStore<K, V> for InMemoryOwnerStore<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, owner: &OwnerId, key: &K) -> Option<V> {
        self.read().get(owner)?.get(key).cloned()
    }

    fn upsert(&self, owner: &OwnerId, key: K, value: V) {
        self.write()
            .entry(owner.clone())
            .or_default()
            .insert(key, value);
    }

    fn remove(&self, owner: &OwnerId, key: &K) -> Option<V> {
        let mut partitions = self.write();
        let records = partitions.get_mut(owner)?;
        let removed = records.remove(key);
        if records.is_empty() {
            partitions.remove(owner);
        }
        removed
    }

    fn list(&self, owner: &OwnerId) -> Vec<V> {
        self.read()
            .get(owner)
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(id: &str) -> OwnerId {
        OwnerId::new(id).unwrap()
    }

    #[test]
    fn records_are_isolated_per_owner() {
        let store: InMemoryOwnerStore<u32, &'static str> = InMemoryOwnerStore::new();
        let (a, b) = (owner("user_a"), owner("user_b"));

        store.upsert(&a, 1, "a1");
        store.upsert(&b, 1, "b1");

        assert_eq!(store.get(&a, &1), Some("a1"));
        assert_eq!(store.get(&b, &1), Some("b1"));
        assert_eq!(store.list(&a), vec!["a1"]);

        assert_eq!(store.remove(&a, &1), Some("a1"));
        assert_eq!(store.get(&a, &1), None);
        assert!(store.list(&a).is_empty());
        assert_eq!(store.get(&b, &1), Some("b1"));
        assert_eq!(store.remove(&a, &1), None);
    }

    #[test]
    fn works_through_arc() {
        let store = Arc::new(InMemoryOwnerStore::<u32, u32>::new());
        let o = owner("user_a");
        OwnerStore::upsert(&store, &o, 7, 70);
        assert_eq!(OwnerStore::get(&store, &o, &7), Some(70));
    }

    #[test]
    fn keeps_accepting_writes_after_a_writer_panics() {
        let store = Arc::new(InMemoryOwnerStore::<u32, u32>::new());
        let o = owner("user_a");
        store.upsert(&o, 1, 10);

        let poisoner = Arc::clone(&store);
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.partitions.write().unwrap();
            panic!("writer died holding the lock");
        })
        .join();
        assert!(joined.is_err());
        assert!(store.partitions.is_poisoned());

        store.upsert(&o, 2, 20);
        assert_eq!(store.get(&o, &1), Some(10));
        assert_eq!(store.get(&o, &2), Some(20));

        let mut all = store.list(&o);
        all.sort();
        assert_eq!(all, vec![10, 20]);
        assert_eq!(store.remove(&o, &1), Some(10));
    }
}
