//! Duplicate-application protection for stock adjustments.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};

/// Record of transaction ids whose stock adjustment has already been
/// applied. Guards against re-running the adjustment for the same invoice
/// (screen re-focus, double tap).
///
/// The store is constructor-injected into the adjuster so tests and
/// multiple app instances never share hidden state. In-memory
/// implementations do not survive a process restart and offer no
/// cross-device protection; that limitation is accepted, not a guarantee.
pub trait DedupStore: Send + Sync {
    fn has(&self, transaction_id: &str) -> bool;
    fn add(&self, transaction_id: &str);
    fn remove(&self, transaction_id: &str);
    fn clear(&self);
    /// All recorded ids, sorted for deterministic inspection.
    fn list(&self) -> Vec<String>;
    fn count(&self) -> usize;
}

impl<D> DedupStore for Arc<D>
where
    D: DedupStore + ?Sized,
{
    fn has(&self, transaction_id: &str) -> bool {
        (**self).has(transaction_id)
    }

    fn add(&self, transaction_id: &str) {
        (**self).add(transaction_id)
    }

    fn remove(&self, transaction_id: &str) {
        (**self).remove(transaction_id)
    }

    fn clear(&self) {
        (**self).clear()
    }

    fn list(&self) -> Vec<String> {
        (**self).list()
    }

    fn count(&self) -> usize {
        (**self).count()
    }
}

/// In-memory dedup set for tests and single-process use.
#[derive(Debug, Default)]
pub struct InMemoryDedupStore {
    inner: RwLock<HashSet<String>>,
}

impl InMemoryDedupStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DedupStore for InMemoryDedupStore {
    fn has(&self, transaction_id: &str) -> bool {
        match self.inner.read() {
            Ok(set) => set.contains(transaction_id),
            Err(_) => false,
        }
    }

    fn add(&self, transaction_id: &str) {
        if let Ok(mut set) = self.inner.write() {
            set.insert(transaction_id.to_string());
        }
    }

    fn remove(&self, transaction_id: &str) {
        if let Ok(mut set) = self.inner.write() {
            set.remove(transaction_id);
        }
    }

    fn clear(&self) {
        if let Ok(mut set) = self.inner.write() {
            set.clear();
        }
    }

    fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = match self.inner.read() {
            Ok(set) => set.iter().cloned().collect(),
            Err(_) => vec![],
        };
        ids.sort();
        ids
    }

    fn count(&self) -> usize {
        match self.inner.read() {
            Ok(set) => set.len(),
            Err(_) => 0,
        }
    }
}
