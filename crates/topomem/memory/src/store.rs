use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::atom::{MemoryAtom, StoredAtom};
use crate::error::StoreError;
use crate::query::{AtomQuery, Tail};
use crate::stats::StoreStats;

/// Append-only log of memory atoms.
///
/// Sequence numbers are strictly increasing and never reused. Appends are
/// serialized; scans may run concurrently with them and only ever observe
/// complete records.
#[async_trait]
pub trait AtomStore: Send + Sync {
    /// Assign the next sequence number and persist the atom.
    async fn append(&self, atom: MemoryAtom) -> Result<StoredAtom, StoreError>;

    /// Visit every atom in append order.
    async fn scan(
        &self,
        visit: &mut (dyn FnMut(StoredAtom) + Send),
    ) -> Result<(), StoreError>;

    /// Highest sequence number assigned so far.
    fn latest_seq(&self) -> Option<u64>;

    /// The most recent `limit` matches, oldest first.
    async fn query(&self, query: &AtomQuery) -> Result<Vec<StoredAtom>, StoreError> {
        query.validate()?;
        let mut tail = Tail::new(query.effective_limit());
        self.scan(&mut |stored| {
            if query.matches(&stored) {
                tail.push(stored);
            }
        })
        .await?;
        Ok(tail.into_vec())
    }

    async fn replay(&self) -> Result<Vec<StoredAtom>, StoreError> {
        let mut all = Vec::new();
        self.scan(&mut |stored| all.push(stored)).await?;
        Ok(all)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut stats = StoreStats::default();
        self.scan(&mut |stored| stats.record(&stored)).await?;
        Ok(stats)
    }
}

/// Volatile store with the same contract as the durable one.
pub struct InMemoryAtomStore {
    atoms: RwLock<Vec<StoredAtom>>,
    last_seq: AtomicU64,
}

impl InMemoryAtomStore {
    pub fn new() -> Self {
        Self {
            atoms: RwLock::new(Vec::new()),
            last_seq: AtomicU64::new(0),
        }
    }

    pub async fn len(&self) -> usize {
        self.atoms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.atoms.read().await.is_empty()
    }
}

impl Default for InMemoryAtomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AtomStore for InMemoryAtomStore {
    async fn append(&self, atom: MemoryAtom) -> Result<StoredAtom, StoreError> {
        let mut atoms = self.atoms.write().await;
        let seq = self.last_seq.load(Ordering::SeqCst) + 1;
        let stored = StoredAtom { seq, atom };
        atoms.push(stored.clone());
        self.last_seq.store(seq, Ordering::SeqCst);
        debug!(seq, atom_id = %stored.atom.atom_id, "atom appended");
        Ok(stored)
    }

    async fn scan(
        &self,
        visit: &mut (dyn FnMut(StoredAtom) + Send),
    ) -> Result<(), StoreError> {
        let atoms = self.atoms.read().await;
        for stored in atoms.iter() {
            visit(stored.clone());
        }
        Ok(())
    }

    fn latest_seq(&self) -> Option<u64> {
        match self.last_seq.load(Ordering::SeqCst) {
            0 => None,
            seq => Some(seq),
        }
    }
}
