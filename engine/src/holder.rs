use crate::index::InvertedIndex;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Publishes the current index to concurrent readers.
///
/// Readers clone the `Arc` and traverse the index without holding any lock;
/// the lock only guards the pointer itself. A swapped-out index lives on
/// until its last reader drops it.
#[derive(Debug)]
pub struct IndexHolder {
    current: RwLock<Arc<InvertedIndex>>,
    generation: AtomicU64,
}

/// Outcome of [`IndexHolder::swap`].
#[derive(Debug)]
pub struct Swapped {
    pub previous: Arc<InvertedIndex>,
    /// Generation of the index just installed.
    pub generation: u64,
}

impl Default for IndexHolder {
    fn default() -> Self {
        Self::new(InvertedIndex::new())
    }
}

impl IndexHolder {
    pub fn new(index: InvertedIndex) -> Self {
        Self { current: RwLock::new(Arc::new(index)), generation: AtomicU64::new(0) }
    }

    /// Snapshot of the current index, stable for as long as it is held.
    pub fn acquire(&self) -> Arc<InvertedIndex> {
        Arc::clone(&self.current.read())
    }

    /// Install `index` as current and hand back the one it replaces.
    ///
    /// The generation is bumped under the same write lock as the pointer, so
    /// each swap reports a distinct number matching the order of installs.
    pub fn swap(&self, index: InvertedIndex) -> Swapped {
        let index = Arc::new(index);
        let mut current = self.current.write();
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let previous = std::mem::replace(&mut *current, index);
        Swapped { previous, generation }
    }

    /// Number of swaps so far.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
