//! Thread-safe wrapper around a [`BufferPoolManager`].

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::buffer::BufferPoolManager;
use crate::storage::PageStore;

/// A buffer pool shared between threads.
///
/// Every operation runs under one mutex, so calls from different threads
/// are serialized exactly as they would be on a single thread. Handles
/// obtained under one lock stay meaningful under the next as long as the
/// pin they stand for is held.
///
/// # Example
/// ```
/// use clockpool::{BufferPoolManager, MemoryStore, SharedBufferPool};
///
/// let pool = SharedBufferPool::new(BufferPoolManager::new(4));
/// let store = pool.lock().attach_store(MemoryStore::new());
///
/// let worker = pool.clone();
/// std::thread::spawn(move || {
///     let (page_id, _) = worker.lock().allocate_page(store).unwrap();
///     worker.lock().release_page(store, page_id, true).unwrap();
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(pool.lock().resident_count(), 1);
/// ```
pub struct SharedBufferPool<S: PageStore = Box<dyn PageStore>> {
    inner: Arc<Mutex<BufferPoolManager<S>>>,
}

impl<S: PageStore> SharedBufferPool<S> {
    pub fn new(bpm: BufferPoolManager<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(bpm)),
        }
    }

    /// Lock the pool for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, BufferPoolManager<S>> {
        self.inner.lock()
    }

    /// Run `f` with the pool locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut BufferPoolManager<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<S: PageStore> Clone for SharedBufferPool<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
