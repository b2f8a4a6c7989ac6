//! Store identifier type.

use std::fmt;

/// Identity of a page store attached to a buffer pool.
///
/// Assigned by [`BufferPoolManager::attach_store`](crate::BufferPoolManager::attach_store)
/// and never reused within one pool. Frames record their owner by
/// `StoreId`, which is what `flush_store` filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoreId(pub u32);

impl StoreId {
    /// Create a new StoreId.
    #[inline]
    pub fn new(id: u32) -> Self {
        StoreId(id)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store({})", self.0)
    }
}
