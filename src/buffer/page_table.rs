//! Page table - maps resident `(store, page)` pairs to frames.

use std::collections::HashMap;

use crate::common::{FrameId, PageId, StoreId};

/// Index from `(StoreId, PageId)` to the frame holding that page.
///
/// All operations are amortized O(1). A miss is `None`, not an error.
/// Inserting a key that is already present is a caller bug; the pool never
/// does it, and debug builds assert against it.
#[derive(Debug, Default)]
pub struct PageTable {
    map: HashMap<(StoreId, PageId), FrameId>,
}

impl PageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for a pool of `pool_size` frames.
    pub fn with_capacity(pool_size: usize) -> Self {
        Self {
            map: HashMap::with_capacity(pool_size),
        }
    }

    /// Record that `frame_id` holds `page_id` of `store`.
    pub fn insert(&mut self, store: StoreId, page_id: PageId, frame_id: FrameId) {
        let previous = self.map.insert((store, page_id), frame_id);
        debug_assert!(
            previous.is_none(),
            "duplicate page table entry for {} of {}",
            page_id,
            store
        );
    }

    /// Drop the mapping, returning the frame it pointed to.
    pub fn remove(&mut self, store: StoreId, page_id: PageId) -> Option<FrameId> {
        self.map.remove(&(store, page_id))
    }

    pub fn lookup(&self, store: StoreId, page_id: PageId) -> Option<FrameId> {
        self.map.get(&(store, page_id)).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = PageTable::new();
        let store = StoreId::new(0);

        table.insert(store, PageId::new(1), FrameId::new(3));
        assert_eq!(table.lookup(store, PageId::new(1)), Some(FrameId::new(3)));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove(store, PageId::new(1)), Some(FrameId::new(3)));
        assert_eq!(table.lookup(store, PageId::new(1)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_miss_is_none() {
        let table = PageTable::with_capacity(4);
        assert_eq!(table.lookup(StoreId::new(0), PageId::new(0)), None);
    }

    #[test]
    fn test_same_page_id_in_different_stores() {
        let mut table = PageTable::new();
        table.insert(StoreId::new(0), PageId::new(5), FrameId::new(0));
        table.insert(StoreId::new(1), PageId::new(5), FrameId::new(1));

        assert_eq!(
            table.lookup(StoreId::new(0), PageId::new(5)),
            Some(FrameId::new(0))
        );
        assert_eq!(
            table.lookup(StoreId::new(1), PageId::new(5)),
            Some(FrameId::new(1))
        );
        assert_eq!(table.remove(StoreId::new(2), PageId::new(5)), None);
    }

    #[test]
    #[should_panic(expected = "duplicate page table entry")]
    #[cfg(debug_assertions)]
    fn test_duplicate_insert_asserts() {
        let mut table = PageTable::new();
        table.insert(StoreId::new(0), PageId::new(1), FrameId::new(0));
        table.insert(StoreId::new(0), PageId::new(1), FrameId::new(1));
    }
}
