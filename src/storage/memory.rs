//! In-memory page store.

use std::collections::HashMap;

use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Per-operation counters of a [`MemoryStore`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StoreCounters {
    pub reads: u64,
    pub writes: u64,
    pub allocations: u64,
    pub deletions: u64,
}

/// A page store that keeps every page in a hash map.
///
/// Useful for tests and for pools whose backing data is disposable. The
/// counters record every call that succeeded, so callers can observe
/// exactly what the buffer pool wrote back or deleted.
#[derive(Default)]
pub struct MemoryStore {
    pages: HashMap<PageId, Box<Page>>,
    next_page_id: u32,
    counters: StoreCounters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `page_id` is allocated and not deleted.
    pub fn contains(&self, page_id: PageId) -> bool {
        self.pages.contains_key(&page_id)
    }

    /// Persisted copy of `page_id`, if any.
    pub fn page(&self, page_id: PageId) -> Option<&Page> {
        self.pages.get(&page_id).map(|page| &**page)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn counters(&self) -> StoreCounters {
        self.counters
    }
}

impl PageStore for MemoryStore {
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        let stored = self
            .pages
            .get(&page_id)
            .ok_or(Error::PageNotFound(page_id))?;
        page.copy_from(stored);
        self.counters.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_id = page.page_id();
        let stored = self
            .pages
            .get_mut(&page_id)
            .ok_or(Error::PageNotFound(page_id))?;
        stored.copy_from(page);
        self.counters.writes += 1;
        Ok(())
    }

    fn allocate_page(&mut self, page: &mut Page) -> Result<PageId> {
        let page_id = PageId::new(self.next_page_id);
        self.next_page_id += 1;

        let fresh = Box::new(Page::with_id(page_id));
        page.copy_from(&fresh);
        self.pages.insert(page_id, fresh);
        self.counters.allocations += 1;
        Ok(page_id)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        self.pages
            .remove(&page_id)
            .ok_or(Error::PageNotFound(page_id))?;
        self.counters.deletions += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_write_read() {
        let mut store = MemoryStore::new();
        let mut page = Page::new();

        let pid = store.allocate_page(&mut page).unwrap();
        assert_eq!(pid, PageId::new(0));
        assert_eq!(page.page_id(), pid);

        page.payload_mut()[5] = 0x5A;
        store.write_page(&page).unwrap();

        let mut out = Page::new();
        store.read_page(pid, &mut out).unwrap();
        assert_eq!(out.payload()[5], 0x5A);

        let counters = store.counters();
        assert_eq!(counters.allocations, 1);
        assert_eq!(counters.writes, 1);
        assert_eq!(counters.reads, 1);
    }

    #[test]
    fn test_read_missing_page() {
        let mut store = MemoryStore::new();
        let mut page = Page::new();
        assert!(matches!(
            store.read_page(PageId::new(4), &mut page),
            Err(Error::PageNotFound(_))
        ));
    }

    #[test]
    fn test_delete_is_not_idempotent() {
        let mut store = MemoryStore::new();
        let mut page = Page::new();
        let pid = store.allocate_page(&mut page).unwrap();

        store.delete_page(pid).unwrap();
        assert!(!store.contains(pid));
        assert!(matches!(store.delete_page(pid), Err(Error::PageNotFound(_))));
        assert_eq!(store.counters().deletions, 1);
    }

    #[test]
    fn test_write_to_unallocated_page_fails() {
        let mut store = MemoryStore::new();
        let page = Page::with_id(PageId::new(9));
        assert!(store.write_page(&page).is_err());
    }
}
