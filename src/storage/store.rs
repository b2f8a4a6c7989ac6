//! The persistent page store contract and the per-pool store registry.

use crate::common::{Error, PageId, Result, StoreId};
use crate::storage::page::Page;

/// A persistent collection of pages that a buffer pool caches.
///
/// Calls are synchronous; the buffer pool serializes them. Implementations
/// must be `Send` so a pool can be moved behind a
/// [`SharedBufferPool`](crate::buffer::SharedBufferPool).
pub trait PageStore: Send {
    /// Read page `page_id` into `page`.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page was never allocated or was deleted.
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()>;

    /// Persist `page`. The target is the id recorded in its header.
    fn write_page(&mut self, page: &Page) -> Result<()>;

    /// Allocate a fresh page, initialize `page` with its content and
    /// return the new id.
    fn allocate_page(&mut self, page: &mut Page) -> Result<PageId>;

    /// Delete page `page_id`.
    ///
    /// # Errors
    /// `Error::PageNotFound` if the page does not exist. Callers tolerate
    /// this outcome.
    fn delete_page(&mut self, page_id: PageId) -> Result<()>;
}

impl<T: PageStore + ?Sized> PageStore for Box<T> {
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        (**self).read_page(page_id, page)
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        (**self).write_page(page)
    }

    fn allocate_page(&mut self, page: &mut Page) -> Result<PageId> {
        (**self).allocate_page(page)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        (**self).delete_page(page_id)
    }
}

/// Stores attached to one buffer pool, addressed by [`StoreId`].
///
/// Ids are slot indices and are never reused after a detach.
pub struct StoreSet<S> {
    slots: Vec<Option<S>>,
}

impl<S: PageStore> StoreSet<S> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Attach a store and return its id.
    pub fn insert(&mut self, store: S) -> StoreId {
        let id = StoreId::new(self.slots.len() as u32);
        self.slots.push(Some(store));
        id
    }

    /// Detach a store, returning it.
    pub fn remove(&mut self, id: StoreId) -> Option<S> {
        self.slots.get_mut(id.0 as usize).and_then(Option::take)
    }

    pub fn get(&self, id: StoreId) -> Option<&S> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutable access, failing with `UnknownStore` for detached ids.
    pub fn get_mut(&mut self, id: StoreId) -> Result<&mut S> {
        self.slots
            .get_mut(id.0 as usize)
            .and_then(Option::as_mut)
            .ok_or(Error::UnknownStore(id))
    }

    pub fn contains(&self, id: StoreId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<S: PageStore> Default for StoreSet<S> {
    fn default() -> Self {
        Self::new()
    }
}
