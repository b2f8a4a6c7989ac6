//! Handles to pinned pages.

use std::fmt;

use crate::common::{FrameId, PageId, StoreId};

/// A caller's reference to a page resident in the buffer pool.
///
/// Handles are plain identifiers into the frame arena; page bytes are
/// reached through [`BufferPoolManager::page`](crate::BufferPoolManager::page)
/// and [`BufferPoolManager::page_mut`](crate::BufferPoolManager::page_mut),
/// which check that the frame still holds this page.
///
/// A handle stands for one pin. Hand it back with
/// [`BufferPoolManager::release_page`](crate::BufferPoolManager::release_page)
/// and do not use it afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageHandle {
    store: StoreId,
    page_id: PageId,
    frame_id: FrameId,
}

impl PageHandle {
    pub(crate) fn new(store: StoreId, page_id: PageId, frame_id: FrameId) -> Self {
        Self {
            store,
            page_id,
            frame_id,
        }
    }

    #[inline]
    pub fn store(&self) -> StoreId {
        self.store
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }
}

impl fmt::Display for PageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} in {}", self.page_id, self.store, self.frame_id)
    }
}
