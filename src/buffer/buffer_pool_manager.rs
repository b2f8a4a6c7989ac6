//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between page stores and memory
//! - Pin-based reference counting
//! - CLOCK eviction with write-back of dirty victims
//! - Per-store flush and page disposal

use log::{debug, error, info, trace};

use crate::buffer::frame::FrameTable;
use crate::buffer::page_table::PageTable;
use crate::buffer::replacer::{Allocation, ClockReplacer};
use crate::buffer::{BufferPoolStats, PageHandle, PoolSnapshot};
use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result, StoreId};
use crate::storage::page::Page;
use crate::storage::{PageStore, StoreSet};

/// Caches pages of one or more stores in a fixed pool of frames.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                      BufferPoolManager                       │
/// │  ┌────────────────┐   ┌────────────────────────────────────┐ │
/// │  │  page_table    │   │   frames: FrameTable               │ │
/// │  │(Store,Page)→Fid│──▶│  [Frame0] [Frame1] [Frame2] ...    │ │
/// │  └────────────────┘   └────────────────────────────────────┘ │
/// │  ┌────────────────┐   ┌────────────────┐                     │
/// │  │   replacer     │   │    stores      │                     │
/// │  │ ClockReplacer  │   │ StoreSet<S>    │                     │
/// │  └────────────────┘   └────────────────┘                     │
/// └──────────────────────────────────────────────────────────────┘
/// ```
///
/// # Invariants
/// After every public call:
/// - a frame is valid iff the page table maps its `(store, page)` to it;
/// - no `(store, page)` is resident in more than one frame;
/// - a pinned frame is never evicted, flushed out, or disposed;
/// - only valid frames are dirty.
///
/// # Thread Safety
/// None internally. All operations take `&mut self`; wrap the pool in a
/// [`SharedBufferPool`](crate::buffer::SharedBufferPool) to share it.
///
/// # Usage
/// ```
/// use clockpool::{BufferPoolManager, MemoryStore};
///
/// let mut bpm = BufferPoolManager::new(8);
/// let store = bpm.attach_store(MemoryStore::new());
///
/// let (page_id, handle) = bpm.allocate_page(store).unwrap();
/// bpm.page_mut(&handle).unwrap().payload_mut()[0] = 0xAB;
/// bpm.release_page(store, page_id, true).unwrap();
///
/// let handle = bpm.fetch_page(store, page_id).unwrap();
/// assert_eq!(bpm.page(&handle).unwrap().payload()[0], 0xAB);
/// bpm.release_page(store, page_id, false).unwrap();
/// ```
pub struct BufferPoolManager<S: PageStore = Box<dyn PageStore>> {
    /// Page arena and descriptors, one per frame.
    frames: FrameTable,

    /// Maps resident pages to frames.
    page_table: PageTable,

    /// Eviction policy and frame allocation.
    replacer: ClockReplacer,

    /// Backing stores, addressed by `StoreId`.
    stores: StoreSet<S>,

    stats: BufferPoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl<S: PageStore> BufferPoolManager<S> {
    /// Create a buffer pool of `pool_size` frames with no stores attached.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        Self {
            frames: FrameTable::new(pool_size),
            page_table: PageTable::with_capacity(pool_size),
            replacer: ClockReplacer::new(pool_size),
            stores: StoreSet::new(),
            stats: BufferPoolStats::default(),
            pool_size,
        }
    }

    /// Create a buffer pool from validated configuration.
    pub fn from_config(config: &BufferPoolConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config.pool_size))
    }

    // ========================================================================
    // Stores
    // ========================================================================

    /// Attach a page store; its pages become addressable by the returned id.
    pub fn attach_store(&mut self, store: S) -> StoreId {
        let id = self.stores.insert(store);
        info!("attached {}", id);
        id
    }

    /// Flush every page of `store` out of the pool and hand the store back.
    ///
    /// # Errors
    /// Fails like [`flush_store`](Self::flush_store); the store then stays
    /// attached.
    pub fn detach_store(&mut self, store: StoreId) -> Result<S> {
        self.flush_store(store)?;
        let detached = self.stores.remove(store).ok_or(Error::UnknownStore(store))?;
        info!("detached {}", store);
        Ok(detached)
    }

    /// Borrow an attached store.
    pub fn store(&self, store: StoreId) -> Option<&S> {
        self.stores.get(store)
    }

    fn ensure_store(&self, store: StoreId) -> Result<()> {
        if self.stores.contains(store) {
            Ok(())
        } else {
            Err(Error::UnknownStore(store))
        }
    }

    // ========================================================================
    // Public API: Fetch and release
    // ========================================================================

    /// Pin `page_id` of `store`, loading it if it is not resident.
    ///
    /// A hit bumps the pin count and sets the frame's reference bit. A miss
    /// asks the clock for a frame (possibly writing back a dirty victim),
    /// reads the page into it, and installs it pinned once.
    ///
    /// # Errors
    /// - `Error::BufferExhausted` if every frame is pinned
    /// - `Error::UnknownStore` if `store` is not attached
    /// - Store errors from the victim write-back or the read. If the read
    ///   fails after a victim was evicted, that frame is left empty.
    pub fn fetch_page(&mut self, store: StoreId, page_id: PageId) -> Result<PageHandle> {
        if let Some(frame_id) = self.page_table.lookup(store, page_id) {
            let pins = self.frames.descriptor_mut(frame_id).pin();
            self.stats.cache_hits += 1;
            trace!("hit {} of {} in {} (pins={})", page_id, store, frame_id, pins);
            return Ok(PageHandle::new(store, page_id, frame_id));
        }

        self.ensure_store(store)?;
        self.stats.cache_misses += 1;

        let frame_id = self.allocate_frame()?;
        self.stores
            .get_mut(store)?
            .read_page(page_id, self.frames.page_mut(frame_id))?;
        self.stats.pages_read += 1;

        self.install(store, page_id, frame_id);
        debug!("loaded {} of {} into {}", page_id, store, frame_id);
        Ok(PageHandle::new(store, page_id, frame_id))
    }

    /// Drop one pin on `page_id` of `store`, marking it dirty if asked.
    ///
    /// Releasing a page that is not resident does nothing. The dirty flag
    /// is sticky: `dirty = false` never clears an earlier `true`.
    ///
    /// # Errors
    /// `Error::PageNotPinned` if the pin count is already zero; the frame
    /// is left unchanged.
    pub fn release_page(&mut self, store: StoreId, page_id: PageId, dirty: bool) -> Result<()> {
        let Some(frame_id) = self.page_table.lookup(store, page_id) else {
            trace!("release of non-resident {} of {}", page_id, store);
            return Ok(());
        };

        let desc = self.frames.descriptor_mut(frame_id);
        if desc.unpin().is_none() {
            return Err(Error::PageNotPinned {
                store,
                page_id,
                frame_id,
            });
        }
        if dirty {
            desc.mark_dirty();
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Page content
    // ========================================================================

    /// Read access to the page behind `handle`.
    ///
    /// # Errors
    /// `Error::StaleHandle` if the frame no longer holds the handle's page.
    pub fn page(&self, handle: &PageHandle) -> Result<&Page> {
        self.check_handle(handle)?;
        Ok(self.frames.page(handle.frame_id()))
    }

    /// Write access to the page behind `handle`.
    ///
    /// Writes are only persisted if the page is later released dirty.
    ///
    /// # Errors
    /// - `Error::StaleHandle` if the frame no longer holds the handle's page
    /// - `Error::PageNotPinned` if the page is resident but unpinned
    pub fn page_mut(&mut self, handle: &PageHandle) -> Result<&mut Page> {
        self.check_handle(handle)?;
        if !self.frames.descriptor(handle.frame_id()).is_pinned() {
            return Err(Error::PageNotPinned {
                store: handle.store(),
                page_id: handle.page_id(),
                frame_id: handle.frame_id(),
            });
        }
        Ok(self.frames.page_mut(handle.frame_id()))
    }

    fn check_handle(&self, handle: &PageHandle) -> Result<()> {
        let holds = handle.frame_id().index() < self.pool_size
            && self
                .frames
                .descriptor(handle.frame_id())
                .holds(handle.store(), handle.page_id());
        if holds {
            Ok(())
        } else {
            Err(Error::StaleHandle {
                store: handle.store(),
                page_id: handle.page_id(),
            })
        }
    }

    // ========================================================================
    // Public API: Create and delete pages
    // ========================================================================

    /// Allocate a new page in `store` and install it in the pool, pinned.
    ///
    /// The frame is obtained before the store allocates, so a pool with
    /// every frame pinned does not leak store pages.
    ///
    /// # Errors
    /// - `Error::BufferExhausted` if every frame is pinned
    /// - `Error::UnknownStore` if `store` is not attached
    /// - Store errors from the victim write-back or the allocation
    pub fn allocate_page(&mut self, store: StoreId) -> Result<(PageId, PageHandle)> {
        self.ensure_store(store)?;

        let frame_id = self.allocate_frame()?;
        let page_id = self
            .stores
            .get_mut(store)?
            .allocate_page(self.frames.page_mut(frame_id))?;

        self.install(store, page_id, frame_id);
        debug!("allocated {} of {} in {}", page_id, store, frame_id);
        Ok((page_id, PageHandle::new(store, page_id, frame_id)))
    }

    /// Drop `page_id` from the pool, if resident, and delete it from `store`.
    ///
    /// The resident copy is discarded without write-back. A store reporting
    /// the page as already gone is not an error.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned. The store
    ///   is not asked to delete anything in that case.
    /// - `Error::UnknownStore` if `store` is not attached
    /// - Other store errors from the deletion
    pub fn dispose_page(&mut self, store: StoreId, page_id: PageId) -> Result<()> {
        self.ensure_store(store)?;

        if let Some(frame_id) = self.page_table.lookup(store, page_id) {
            let desc = self.frames.descriptor_mut(frame_id);
            if desc.is_pinned() {
                return Err(Error::PagePinned {
                    store,
                    page_id,
                    frame_id,
                });
            }
            desc.clear();
            self.page_table.remove(store, page_id);
            debug!("disposed resident {} of {} from {}", page_id, store, frame_id);
        }

        match self.stores.get_mut(store)?.delete_page(page_id) {
            Err(Error::PageNotFound(_)) => {
                debug!("{} of {} already absent from store", page_id, store);
                Ok(())
            }
            other => other,
        }
    }

    // ========================================================================
    // Public API: Flush
    // ========================================================================

    /// Write back and evict every page of `store`.
    ///
    /// Frames are handled in frame order; the first failure stops the sweep.
    /// Frames already handled stay flushed and evicted.
    ///
    /// # Errors
    /// - `Error::PagePinned` on the first pinned page of `store`
    /// - `Error::BadFrame` if a frame names `store` but holds no page
    /// - `Error::UnknownStore` if `store` is not attached
    /// - Store errors from the write-back
    pub fn flush_store(&mut self, store: StoreId) -> Result<()> {
        self.ensure_store(store)?;

        let mut flushed = 0usize;
        for i in 0..self.pool_size {
            let frame_id = FrameId::new(i);
            let desc = *self.frames.descriptor(frame_id);
            if desc.owner() != Some(store) {
                continue;
            }
            if !desc.is_valid() {
                return Err(Error::BadFrame {
                    frame_id,
                    dirty: desc.is_dirty(),
                    valid: desc.is_valid(),
                    recent: desc.is_recent(),
                });
            }
            if desc.is_pinned() {
                return Err(Error::PagePinned {
                    store,
                    page_id: desc.page_id(),
                    frame_id,
                });
            }
            if desc.is_dirty() {
                self.frames.write_back(frame_id, self.stores.get_mut(store)?)?;
                self.stats.pages_written += 1;
            }
            self.page_table.remove(store, desc.page_id());
            self.frames.descriptor_mut(frame_id).clear();
            flushed += 1;
        }

        debug!("flushed {} pages of {}", flushed, store);
        Ok(())
    }

    /// Write back one resident page if dirty. The page stays resident.
    ///
    /// Non-resident pages are ignored.
    pub fn flush_page(&mut self, store: StoreId, page_id: PageId) -> Result<()> {
        let Some(frame_id) = self.page_table.lookup(store, page_id) else {
            return Ok(());
        };

        if self.frames.descriptor(frame_id).is_dirty() {
            self.frames.write_back(frame_id, self.stores.get_mut(store)?)?;
            self.stats.pages_written += 1;
        }
        Ok(())
    }

    /// Write back every dirty page, pinned or not. Pages stay resident.
    pub fn flush_all(&mut self) -> Result<()> {
        for i in 0..self.pool_size {
            let frame_id = FrameId::new(i);
            let desc = *self.frames.descriptor(frame_id);
            if !(desc.is_valid() && desc.is_dirty()) {
                continue;
            }
            let store = desc.owner().ok_or(Error::BadFrame {
                frame_id,
                dirty: desc.is_dirty(),
                valid: desc.is_valid(),
                recent: desc.is_recent(),
            })?;
            self.frames.write_back(frame_id, self.stores.get_mut(store)?)?;
            self.stats.pages_written += 1;
        }
        Ok(())
    }

    // ========================================================================
    // Public API: Inspection
    // ========================================================================

    /// Copy of all frame descriptors and the number of valid frames.
    pub fn inspect(&self) -> PoolSnapshot {
        PoolSnapshot {
            frames: self.frames.descriptors().to_vec(),
            valid_frames: self.frames.valid_count(),
            clock_hand: self.replacer.clock_hand(),
        }
    }

    /// Pin count of a resident page, or `None` if not resident.
    pub fn pin_count(&self, store: StoreId, page_id: PageId) -> Option<u32> {
        self.page_table
            .lookup(store, page_id)
            .map(|frame_id| self.frames.descriptor(frame_id).pin_count())
    }

    /// Frame holding a resident page.
    pub fn frame_of(&self, store: StoreId, page_id: PageId) -> Option<FrameId> {
        self.page_table.lookup(store, page_id)
    }

    pub fn is_resident(&self, store: StoreId, page_id: PageId) -> bool {
        self.frame_of(store, page_id).is_some()
    }

    /// Number of pages in the buffer pool.
    pub fn resident_count(&self) -> usize {
        self.page_table.len()
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Get buffer pool statistics.
    pub fn stats(&self) -> BufferPoolStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    // ========================================================================
    // Internal
    // ========================================================================

    /// Get an empty frame from the clock, recording any eviction.
    fn allocate_frame(&mut self) -> Result<FrameId> {
        let Allocation { frame_id, evicted } =
            self.replacer
                .allocate(&mut self.frames, &mut self.page_table, &mut self.stores)?;

        if let Some(eviction) = evicted {
            self.stats.evictions += 1;
            if eviction.written_back {
                self.stats.pages_written += 1;
            }
        }
        Ok(frame_id)
    }

    /// Mark a freshly filled frame valid and pinned once, and index it.
    fn install(&mut self, store: StoreId, page_id: PageId, frame_id: FrameId) {
        self.frames.descriptor_mut(frame_id).set(store, page_id);
        self.page_table.insert(store, page_id, frame_id);
    }
}

impl<S: PageStore> Drop for BufferPoolManager<S> {
    fn drop(&mut self) {
        if let Err(e) = self.flush_all() {
            error!("failed to write back dirty pages on shutdown: {}", e);
        }
    }
}
