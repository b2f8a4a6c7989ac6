//! Frame store - the page arena plus one descriptor per slot.
//!
//! A [`FrameDescriptor`] records what a frame holds:
//! - Which page of which store is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Recent flag for the clock replacer

use std::fmt;

use log::debug;

use crate::common::{FrameId, PageId, Result, StoreId};
use crate::storage::page::{Page, PageType};
use crate::storage::PageStore;

/// Bookkeeping for one frame.
///
/// `valid` is true exactly when `owner` is `Some`; `dirty`, `pin_count`
/// and `recent` are meaningful only while valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDescriptor {
    frame_id: FrameId,
    owner: Option<StoreId>,
    page_id: PageId,
    pin_count: u32,
    dirty: bool,
    valid: bool,
    recent: bool,
}

impl FrameDescriptor {
    /// Create the descriptor of an empty frame.
    pub fn new(frame_id: FrameId) -> Self {
        Self {
            frame_id,
            owner: None,
            page_id: PageId::INVALID,
            pin_count: 0,
            dirty: false,
            valid: false,
            recent: false,
        }
    }

    /// Install a page: valid, clean, pinned once and recently used.
    pub fn set(&mut self, store: StoreId, page_id: PageId) {
        self.owner = Some(store);
        self.page_id = page_id;
        self.pin_count = 1;
        self.dirty = false;
        self.valid = true;
        self.recent = true;
    }

    /// Reset to the empty state. The frame index survives.
    pub fn clear(&mut self) {
        *self = Self::new(self.frame_id);
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    #[inline]
    pub fn owner(&self) -> Option<StoreId> {
        self.owner
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count
    }

    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count > 0
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[inline]
    pub fn is_recent(&self) -> bool {
        self.recent
    }

    /// Whether this frame holds `page_id` of `store`.
    #[inline]
    pub fn holds(&self, store: StoreId, page_id: PageId) -> bool {
        self.valid && self.owner == Some(store) && self.page_id == page_id
    }

    /// Increment the pin count and mark the frame recently used.
    /// Returns the new pin count.
    #[inline]
    pub fn pin(&mut self) -> u32 {
        self.pin_count += 1;
        self.recent = true;
        self.pin_count
    }

    /// Decrement the pin count. Returns `None`, leaving the count at zero,
    /// if the frame was not pinned.
    #[inline]
    pub fn unpin(&mut self) -> Option<u32> {
        self.pin_count = self.pin_count.checked_sub(1)?;
        Some(self.pin_count)
    }

    /// Mark the frame as modified. Only a write-back clears it.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }

    #[inline]
    pub fn mark_recent(&mut self) {
        self.recent = true;
    }

    /// Clear the reference bit. Returns whether it was set.
    #[inline]
    pub fn take_recent(&mut self) -> bool {
        std::mem::replace(&mut self.recent, false)
    }

    #[cfg(test)]
    pub(crate) fn force_invalid(&mut self) {
        self.valid = false;
    }
}

impl fmt::Display for FrameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.owner {
            Some(store) => write!(
                f,
                "{}: {} {} pin={} dirty={} valid={} recent={}",
                self.frame_id,
                store,
                self.page_id,
                self.pin_count,
                self.dirty,
                self.valid,
                self.recent
            ),
            None => write!(f, "{}: empty valid={}", self.frame_id, self.valid),
        }
    }
}

/// Fixed pool of frames allocated at startup.
///
/// Page buffers live in one boxed slice; descriptors sit beside them with
/// the same indexing. Nothing here knows about stores or the page table.
pub struct FrameTable {
    pages: Box<[Page]>,
    descriptors: Vec<FrameDescriptor>,
}

impl FrameTable {
    /// Allocate `pool_size` empty frames.
    pub fn new(pool_size: usize) -> Self {
        let pages: Box<[Page]> = (0..pool_size).map(|_| Page::new()).collect();
        let descriptors = (0..pool_size)
            .map(|i| FrameDescriptor::new(FrameId::new(i)))
            .collect();
        Self { pages, descriptors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    #[inline]
    pub fn descriptor(&self, frame_id: FrameId) -> &FrameDescriptor {
        &self.descriptors[frame_id.index()]
    }

    #[inline]
    pub fn descriptor_mut(&mut self, frame_id: FrameId) -> &mut FrameDescriptor {
        &mut self.descriptors[frame_id.index()]
    }

    #[inline]
    pub fn descriptors(&self) -> &[FrameDescriptor] {
        &self.descriptors
    }

    #[inline]
    pub fn page(&self, frame_id: FrameId) -> &Page {
        &self.pages[frame_id.index()]
    }

    #[inline]
    pub fn page_mut(&mut self, frame_id: FrameId) -> &mut Page {
        &mut self.pages[frame_id.index()]
    }

    /// Descriptor and page of one frame, borrowed together.
    #[inline]
    pub fn entry_mut(&mut self, frame_id: FrameId) -> (&mut FrameDescriptor, &mut Page) {
        (
            &mut self.descriptors[frame_id.index()],
            &mut self.pages[frame_id.index()],
        )
    }

    /// Number of frames currently holding a page.
    pub fn valid_count(&self) -> usize {
        self.descriptors.iter().filter(|d| d.is_valid()).count()
    }

    /// Write a valid frame's page to `store` and clear its dirty flag.
    ///
    /// The header's page id and type are re-stamped from the descriptor
    /// first. Only a live data page of the descriptor's id is ever written.
    pub fn write_back<S: PageStore>(&mut self, frame_id: FrameId, store: &mut S) -> Result<()> {
        let (desc, page) = self.entry_mut(frame_id);
        let mut header = page.header();
        if header.page_id != desc.page_id || header.page_type != PageType::Data {
            header.page_id = desc.page_id;
            header.page_type = PageType::Data;
            page.set_header(&header);
        }

        store.write_page(page)?;
        desc.clear_dirty();
        debug!("wrote back {} from {}", desc.page_id, frame_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(frame: usize) -> FrameDescriptor {
        let mut desc = FrameDescriptor::new(FrameId::new(frame));
        desc.set(StoreId::new(0), PageId::new(7));
        desc
    }

    #[test]
    fn test_descriptor_new_is_empty() {
        let desc = FrameDescriptor::new(FrameId::new(3));
        assert_eq!(desc.frame_id(), FrameId::new(3));
        assert!(!desc.is_valid());
        assert!(!desc.is_pinned());
        assert!(!desc.is_dirty());
        assert!(!desc.is_recent());
        assert_eq!(desc.owner(), None);
    }

    #[test]
    fn test_set_pins_once() {
        let desc = loaded(0);
        assert!(desc.is_valid());
        assert!(desc.is_recent());
        assert_eq!(desc.pin_count(), 1);
        assert!(desc.holds(StoreId::new(0), PageId::new(7)));
        assert!(!desc.holds(StoreId::new(1), PageId::new(7)));
    }

    #[test]
    fn test_pin_unpin() {
        let mut desc = loaded(0);

        assert_eq!(desc.pin(), 2);
        assert_eq!(desc.unpin(), Some(1));
        assert_eq!(desc.unpin(), Some(0));
        assert_eq!(desc.unpin(), None);
        assert_eq!(desc.pin_count(), 0);
    }

    #[test]
    fn test_take_recent() {
        let mut desc = loaded(0);
        assert!(desc.take_recent());
        assert!(!desc.take_recent());

        desc.pin();
        assert!(desc.is_recent());
    }

    #[test]
    fn test_clear_keeps_frame_id() {
        let mut desc = loaded(4);
        desc.mark_dirty();
        desc.clear();

        assert_eq!(desc, FrameDescriptor::new(FrameId::new(4)));
    }

    #[test]
    fn test_frame_table_layout() {
        let mut table = FrameTable::new(4);
        assert_eq!(table.len(), 4);
        assert_eq!(table.valid_count(), 0);

        table.page_mut(FrameId::new(2)).payload_mut()[0] = 0xAB;
        table
            .descriptor_mut(FrameId::new(2))
            .set(StoreId::new(0), PageId::new(1));

        assert_eq!(table.page(FrameId::new(2)).payload()[0], 0xAB);
        assert_eq!(table.page(FrameId::new(1)).payload()[0], 0);
        assert_eq!(table.valid_count(), 1);
        for (i, desc) in table.descriptors().iter().enumerate() {
            assert_eq!(desc.frame_id(), FrameId::new(i));
        }
    }

    #[test]
    fn test_write_back_restamps_header() {
        use crate::storage::MemoryStore;

        let mut store = MemoryStore::new();
        let mut table = FrameTable::new(1);
        let frame = FrameId::new(0);

        let pid = store.allocate_page(table.page_mut(frame)).unwrap();
        table.descriptor_mut(frame).set(StoreId::new(0), pid);
        table.descriptor_mut(frame).mark_dirty();

        // Clobber the whole page, header included
        table.page_mut(frame).as_mut_slice().fill(0x11);
        table.write_back(frame, &mut store).unwrap();

        assert!(!table.descriptor(frame).is_dirty());
        let persisted = store.page(pid).unwrap();
        assert_eq!(persisted.page_id(), pid);
        assert_eq!(persisted.page_type(), PageType::Data);
        assert_eq!(persisted.payload()[0], 0x11);
    }

    #[test]
    fn test_descriptor_display() {
        let desc = loaded(1);
        assert_eq!(
            format!("{}", desc),
            "Frame(1): Store(0) Page(7) pin=1 dirty=false valid=true recent=true"
        );
        assert_eq!(
            format!("{}", FrameDescriptor::new(FrameId::new(0))),
            "Frame(0): empty valid=false"
        );
    }
}
