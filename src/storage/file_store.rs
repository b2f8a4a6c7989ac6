//! File Store - a page store backed by a single file.
//!
//! The [`FileStore`] handles all direct file operations:
//! - Reading and writing pages, with CRC32 verification on read
//! - Allocating new pages, reusing deleted ones first
//! - Deleting pages by marking them free

use std::collections::BTreeSet;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::debug;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};
use crate::storage::PageStore;

/// Pages stored back to back in one file.
///
/// # File Layout
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Deleted pages stay in place with a [`PageType::Free`] header and are
/// handed out again by `allocate_page`, lowest id first. Reopening a file
/// rebuilds the free set by scanning page headers.
///
/// # Durability
/// Every write is followed by `fsync()`.
pub struct FileStore {
    file: File,
    /// Number of page slots in the file, free ones included.
    page_count: u32,
    /// Deleted slots available for reuse.
    free: BTreeSet<PageId>,
}

impl FileStore {
    /// Create a new store file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            free: BTreeSet::new(),
        })
    }

    /// Open an existing store file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        let page_count = (file.metadata()?.len() / PAGE_SIZE as u64) as u32;

        let mut store = Self {
            file,
            page_count,
            free: BTreeSet::new(),
        };
        store.scan_free_pages()?;
        debug!(
            "opened file store: {} pages, {} free",
            store.page_count,
            store.free.len()
        );
        Ok(store)
    }

    /// Open an existing store file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Number of page slots, including free ones.
    #[inline]
    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    /// Number of live (allocated, not deleted) pages.
    #[inline]
    pub fn live_page_count(&self) -> u32 {
        self.page_count - self.free.len() as u32
    }

    /// Get the total size of the store file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    fn scan_free_pages(&mut self) -> Result<()> {
        let mut header = [0u8; PageHeader::SIZE];
        for id in 0..self.page_count {
            self.file.seek(SeekFrom::Start(Self::offset(PageId(id))))?;
            self.file.read_exact(&mut header)?;
            if PageHeader::from_bytes(&header).page_type == PageType::Free {
                self.free.insert(PageId(id));
            }
        }
        Ok(())
    }

    #[inline]
    fn offset(page_id: PageId) -> u64 {
        (page_id.0 as u64) * (PAGE_SIZE as u64)
    }

    fn is_live(&self, page_id: PageId) -> bool {
        page_id.0 < self.page_count && !self.free.contains(&page_id)
    }

    /// Stamp the checksum on a copy of `page` and write it to its slot.
    fn write_slot(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        let mut out = Box::new(Page::new());
        out.copy_from(page);
        out.update_checksum();

        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        self.file.write_all(out.as_slice())?;
        self.file.sync_all()?;
        Ok(())
    }
}

impl PageStore for FileStore {
    /// # Errors
    /// - `Error::PageNotFound` for ids past the end or deleted pages
    /// - `Error::ChecksumMismatch` if the stored bytes are corrupt
    fn read_page(&mut self, page_id: PageId, page: &mut Page) -> Result<()> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }

        self.file.seek(SeekFrom::Start(Self::offset(page_id)))?;
        self.file.read_exact(page.as_mut_slice())?;

        if !page.verify_checksum() {
            return Err(Error::ChecksumMismatch(page_id));
        }
        Ok(())
    }

    fn write_page(&mut self, page: &Page) -> Result<()> {
        let page_id = page.page_id();
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }
        self.write_slot(page_id, page)
    }

    fn allocate_page(&mut self, page: &mut Page) -> Result<PageId> {
        let page_id = match self.free.first().copied() {
            Some(reused) => reused,
            None => PageId::new(self.page_count),
        };

        page.reset();
        page.set_header(&PageHeader::new(page_id));
        self.write_slot(page_id, page)?;

        if !self.free.remove(&page_id) {
            self.page_count += 1;
        }
        Ok(page_id)
    }

    fn delete_page(&mut self, page_id: PageId) -> Result<()> {
        if !self.is_live(page_id) {
            return Err(Error::PageNotFound(page_id));
        }

        let mut tombstone = Box::new(Page::new());
        tombstone.set_header(&PageHeader {
            page_type: PageType::Free,
            checksum: 0,
            page_id,
        });
        self.write_slot(page_id, &tombstone)?;
        self.free.insert(page_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_new_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let store = FileStore::create(&path).unwrap();
        assert_eq!(store.page_count(), 0);
        assert_eq!(store.file_size(), 0);
    }

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        FileStore::create(&path).unwrap();
        assert!(FileStore::create(&path).is_err());
    }

    #[test]
    fn test_allocate_and_read_page() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::create(dir.path().join("test.db")).unwrap();

        let mut page = Page::new();
        let page_id = store.allocate_page(&mut page).unwrap();
        assert_eq!(page_id, PageId::new(0));
        assert_eq!(page.page_id(), page_id);

        let mut read = Page::new();
        store.read_page(page_id, &mut read).unwrap();
        assert_eq!(read.page_id(), page_id);
        assert!(read.payload().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_write_targets_header_page_id() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::create(dir.path().join("test.db")).unwrap();

        let mut p0 = Page::new();
        let mut p1 = Page::new();
        store.allocate_page(&mut p0).unwrap();
        let id1 = store.allocate_page(&mut p1).unwrap();

        p1.payload_mut()[0] = 0xCD;
        store.write_page(&p1).unwrap();

        let mut read = Page::new();
        store.read_page(id1, &mut read).unwrap();
        assert_eq!(read.payload()[0], 0xCD);
        store.read_page(PageId::new(0), &mut read).unwrap();
        assert_eq!(read.payload()[0], 0);
    }

    #[test]
    fn test_read_invalid_page() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::create(dir.path().join("test.db")).unwrap();
        let mut page = Page::new();
        store.allocate_page(&mut page).unwrap();

        let result = store.read_page(PageId::new(1), &mut page);
        assert!(matches!(result, Err(Error::PageNotFound(_))));
    }

    #[test]
    fn test_corruption_detected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let page_id;
        {
            let mut store = FileStore::create(&path).unwrap();
            let mut page = Page::new();
            page_id = store.allocate_page(&mut page).unwrap();
        }

        // Flip a payload byte behind the store's back
        {
            let mut file = OpenOptions::new().write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(100)).unwrap();
            file.write_all(&[0xFF]).unwrap();
        }

        let mut store = FileStore::open(&path).unwrap();
        let mut page = Page::new();
        assert!(matches!(
            store.read_page(page_id, &mut page),
            Err(Error::ChecksumMismatch(_))
        ));
    }

    #[test]
    fn test_delete_and_reuse() {
        let dir = tempdir().unwrap();
        let mut store = FileStore::create(dir.path().join("test.db")).unwrap();
        let mut page = Page::new();

        for _ in 0..3 {
            store.allocate_page(&mut page).unwrap();
        }
        store.delete_page(PageId::new(1)).unwrap();
        assert_eq!(store.live_page_count(), 2);

        let mut read = Page::new();
        assert!(store.read_page(PageId::new(1), &mut read).is_err());
        assert!(matches!(
            store.delete_page(PageId::new(1)),
            Err(Error::PageNotFound(_))
        ));

        // Freed slot is handed out before the file grows
        assert_eq!(store.allocate_page(&mut page).unwrap(), PageId::new(1));
        assert_eq!(store.page_count(), 3);
        assert_eq!(store.allocate_page(&mut page).unwrap(), PageId::new(3));
    }

    #[test]
    fn test_persistence_and_free_scan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut store = FileStore::create(&path).unwrap();
            let mut page = Page::new();
            let id = store.allocate_page(&mut page).unwrap();
            page.payload_mut()[0] = 0x42;
            store.write_page(&page).unwrap();
            store.allocate_page(&mut page).unwrap();
            assert_eq!(id, PageId::new(0));
            store.delete_page(PageId::new(1)).unwrap();
        }

        {
            let mut store = FileStore::open_or_create(&path).unwrap();
            assert_eq!(store.page_count(), 2);
            assert_eq!(store.live_page_count(), 1);

            let mut page = Page::new();
            store.read_page(PageId::new(0), &mut page).unwrap();
            assert_eq!(page.payload()[0], 0x42);
            assert_eq!(store.allocate_page(&mut page).unwrap(), PageId::new(1));
        }
    }
}
