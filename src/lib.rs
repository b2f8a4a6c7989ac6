//! clockpool - a fixed-capacity page cache with CLOCK eviction.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                           clockpool                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Callers (SharedBufferPool optional)        │   │
//! │  │   fetch → page/page_mut → release(dirty)                │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Buffer Pool (buffer/)                    │   │
//! │  │   BufferPoolManager + PageTable + FrameTable             │   │
//! │  │   ClockReplacer (second chance, write-back on evict)     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │                 Storage Layer (storage/)                 │   │
//! │  │   PageStore: FileStore | MemoryStore | your own          │   │
//! │  │   Page + PageHeader (type, checksum, id)                 │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, FrameId, StoreId, Error, config)
//! - [`buffer`] - Buffer pool management and the CLOCK replacer
//! - [`storage`] - Page stores and page formats
//!
//! # Quick Start
//! ```no_run
//! use clockpool::{BufferPoolManager, FileStore};
//!
//! let mut bpm = BufferPoolManager::new(64);
//! let store = bpm.attach_store(FileStore::open_or_create("my_pages.db").unwrap());
//!
//! // Allocate a page, write to it, and hand it back dirty
//! let (page_id, handle) = bpm.allocate_page(store).unwrap();
//! bpm.page_mut(&handle).unwrap().payload_mut()[..5].copy_from_slice(b"hello");
//! bpm.release_page(store, page_id, true).unwrap();
//!
//! // Write every page of the store back and drop it from the pool
//! bpm.flush_store(store).unwrap();
//! ```

pub mod buffer;
pub mod common;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{BufferPoolConfig, Error, FrameId, PageId, Result, StoreId};

pub use buffer::{
    BufferPoolManager, BufferPoolStats, FrameDescriptor, PageHandle, PoolSnapshot,
    SharedBufferPool,
};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{FileStore, MemoryStore, PageStore};
