//! Storage layer - the page stores a buffer pool caches.
//!
//! This module handles persistent storage:
//! - [`PageStore`] - The contract a backing store fulfils
//! - [`StoreSet`] - Stores attached to one pool, by [`StoreId`](crate::StoreId)
//! - [`FileStore`] - Single-file store with checksums and page reuse
//! - [`MemoryStore`] - Hash-map store with operation counters
//! - [`page`] - Page types and layouts

mod file_store;
mod memory;
pub mod page;
mod store;

pub use file_store::FileStore;
pub use memory::{MemoryStore, StoreCounters};
pub use store::{PageStore, StoreSet};
