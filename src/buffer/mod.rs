//! Buffer pool management.
//!
//! The buffer pool is the in-memory cache layer between callers and page
//! stores. It manages a fixed pool of frames, each holding one page.
//!
//! # Components
//! - [`BufferPoolManager`] - The main page cache
//! - [`FrameDescriptor`] - Bookkeeping for one frame
//! - [`PageHandle`] - A caller's pinned reference to a resident page
//! - [`PoolSnapshot`] - Diagnostic copy of every frame descriptor
//! - [`BufferPoolStats`] - Performance statistics
//! - [`SharedBufferPool`] - Mutex-guarded pool for multi-threaded callers
//! - [`replacer`] - CLOCK eviction

mod buffer_pool_manager;
mod frame;
mod handle;
mod page_table;
pub mod replacer;
mod shared;
mod snapshot;
mod stats;

pub use buffer_pool_manager::BufferPoolManager;
pub use frame::{FrameDescriptor, FrameTable};
pub use handle::PageHandle;
pub use page_table::PageTable;
pub use shared::SharedBufferPool;
pub use snapshot::PoolSnapshot;
pub use stats::BufferPoolStats;
