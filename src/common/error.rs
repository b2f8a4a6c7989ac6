//! Error types for clockpool.

use thiserror::Error;

use crate::common::{FrameId, PageId, StoreId};

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in clockpool.
///
/// Index misses are not errors: lookups return `Option` and the miss path
/// is an ordinary branch of `fetch_page`.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from a page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded or deserialized.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration values are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every frame is pinned; a full clock sweep found no victim.
    ///
    /// Not retriable until the caller releases pins.
    #[error("buffer pool exhausted: all {pool_size} frames are pinned")]
    BufferExhausted { pool_size: usize },

    /// Released a page whose pin count was already zero.
    ///
    /// This indicates a bug - releases should match fetches.
    #[error("{page_id} of {store} in {frame_id} is not pinned")]
    PageNotPinned {
        store: StoreId,
        page_id: PageId,
        frame_id: FrameId,
    },

    /// Attempted to flush or dispose a page that is still pinned.
    #[error("{page_id} of {store} in {frame_id} is pinned")]
    PagePinned {
        store: StoreId,
        page_id: PageId,
        frame_id: FrameId,
    },

    /// A frame claims ownership by a store but holds no page.
    ///
    /// Internal consistency violation; unreachable in a correct pool.
    #[error("bad {frame_id}: dirty={dirty} valid={valid} recent={recent}")]
    BadFrame {
        frame_id: FrameId,
        dirty: bool,
        valid: bool,
        recent: bool,
    },

    /// Requested page does not exist in its store.
    #[error("{0} not found")]
    PageNotFound(PageId),

    /// Stored checksum does not match the page content.
    #[error("checksum mismatch on {0}")]
    ChecksumMismatch(PageId),

    /// The store identifier is not attached to this pool.
    #[error("{0} is not attached")]
    UnknownStore(StoreId),

    /// The handle's frame no longer holds the page it was issued for.
    #[error("stale handle for {page_id} of {store}")]
    StaleHandle { store: StoreId, page_id: PageId },
}
