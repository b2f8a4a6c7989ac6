//! CLOCK (second-chance) replacement policy.
//!
//! A single hand walks the frames in a circle. Every access sets a frame's
//! reference bit; the hand clears set bits as it passes and takes the first
//! unpinned frame whose bit is already clear. Recency is approximated, not
//! ordered.

use log::{debug, warn};

use crate::buffer::frame::FrameTable;
use crate::buffer::page_table::PageTable;
use crate::common::{Error, FrameId, PageId, Result, StoreId};
use crate::storage::{PageStore, StoreSet};

/// A page pushed out of the pool to make room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Eviction {
    pub store: StoreId,
    pub page_id: PageId,
    /// Whether the victim was dirty and had to be written back.
    pub written_back: bool,
}

/// Outcome of [`ClockReplacer::allocate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allocation {
    /// An empty frame, ready for new content.
    pub frame_id: FrameId,
    /// The page that previously occupied it, if any.
    pub evicted: Option<Eviction>,
}

/// The clock hand and the sweep that hands out frames.
///
/// The replacer owns no per-frame state; reference bits, pins and dirty
/// flags live in the [`FrameTable`] descriptors it is given.
#[derive(Debug)]
pub struct ClockReplacer {
    pool_size: usize,
    /// Last frame handed out or inspected.
    clock_hand: usize,
}

impl ClockReplacer {
    /// Create a replacer for `pool_size` frames.
    ///
    /// The hand starts on the last frame so the first sweep begins at
    /// frame 0.
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");
        Self {
            pool_size,
            clock_hand: pool_size - 1,
        }
    }

    /// Current hand position.
    #[inline]
    pub fn clock_hand(&self) -> FrameId {
        FrameId::new(self.clock_hand)
    }

    /// Most frames a single sweep inspects before giving up: one lap to
    /// strip reference bits, one lap to find a victim.
    #[inline]
    pub fn max_sweep(&self) -> usize {
        2 * self.pool_size
    }

    #[inline]
    fn advance(&mut self) -> FrameId {
        self.clock_hand = (self.clock_hand + 1) % self.pool_size;
        FrameId::new(self.clock_hand)
    }

    /// Find a frame for new content, evicting a victim if necessary.
    ///
    /// Walking forward from the hand:
    /// - an invalid frame is taken as is;
    /// - a frame with its reference bit set loses the bit and is skipped;
    /// - an unpinned frame with a clear bit is evicted: written back to its
    ///   store if dirty, removed from `page_table`, and reset;
    /// - a pinned frame is skipped.
    ///
    /// The returned frame is empty and not in `page_table`.
    ///
    /// # Errors
    /// - `Error::BufferExhausted` if every frame is pinned.
    /// - Store errors from writing back a dirty victim. The victim then
    ///   stays resident and dirty.
    ///
    /// On any error the reference bits cleared by the sweep are restored and
    /// the hand is put back, so the frame table is left as it was.
    pub fn allocate<S: PageStore>(
        &mut self,
        frames: &mut FrameTable,
        page_table: &mut PageTable,
        stores: &mut StoreSet<S>,
    ) -> Result<Allocation> {
        debug_assert_eq!(frames.len(), self.pool_size);

        let start = self.clock_hand;
        // Frames whose bit this sweep cleared
        let mut stripped: Vec<FrameId> = Vec::new();

        for _ in 0..self.max_sweep() {
            let frame_id = self.advance();
            let desc = *frames.descriptor(frame_id);

            if !desc.is_valid() {
                return Ok(Allocation {
                    frame_id,
                    evicted: None,
                });
            }

            if desc.is_recent() {
                frames.descriptor_mut(frame_id).take_recent();
                stripped.push(frame_id);
                continue;
            }

            if desc.is_pinned() {
                continue;
            }

            return match Self::evict(frame_id, frames, page_table, stores) {
                Ok(eviction) => Ok(Allocation {
                    frame_id,
                    evicted: Some(eviction),
                }),
                Err(e) => {
                    self.rewind(start, &stripped, frames);
                    Err(e)
                }
            };
        }

        self.rewind(start, &stripped, frames);
        warn!("buffer pool exhausted: all {} frames pinned", self.pool_size);
        Err(Error::BufferExhausted {
            pool_size: self.pool_size,
        })
    }

    /// Undo a failed sweep.
    fn rewind(&mut self, start: usize, stripped: &[FrameId], frames: &mut FrameTable) {
        for &frame_id in stripped {
            frames.descriptor_mut(frame_id).mark_recent();
        }
        self.clock_hand = start;
    }

    /// Write back (if dirty), unindex and reset an unpinned valid frame.
    /// Nothing is changed unless the write-back succeeds.
    fn evict<S: PageStore>(
        frame_id: FrameId,
        frames: &mut FrameTable,
        page_table: &mut PageTable,
        stores: &mut StoreSet<S>,
    ) -> Result<Eviction> {
        let desc = *frames.descriptor(frame_id);
        let store = desc.owner().ok_or(Error::BadFrame {
            frame_id,
            dirty: desc.is_dirty(),
            valid: desc.is_valid(),
            recent: desc.is_recent(),
        })?;

        let written_back = desc.is_dirty();
        if written_back {
            frames.write_back(frame_id, stores.get_mut(store)?)?;
        }
        page_table.remove(store, desc.page_id());
        frames.descriptor_mut(frame_id).clear();

        debug!(
            "evicted {} of {} from {} (dirty={})",
            desc.page_id(),
            store,
            frame_id,
            written_back
        );
        Ok(Eviction {
            store,
            page_id: desc.page_id(),
            written_back,
        })
    }
}
