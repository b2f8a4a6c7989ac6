//! Read-only diagnostic view of the frame table.

use std::fmt;

use crate::buffer::frame::FrameDescriptor;
use crate::common::FrameId;

/// Copy of every frame descriptor at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSnapshot {
    /// One descriptor per frame, in frame order.
    pub frames: Vec<FrameDescriptor>,
    /// Number of frames holding a page.
    pub valid_frames: usize,
    /// Frame the clock hand rests on.
    pub clock_hand: FrameId,
}

impl PoolSnapshot {
    /// Frames that are valid and pinned.
    pub fn pinned_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|d| d.is_valid() && d.is_pinned())
            .count()
    }

    /// Frames that are valid and dirty.
    pub fn dirty_frames(&self) -> usize {
        self.frames
            .iter()
            .filter(|d| d.is_valid() && d.is_dirty())
            .count()
    }
}

impl fmt::Display for PoolSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for desc in &self.frames {
            writeln!(f, "{}", desc)?;
        }
        write!(f, "Total valid frames: {}", self.valid_frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{PageId, StoreId};

    #[test]
    fn test_snapshot_counts_and_display() {
        let mut a = FrameDescriptor::new(FrameId::new(0));
        a.set(StoreId::new(0), PageId::new(4));
        a.mark_dirty();
        let b = FrameDescriptor::new(FrameId::new(1));

        let snapshot = PoolSnapshot {
            frames: vec![a, b],
            valid_frames: 1,
            clock_hand: FrameId::new(0),
        };

        assert_eq!(snapshot.pinned_frames(), 1);
        assert_eq!(snapshot.dirty_frames(), 1);

        let text = format!("{}", snapshot);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Frame(0): Store(0) Page(4)"));
        assert_eq!(lines[1], "Frame(1): empty valid=false");
        assert_eq!(lines[2], "Total valid frames: 1");
    }
}
