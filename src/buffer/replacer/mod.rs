//! Eviction policy.
//!
//! - [`ClockReplacer`] - CLOCK (second chance) over the frame table

mod clock;

pub use clock::{Allocation, ClockReplacer, Eviction};
