//! Reveal animation state for the reason breakdown section.

mod breakdown;
mod section;

pub use breakdown::{BreakdownAnimation, BreakdownTiming, DEFAULT_DWELL, DEFAULT_TRANSITION};
pub use section::BreakdownSection;
