//! Viewport and scroll observers.
//!
//! The rendering layer reports element rects; each observer turns them into
//! an edge-triggered boolean signal.

mod geometry;
mod header_tint;
mod hero;
mod priority;
mod section;

pub use geometry::{
    intersect, IntersectionEntry, IntersectionOptions, MarginValue, Rect, RootMargin,
    RootMarginError, ViewportSize,
};
pub use header_tint::HeaderTint;
pub use hero::{HeroViewport, HERO_ROOT_MARGIN, HERO_THRESHOLD};
pub use priority::{adjusted_priority, HeroTransitionTracker};
pub use section::{SectionIntersection, SECTION_ROOT_MARGIN, SECTION_THRESHOLD};
