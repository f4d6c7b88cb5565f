//! Scroll-driven priority adjustment.

use crate::scheduler::ResourcePriority;

/// Edge detector for hero visibility changes.
#[derive(Debug, Clone)]
pub struct HeroTransitionTracker {
    previous: bool,
}

impl HeroTransitionTracker {
    pub fn new() -> Self {
        Self { previous: true }
    }

    /// Returns the new value when it differs from the last one seen.
    pub fn observe(&mut self, is_hero_visible: bool) -> Option<bool> {
        if self.previous == is_hero_visible {
            return None;
        }
        self.previous = is_hero_visible;
        Some(is_hero_visible)
    }
}

impl Default for HeroTransitionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Agent thumbnails drop to LAZY once the hero is off screen.
pub fn adjusted_priority(
    base: ResourcePriority,
    is_hero_visible: bool,
    is_agent_thumbnail: bool,
) -> ResourcePriority {
    if !is_hero_visible && is_agent_thumbnail {
        ResourcePriority::Lazy
    } else {
        base
    }
}
