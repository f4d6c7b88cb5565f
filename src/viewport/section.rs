//! Section entry detection for scroll-triggered reveals.

use super::geometry::{intersect, IntersectionOptions, Rect, ViewportSize};

pub const SECTION_THRESHOLD: f64 = 0.3;
pub const SECTION_ROOT_MARGIN: &str = "-10% 0px -10% 0px";

/// Sticky in-view flag for one section.
///
/// Turns on when the section intersects and only turns off again once the
/// section has dropped below the bottom of the viewport, so scrolling past
/// a section keeps it "in view".
#[derive(Debug, Clone)]
pub struct SectionIntersection {
    options: IntersectionOptions,
    is_in_viewport: bool,
}

impl SectionIntersection {
    pub fn new(options: IntersectionOptions) -> Self {
        Self { options, is_in_viewport: false }
    }

    pub fn observe(&mut self, element: &Rect, viewport: ViewportSize) -> Option<bool> {
        let entry = intersect(element, viewport, &self.options);
        let next = if entry.is_intersecting {
            true
        } else if entry.bounding_rect.top > viewport.height {
            false
        } else {
            self.is_in_viewport
        };
        if next == self.is_in_viewport {
            return None;
        }
        self.is_in_viewport = next;
        Some(next)
    }

    pub fn is_in_viewport(&self) -> bool {
        self.is_in_viewport
    }
}

impl Default for SectionIntersection {
    fn default() -> Self {
        let root_margin = SECTION_ROOT_MARGIN.parse().unwrap_or_default();
        Self::new(IntersectionOptions::new(SECTION_THRESHOLD, root_margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: ViewportSize = ViewportSize { width: 1280.0, height: 1000.0 };

    fn section_at(top: f64) -> Rect {
        Rect::new(top, 0.0, 1280.0, 600.0)
    }

    #[test]
    fn enters_when_enough_is_visible() {
        let mut section = SectionIntersection::default();
        assert_eq!(section.observe(&section_at(1200.0), VIEWPORT), None);
        // Root band is 100..900; 150px of 600 visible is below the 0.3 threshold.
        assert_eq!(section.observe(&section_at(750.0), VIEWPORT), None);
        assert_eq!(section.observe(&section_at(500.0), VIEWPORT), Some(true));
    }

    #[test]
    fn stays_in_view_after_scrolling_past() {
        let mut section = SectionIntersection::default();
        section.observe(&section_at(200.0), VIEWPORT);
        assert_eq!(section.observe(&section_at(-2000.0), VIEWPORT), None);
        assert!(section.is_in_viewport());
    }

    #[test]
    fn leaves_when_pushed_below_viewport() {
        let mut section = SectionIntersection::default();
        section.observe(&section_at(200.0), VIEWPORT);
        assert_eq!(section.observe(&section_at(1001.0), VIEWPORT), Some(false));
    }
}
