//! Header tint: darken the header while a dark section passes beneath it.

use super::geometry::{Rect, ViewportSize};

const DESKTOP_BREAKPOINT: f64 = 768.0;
const DESKTOP_HEADER_HEIGHT: f64 = 72.0;
const MOBILE_HEADER_HEIGHT: f64 = 64.0;

#[derive(Debug, Clone, Default)]
pub struct HeaderTint {
    is_active: bool,
}

impl HeaderTint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header_height(viewport: ViewportSize) -> f64 {
        if viewport.width >= DESKTOP_BREAKPOINT {
            DESKTOP_HEADER_HEIGHT
        } else {
            MOBILE_HEADER_HEIGHT
        }
    }

    /// Whether any section overlaps the header band.
    pub fn evaluate(sections: &[Rect], viewport: ViewportSize) -> bool {
        let header = Self::header_height(viewport);
        sections
            .iter()
            .any(|rect| rect.top < header && rect.bottom() > 0.0)
    }

    /// Recompute on scroll, resize or intersection change.
    pub fn observe(&mut self, sections: &[Rect], viewport: ViewportSize) -> Option<bool> {
        if sections.is_empty() {
            return None;
        }
        let next = Self::evaluate(sections, viewport);
        if next == self.is_active {
            return None;
        }
        self.is_active = next;
        Some(next)
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_height_follows_breakpoint() {
        assert_eq!(HeaderTint::header_height(ViewportSize::new(1024.0, 800.0)), 72.0);
        assert_eq!(HeaderTint::header_height(ViewportSize::new(375.0, 800.0)), 64.0);
    }

    #[test]
    fn activates_while_section_under_header() {
        let viewport = ViewportSize::new(1024.0, 800.0);
        let mut tint = HeaderTint::new();
        let builder = Rect::new(300.0, 0.0, 1024.0, 500.0);
        assert_eq!(tint.observe(&[builder], viewport), None);

        let builder = Rect::new(70.0, 0.0, 1024.0, 500.0);
        assert_eq!(tint.observe(&[builder], viewport), Some(true));

        let builder = Rect::new(-500.0, 0.0, 1024.0, 500.0);
        assert_eq!(tint.observe(&[builder], viewport), Some(false));
    }

    #[test]
    fn mobile_band_is_shorter() {
        let section = Rect::new(68.0, 0.0, 375.0, 400.0);
        assert!(!HeaderTint::evaluate(&[section], ViewportSize::new(375.0, 700.0)));
        assert!(HeaderTint::evaluate(&[section], ViewportSize::new(800.0, 700.0)));
    }

    #[test]
    fn no_sections_keeps_state() {
        let mut tint = HeaderTint::new();
        assert_eq!(tint.observe(&[], ViewportSize::new(1024.0, 800.0)), None);
        assert!(!tint.is_active());
    }
}
