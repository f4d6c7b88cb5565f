//! Hero section visibility.

use tokio::sync::watch;

use super::geometry::{intersect, IntersectionOptions, Rect, RootMargin, ViewportSize};

/// Default share of the hero that must be visible.
pub const HERO_THRESHOLD: f64 = 0.1;
/// Default root margin: the hero counts as gone once it leaves the middle 60%.
pub const HERO_ROOT_MARGIN: &str = "-20% 0px";

/// Tracks whether the hero section is on screen and publishes transitions.
///
/// Starts visible, so the first hidden observation is a transition.
#[derive(Debug)]
pub struct HeroViewport {
    options: IntersectionOptions,
    is_hero_visible: bool,
    has_scrolled_past_hero: bool,
    tx: watch::Sender<bool>,
}

impl HeroViewport {
    pub fn new(threshold: f64) -> Self {
        let root_margin = HERO_ROOT_MARGIN.parse().unwrap_or_default();
        Self::with_options(IntersectionOptions::new(threshold, root_margin))
    }

    pub fn with_options(options: IntersectionOptions) -> Self {
        let (tx, _rx) = watch::channel(true);
        Self {
            options,
            is_hero_visible: true,
            has_scrolled_past_hero: false,
            tx,
        }
    }

    /// Receiver that follows the visible flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Recompute from the hero's current rect. Returns the new visibility
    /// on a transition.
    pub fn observe(&mut self, hero: &Rect, viewport: ViewportSize) -> Option<bool> {
        let entry = intersect(hero, viewport, &self.options);
        self.has_scrolled_past_hero = !entry.is_intersecting;
        if entry.is_intersecting == self.is_hero_visible {
            return None;
        }
        self.is_hero_visible = entry.is_intersecting;
        self.tx.send_replace(self.is_hero_visible);
        tracing::debug!(visible = self.is_hero_visible, "hero visibility changed");
        Some(self.is_hero_visible)
    }

    pub fn is_hero_visible(&self) -> bool {
        self.is_hero_visible
    }

    pub fn has_scrolled_past_hero(&self) -> bool {
        self.has_scrolled_past_hero
    }
}

impl Default for HeroViewport {
    fn default() -> Self {
        Self::new(HERO_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: ViewportSize = ViewportSize { width: 1280.0, height: 800.0 };

    fn hero_at(top: f64) -> Rect {
        Rect::new(top, 0.0, 1280.0, 800.0)
    }

    #[test]
    fn starts_visible_and_reports_exit_once() {
        let mut hero = HeroViewport::default();
        assert!(hero.is_hero_visible());
        assert_eq!(hero.observe(&hero_at(0.0), VIEWPORT), None);

        assert_eq!(hero.observe(&hero_at(-790.0), VIEWPORT), Some(false));
        assert!(hero.has_scrolled_past_hero());
        assert_eq!(hero.observe(&hero_at(-900.0), VIEWPORT), None);

        assert_eq!(hero.observe(&hero_at(-100.0), VIEWPORT), Some(true));
        assert!(!hero.has_scrolled_past_hero());
    }

    #[test]
    fn shrunken_root_hides_hero_early() {
        let mut hero = HeroViewport::default();
        // 200px remain on screen, but only 40px reach below the top 20% band.
        assert_eq!(hero.observe(&hero_at(-600.0), VIEWPORT), Some(false));
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let mut hero = HeroViewport::default();
        let mut rx = hero.subscribe();
        assert!(*rx.borrow());

        hero.observe(&hero_at(-2000.0), VIEWPORT);
        rx.changed().await.unwrap();
        assert!(!*rx.borrow_and_update());
    }
}
