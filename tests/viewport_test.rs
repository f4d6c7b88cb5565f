//! Scroll sequences through the viewport observers.

use landing_preload::scheduler::ResourcePriority;
use landing_preload::viewport::{
    adjusted_priority, intersect, HeaderTint, HeroTransitionTracker, HeroViewport,
    IntersectionOptions, Rect, RootMargin, RootMarginError, SectionIntersection, ViewportSize,
};

const VIEWPORT: ViewportSize = ViewportSize { width: 1440.0, height: 900.0 };

/// Page layout: hero 0..900, builder section 900..1700, reasons 1700..2900.
fn at_scroll(page_top: f64, height: f64, scroll_y: f64) -> Rect {
    Rect::new(page_top - scroll_y, 0.0, VIEWPORT.width, height)
}

#[test]
fn scrolling_down_the_page() {
    let mut hero = HeroViewport::default();
    let mut tracker = HeroTransitionTracker::new();
    let mut reasons = SectionIntersection::default();
    let mut tint = HeaderTint::new();
    let mut rx = hero.subscribe();

    let mut hero_events = Vec::new();
    let mut reason_events = Vec::new();
    let mut tint_events = Vec::new();

    for scroll_y in (0..=2400).step_by(100) {
        let y = scroll_y as f64;
        if let Some(visible) = hero.observe(&at_scroll(0.0, 900.0, y), VIEWPORT) {
            assert_eq!(tracker.observe(visible), Some(visible));
            hero_events.push((scroll_y, visible));
        }
        if let Some(in_view) = reasons.observe(&at_scroll(1700.0, 1200.0, y), VIEWPORT) {
            reason_events.push((scroll_y, in_view));
        }
        if let Some(active) = tint.observe(&[at_scroll(900.0, 800.0, y)], VIEWPORT) {
            tint_events.push((scroll_y, active));
        }
    }

    // Root band is 180..720; 10% of the hero is 90px, so the hero is hidden
    // once its bottom edge passes 270.
    assert_eq!(hero_events, vec![(700, false)]);
    assert!(rx.has_changed().unwrap());
    assert!(!*rx.borrow_and_update());
    assert!(hero.has_scrolled_past_hero());

    // Root band is 90..810; the section needs 360px of it.
    assert_eq!(reason_events, vec![(1300, true)]);

    // Builder section under the 72px header from 900 until it scrolls off.
    assert_eq!(tint_events, vec![(900, true), (1700, false)]);
}

#[test]
fn scrolling_back_up_restores_hero() {
    let mut hero = HeroViewport::default();
    assert_eq!(hero.observe(&at_scroll(0.0, 900.0, 1500.0), VIEWPORT), Some(false));
    assert_eq!(hero.observe(&at_scroll(0.0, 900.0, 0.0), VIEWPORT), Some(true));
    assert!(hero.is_hero_visible());
    assert!(!hero.has_scrolled_past_hero());
}

#[test]
fn thumbnails_demote_only_when_hero_hidden() {
    let base = ResourcePriority::Critical;
    assert_eq!(adjusted_priority(base, true, true), ResourcePriority::Critical);
    assert_eq!(adjusted_priority(base, false, true), ResourcePriority::Lazy);
    assert_eq!(adjusted_priority(base, false, false), ResourcePriority::Critical);
}

#[test]
fn root_margin_errors() {
    assert!(matches!(
        "1px 2px 3px 4px 5px".parse::<RootMargin>(),
        Err(RootMarginError::Arity(5))
    ));
    assert!(matches!("12em".parse::<RootMargin>(), Err(RootMarginError::Value(_))));
    assert!(matches!("".parse::<RootMargin>(), Err(RootMarginError::Arity(0))));
}

#[test]
fn zero_threshold_counts_edge_contact() {
    let options = IntersectionOptions::new(0.0, RootMargin::default());
    let below = Rect::new(VIEWPORT.height, 0.0, 100.0, 100.0);
    assert!(intersect(&below, VIEWPORT, &options).is_intersecting);

    let further = Rect::new(VIEWPORT.height + 1.0, 0.0, 100.0, 100.0);
    assert!(!intersect(&further, VIEWPORT, &options).is_intersecting);
}
