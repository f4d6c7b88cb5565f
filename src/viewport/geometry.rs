//! Viewport geometry and intersection math.

use std::str::FromStr;

use thiserror::Error;

/// Axis-aligned rectangle in viewport coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self { top, left, width, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlap of two rects. Edge-adjacent rects yield a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let top = self.top.max(other.top);
        let left = self.left.max(other.left);
        let bottom = self.bottom().min(other.bottom());
        let right = self.right().min(other.right());
        if bottom < top || right < left {
            return None;
        }
        Some(Rect::new(top, left, right - left, bottom - top))
    }
}

/// Size of the visual viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn as_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RootMarginError {
    #[error("root margin must have 1 to 4 values, got {0}")]
    Arity(usize),
    #[error("invalid root margin value: {0}")]
    Value(String),
}

/// One side of a root margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Px(f64),
    Percent(f64),
}

impl MarginValue {
    fn resolve(self, basis: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => basis * pct / 100.0,
        }
    }
}

impl FromStr for MarginValue {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RootMarginError::Value(s.to_string());
        if let Some(num) = s.strip_suffix('%') {
            num.parse().map(Self::Percent).map_err(|_| invalid())
        } else if let Some(num) = s.strip_suffix("px") {
            num.parse().map(Self::Px).map_err(|_| invalid())
        } else if s == "0" {
            Ok(Self::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

/// CSS-style margin applied to the viewport before intersecting.
/// Negative values shrink the root.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl Default for RootMargin {
    fn default() -> Self {
        let zero = MarginValue::Px(0.0);
        Self { top: zero, right: zero, bottom: zero, left: zero }
    }
}

impl FromStr for RootMargin {
    type Err = RootMarginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<MarginValue>, _>>()?;
        let (top, right, bottom, left) = match values.as_slice() {
            [all] => (*all, *all, *all, *all),
            [v, h] => (*v, *h, *v, *h),
            [t, h, b] => (*t, *h, *b, *h),
            [t, r, b, l] => (*t, *r, *b, *l),
            other => return Err(RootMarginError::Arity(other.len())),
        };
        Ok(Self { top, right, bottom, left })
    }
}

impl RootMargin {
    /// The viewport rect grown (or shrunk) by this margin.
    pub fn apply(&self, viewport: ViewportSize) -> Rect {
        let top = self.top.resolve(viewport.height);
        let bottom = self.bottom.resolve(viewport.height);
        let left = self.left.resolve(viewport.width);
        let right = self.right.resolve(viewport.width);
        Rect::new(
            -top,
            -left,
            viewport.width + left + right,
            viewport.height + top + bottom,
        )
    }
}

/// Intersection settings for one observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionOptions {
    pub threshold: f64,
    pub root_margin: RootMargin,
}

impl IntersectionOptions {
    pub fn new(threshold: f64, root_margin: RootMargin) -> Self {
        Self { threshold: threshold.clamp(0.0, 1.0), root_margin }
    }
}

/// Result of intersecting one element with the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
    pub bounding_rect: Rect,
}

/// Intersect `element` with the margin-adjusted viewport.
///
/// An element intersects when its visible ratio reaches the threshold; at
/// threshold 0 any overlap counts, edge contact included.
pub fn intersect(element: &Rect, viewport: ViewportSize, options: &IntersectionOptions) -> IntersectionEntry {
    let root = options.root_margin.apply(viewport);
    let overlap = element.intersection(&root);
    let ratio = match overlap {
        Some(o) if element.area() > 0.0 => o.area() / element.area(),
        Some(_) => 1.0,
        None => 0.0,
    };
    let is_intersecting = match overlap {
        None => false,
        Some(_) if options.threshold <= 0.0 => true,
        Some(_) => ratio >= options.threshold,
    };
    IntersectionEntry {
        is_intersecting,
        intersection_ratio: ratio,
        bounding_rect: *element,
    }
}
