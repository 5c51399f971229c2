//! Page geometry for visibility checks.
//!
//! The host records each observed element's box with
//! [`crate::Document::set_layout`]; coordinates are page-relative, so
//! scrolling only moves the [`Viewport`].

/// A laid-out box, in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub top: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub height: f64,
}

impl Viewport {
    #[must_use]
    pub fn new(scroll_y: f64, height: f64) -> Self {
        Self { scroll_y, height }
    }

    #[must_use]
    pub fn scrolled_to(self, scroll_y: f64) -> Self {
        Self { scroll_y, ..self }
    }

    /// `true` when any part of `rect` is on screen.
    #[must_use]
    pub fn contains(&self, rect: Rect) -> bool {
        let top = rect.top - self.scroll_y;
        let bottom = rect.bottom() - self.scroll_y;
        top < self.height && bottom > 0.0
    }

    /// Fraction of `rect` that is on screen, in `0.0..=1.0`.
    ///
    /// Zero-height boxes count as fully visible while inside the viewport.
    #[must_use]
    pub fn intersection_ratio(&self, rect: Rect) -> f64 {
        let view_bottom = self.scroll_y + self.height;
        if rect.height <= 0.0 {
            let inside = rect.top >= self.scroll_y && rect.top <= view_bottom;
            return if inside { 1.0 } else { 0.0 };
        }
        let visible = rect.bottom().min(view_bottom) - rect.top.max(self.scroll_y);
        (visible.max(0.0) / rect.height).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_partially_visible_box() {
        let vp = Viewport::new(0.0, 800.0);
        assert!(vp.contains(Rect::new(700.0, 400.0)));
        assert!(!vp.contains(Rect::new(800.0, 400.0)));
        assert!(!vp.scrolled_to(1300.0).contains(Rect::new(800.0, 400.0)));
        assert!(vp.scrolled_to(1100.0).contains(Rect::new(800.0, 400.0)));
    }

    #[test]
    fn intersection_ratio_of_partial_box() {
        let vp = Viewport::new(0.0, 800.0);
        let ratio = vp.intersection_ratio(Rect::new(700.0, 400.0));
        assert!((ratio - 0.25).abs() < 1e-9, "got {ratio}");
    }

    #[test]
    fn intersection_ratio_of_hidden_and_full_boxes() {
        let vp = Viewport::new(1000.0, 800.0);
        assert!(vp.intersection_ratio(Rect::new(0.0, 500.0)).abs() < 1e-9);
        assert!((vp.intersection_ratio(Rect::new(1100.0, 200.0)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_height_box() {
        let vp = Viewport::new(0.0, 800.0);
        assert!((vp.intersection_ratio(Rect::new(10.0, 0.0)) - 1.0).abs() < 1e-9);
        assert!(vp.intersection_ratio(Rect::new(900.0, 0.0)).abs() < 1e-9);
    }
}
