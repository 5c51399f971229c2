//! Self-initializing page widgets.
//!
//! Each widget claims its container with `data-initialized="true"` before
//! touching it, so a second `init` on the same page is a no-op, and tracks
//! its lifecycle in a shared [`WidgetState`] cell.

pub mod about;
pub mod hero;
pub mod nav;
pub mod reviews;

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use plumbsite_dom::{Document, NodeId, Page};

use crate::timers::{TimerId, TimerRegistry};

pub use about::AboutSlider;
pub use hero::HeroCarousel;
pub use nav::wire_nav_toggle;
pub use reviews::{ticker_plan, ReviewsTicker, TickerPlan};

/// Slide rotation period for both carousels.
pub const ROTATION_INTERVAL: Duration = Duration::from_secs(5);

pub(crate) const INITIALIZED_KEY: &str = "initialized";
pub(crate) const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    #[default]
    Uninitialized,
    /// Container claimed; images may still be preloading.
    Initializing,
    Running,
    Stopped,
}

/// Lifecycle bookkeeping shared by every widget.
#[derive(Debug, Default)]
pub(crate) struct WidgetCore {
    state: Rc<Cell<WidgetState>>,
    timer: Cell<Option<TimerId>>,
}

impl WidgetCore {
    pub(crate) fn state(&self) -> WidgetState {
        self.state.get()
    }

    pub(crate) fn state_cell(&self) -> Rc<Cell<WidgetState>> {
        Rc::clone(&self.state)
    }

    /// Claims `container` for this widget.
    ///
    /// Returns `false` (and changes nothing) when the widget is already
    /// past `Uninitialized` or the container was claimed earlier.
    pub(crate) fn claim(&self, page: &Page, container: NodeId) -> bool {
        if self.state.get() != WidgetState::Uninitialized {
            return false;
        }
        let claimed = page.write(|doc| {
            if doc.dataset(container, INITIALIZED_KEY) == Some("true") {
                return false;
            }
            doc.set_dataset(container, INITIALIZED_KEY, "true");
            true
        });
        if claimed {
            self.state.set(WidgetState::Initializing);
        }
        claimed
    }

    /// Moves to `Running`, owning `timer` if one was started.
    pub(crate) fn run(&self, timer: Option<TimerId>) {
        self.timer.set(timer);
        self.state.set(WidgetState::Running);
    }

    /// Cancels the widget's timer and moves to `Stopped`.
    pub(crate) fn stop(&self, timers: &TimerRegistry) {
        if let Some(timer) = self.timer.take() {
            timers.clear(timer);
        }
        if self.state.get() != WidgetState::Uninitialized {
            self.state.set(WidgetState::Stopped);
        }
    }

    pub(crate) fn timer(&self) -> Option<TimerId> {
        self.timer.get()
    }
}

/// Moves the `active` class from `slides[current]` to the next slide and
/// returns the new index.
pub(crate) fn advance_active(doc: &mut Document, slides: &[NodeId], current: usize) -> usize {
    if slides.is_empty() {
        return 0;
    }
    let current = current % slides.len();
    doc.remove_class(slides[current], ACTIVE_CLASS);
    let next = (current + 1) % slides.len();
    doc.add_class(slides[next], ACTIVE_CLASS);
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_slides() -> (Document, Vec<NodeId>) {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let slides: Vec<NodeId> = (0..3)
            .map(|_| {
                let slide = doc.create_element("div");
                doc.append_child(body, slide);
                slide
            })
            .collect();
        doc.add_class(slides[0], ACTIVE_CLASS);
        (doc, slides)
    }

    fn active(doc: &Document, slides: &[NodeId]) -> Vec<usize> {
        slides
            .iter()
            .enumerate()
            .filter(|(_, s)| doc.has_class(**s, ACTIVE_CLASS))
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn advance_cycles_with_exactly_one_active() {
        let (mut doc, slides) = three_slides();
        let mut current = 0;
        for expected in [1, 2, 0, 1] {
            current = advance_active(&mut doc, &slides, current);
            assert_eq!(current, expected);
            assert_eq!(active(&doc, &slides), vec![expected]);
        }
    }

    #[test]
    fn claim_sets_flag_once() {
        let page = Page::new(Document::new());
        let body = page.read(|doc| doc.body().unwrap());
        let first = WidgetCore::default();
        let second = WidgetCore::default();

        assert!(first.claim(&page, body));
        assert_eq!(first.state(), WidgetState::Initializing);
        assert!(!first.claim(&page, body));
        assert!(!second.claim(&page, body));
        assert_eq!(second.state(), WidgetState::Uninitialized);
        assert_eq!(
            page.read(|doc| doc.attr(body, "data-initialized").map(str::to_owned)),
            Some("true".to_owned())
        );
    }
}
