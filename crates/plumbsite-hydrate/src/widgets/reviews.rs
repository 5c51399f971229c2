use std::time::Duration;

use plumbsite_core::Review;
use plumbsite_dom::{Document, EventKind, Listener, NodeId, Page};

use super::{WidgetCore, WidgetState};
use crate::timers::TimerRegistry;

pub const TRACK_ID: &str = "reviewsTrack";
pub const DUPLICATION_FACTOR: usize = 5;
pub const MAX_CARDS: usize = 100;
pub const SECONDS_PER_CARD: u64 = 5;
pub const CARD_FLEX: &str = "0 0 300px";
pub const STARS: &str = "★★★★★";
pub const ANONYMOUS: &str = "Anonymous";

/// How a review list is laid out on the ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickerPlan {
    /// Cards rendered: the list repeated [`DUPLICATION_FACTOR`] times,
    /// capped at [`MAX_CARDS`].
    pub cards: usize,
    /// One animation cycle across all rendered cards.
    pub duration: Duration,
}

#[must_use]
pub fn ticker_plan(review_count: usize) -> TickerPlan {
    let cards = review_count.saturating_mul(DUPLICATION_FACTOR).min(MAX_CARDS);
    TickerPlan {
        cards,
        duration: Duration::from_secs(cards as u64 * SECONDS_PER_CARD),
    }
}

/// Continuously scrolling review strip inside `#reviewsTrack`.
///
/// Motion is a CSS animation, so the ticker owns no timer. Hovering or
/// touching the track pauses it.
#[derive(Debug, Default)]
pub struct ReviewsTicker {
    core: WidgetCore,
}

impl ReviewsTicker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.core.state()
    }

    /// Renders the cards and starts the animation. Returns `true` when this
    /// call initialized the ticker.
    pub fn init(&self, page: &Page, reviews: &[Review]) -> bool {
        if reviews.is_empty() {
            return false;
        }
        let Some(track) = page.read(|doc| doc.get_element_by_id(TRACK_ID)) else {
            return false;
        };
        if !self.core.claim(page, track) {
            return false;
        }

        let plan = ticker_plan(reviews.len());
        page.write(|doc| {
            doc.remove_children(track);
            for review in reviews.iter().cycle().take(plan.cards) {
                let card = review_card(doc, review);
                doc.append_child(track, card);
            }
            restart_animation(doc, track, plan.duration);
            wire_pause(doc, track);
        });

        self.core.run(None);
        tracing::debug!(
            reviews = reviews.len(),
            cards = plan.cards,
            duration_secs = plan.duration.as_secs(),
            "reviews ticker started"
        );
        true
    }

    pub fn stop(&self, timers: &TimerRegistry) {
        self.core.stop(timers);
    }
}

fn review_card(doc: &mut Document, review: &Review) -> NodeId {
    let card = doc.create_element("div");
    doc.set_attr(card, "class", "review-card");
    doc.set_style_property(card, "flex", CARD_FLEX);

    let name = doc.create_element("h4");
    doc.set_attr(name, "class", "reviewer-name");
    let reviewer = review
        .reviewer_name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(ANONYMOUS);
    doc.set_text_content(name, reviewer);

    let stars = doc.create_element("div");
    doc.set_attr(stars, "class", "review-stars");
    doc.set_text_content(stars, STARS);

    let text = doc.create_element("p");
    doc.set_attr(text, "class", "review-text");
    doc.set_text_content(text, review.review_text.as_deref().unwrap_or_default());

    doc.append_child(card, name);
    doc.append_child(card, stars);
    doc.append_child(card, text);
    card
}

/// Clears then reapplies the track animation so it starts from the
/// beginning.
fn restart_animation(doc: &mut Document, track: NodeId, duration: Duration) {
    doc.set_style_property(track, "animation", "none");
    doc.set_style_property(
        track,
        "animation",
        &format!("slide {}s linear infinite", duration.as_secs()),
    );
}

fn wire_pause(doc: &mut Document, track: NodeId) {
    let pause = Listener::new(|doc, node| {
        doc.set_style_property(node, "animation-play-state", "paused");
    });
    let resume = Listener::new(|doc, node| {
        doc.set_style_property(node, "animation-play-state", "running");
    });
    doc.add_event_listener(track, EventKind::MouseEnter, pause.clone());
    doc.add_event_listener(track, EventKind::TouchStart, pause);
    doc.add_event_listener(track, EventKind::MouseLeave, resume.clone());
    doc.add_event_listener(track, EventKind::TouchEnd, resume);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_replicates_and_caps() {
        assert_eq!(
            ticker_plan(3),
            TickerPlan {
                cards: 15,
                duration: Duration::from_secs(75),
            }
        );
        assert_eq!(ticker_plan(20).cards, 100);
        assert_eq!(ticker_plan(20).duration, Duration::from_secs(500));
        assert_eq!(ticker_plan(50).cards, 100);
        assert_eq!(ticker_plan(0).cards, 0);
    }
}
