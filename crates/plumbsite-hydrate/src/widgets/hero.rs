use std::ops::ControlFlow;

use plumbsite_core::HeroImage;
use plumbsite_dom::{NodeId, Page};

use super::{advance_active, WidgetCore, WidgetState, ACTIVE_CLASS, ROTATION_INTERVAL};
use crate::images::{preload_all, ImageLoader};
use crate::timers::{TimerId, TimerRegistry};

pub const SLIDES_SELECTOR: &str = ".slides .slide";

/// Hero carousel over the template's pre-built `.slides .slide` slots.
///
/// Slot `i` takes `heroImages[i]`: its call-to-action text goes into the
/// slot's `[data-hero-cta="i"]` element and, once the image has loaded, its
/// URL becomes the slot's background. Slots without an image keep their
/// template content. Rotation stops by itself when the slides are removed
/// from the page.
#[derive(Debug, Default)]
pub struct HeroCarousel {
    core: WidgetCore,
}

impl HeroCarousel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.core.state()
    }

    /// Binds `images` into the slots, waits for the preloads, then starts
    /// rotation. Returns `true` when this call started the carousel.
    pub async fn init(
        &self,
        page: &Page,
        timers: &TimerRegistry,
        loader: &dyn ImageLoader,
        images: &[HeroImage],
    ) -> bool {
        let slides = page.read(|doc| doc.query_selector_all(SLIDES_SELECTOR).unwrap_or_default());
        let Some(container) = slides
            .first()
            .and_then(|first| page.read(|doc| doc.parent(*first)))
        else {
            return false;
        };
        if !self.core.claim(page, container) {
            return false;
        }

        let pending: Vec<(NodeId, &HeroImage)> = slides
            .iter()
            .zip(images)
            .filter(|(_, image)| !image.image_url.is_empty())
            .map(|(slide, image)| (*slide, image))
            .collect();

        page.write(|doc| {
            for (index, (slide, image)) in slides.iter().zip(images).enumerate() {
                if image.image_url.is_empty() || image.call_to_action.is_empty() {
                    continue;
                }
                let selector = format!("[data-hero-cta=\"{index}\"]");
                if let Ok(Some(cta)) = doc.query_selector_within(*slide, &selector) {
                    doc.set_text_content(cta, &image.call_to_action);
                }
            }
        });

        let loaded = preload_all(loader, pending, |(_, image)| image.image_url.as_str()).await;
        page.write(|doc| {
            for (slide, image) in loaded.into_iter().filter_map(|p| p.loaded()) {
                doc.set_style_property(
                    slide,
                    "background-image",
                    &format!("url('{}')", image.image_url),
                );
            }
        });

        if self.core.state() != WidgetState::Initializing {
            // Torn down while the images were loading.
            return false;
        }

        let start = page.read(|doc| {
            slides
                .iter()
                .position(|slide| doc.has_class(*slide, ACTIVE_CLASS))
                .unwrap_or(0)
        });
        let slide_count = slides.len();
        let state = self.core.state_cell();
        let tick_page = page.clone();
        let mut current = start;
        let timer = timers.set_interval(ROTATION_INTERVAL, move || {
            tick_page.write(|doc| {
                if !doc.is_connected(slides[0]) {
                    state.set(WidgetState::Stopped);
                    return ControlFlow::Break(());
                }
                current = advance_active(doc, &slides, current);
                ControlFlow::Continue(())
            })
        });
        self.core.run(Some(timer));
        tracing::debug!(slides = slide_count, "hero carousel started");
        true
    }

    pub fn stop(&self, timers: &TimerRegistry) {
        self.core.stop(timers);
    }

    #[must_use]
    pub fn timer(&self) -> Option<TimerId> {
        self.core.timer()
    }
}
