use std::ops::ControlFlow;

use plumbsite_core::AboutImage;
use plumbsite_dom::Page;

use super::{advance_active, WidgetCore, WidgetState, ACTIVE_CLASS, ROTATION_INTERVAL};
use crate::images::{preload_all, ImageLoader};
use crate::timers::{TimerId, TimerRegistry};

pub const CONTAINER_SELECTOR: &str = "[data-about-slider]";

/// About-us slider built from scratch inside `[data-about-slider]`.
///
/// Only images that load get a slide. With one surviving image the slider
/// is static; with none the container is left empty.
#[derive(Debug, Default)]
pub struct AboutSlider {
    core: WidgetCore,
}

impl AboutSlider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> WidgetState {
        self.core.state()
    }

    /// Returns `true` when this call initialized the slider.
    pub async fn init(
        &self,
        page: &Page,
        timers: &TimerRegistry,
        loader: &dyn ImageLoader,
        images: &[AboutImage],
    ) -> bool {
        if images.is_empty() {
            return false;
        }
        let Some(container) = page.read(|doc| doc.query_selector(CONTAINER_SELECTOR).ok().flatten())
        else {
            return false;
        };
        if !self.core.claim(page, container) {
            return false;
        }
        page.write(|doc| doc.remove_children(container));

        let valid: Vec<&AboutImage> = preload_all(loader, images.iter().collect(), |image| {
            image.url.as_str()
        })
        .await
        .into_iter()
        .filter_map(|p| p.loaded())
        .collect();

        if self.core.state() != WidgetState::Initializing {
            return false;
        }
        if valid.is_empty() {
            tracing::warn!("no about-us image loaded; slider left empty");
            self.core.run(None);
            return true;
        }

        let slides = page.write(|doc| {
            valid
                .iter()
                .enumerate()
                .map(|(i, image)| {
                    let slide = doc.create_element("div");
                    doc.set_attr(slide, "class", if i == 0 { "slide active" } else { "slide" });
                    let img = doc.create_element("img");
                    doc.set_attr(img, "src", &image.url);
                    let alt = if image.description.is_empty() {
                        format!("About Image {}", i + 1)
                    } else {
                        image.description.clone()
                    };
                    doc.set_attr(img, "alt", &alt);
                    doc.append_child(slide, img);
                    doc.append_child(container, slide);
                    slide
                })
                .collect::<Vec<_>>()
        });

        if slides.len() < 2 {
            self.core.run(None);
            return true;
        }

        let state = self.core.state_cell();
        let tick_page = page.clone();
        let mut current = 0;
        let timer = timers.set_interval(ROTATION_INTERVAL, move || {
            tick_page.write(|doc| {
                let slides: Vec<_> = doc
                    .element_children(container)
                    .into_iter()
                    .filter(|node| doc.has_class(*node, "slide"))
                    .collect();
                if slides.is_empty() || !doc.is_connected(container) {
                    state.set(WidgetState::Stopped);
                    return ControlFlow::Break(());
                }
                if current >= slides.len() {
                    current = slides
                        .iter()
                        .position(|s| doc.has_class(*s, ACTIVE_CLASS))
                        .unwrap_or(0);
                }
                current = advance_active(doc, &slides, current);
                ControlFlow::Continue(())
            })
        });
        self.core.run(Some(timer));
        tracing::debug!(slides = slides.len(), "about slider started");
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
