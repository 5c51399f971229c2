#![allow(dead_code)]

use std::collections::HashSet;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use plumbsite_core::{BusinessDirectory, HydrationOptions, PhotoDirectory};
use plumbsite_dom::{parse_html, Page, Rect, Viewport};
use plumbsite_fetch::Datasets;
use plumbsite_hydrate::{ImageError, ImageLoader, PageSession};
use serde_json::json;

pub const TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head><title id="dynamic-title">Loading…</title></head>
<body>
  <header>
    <img data-logo src="placeholder.png">
    <button class="hamburger"></button>
    <ul class="nav-list"><li><a data-phone href="#">phone</a></li></ul>
  </header>
  <section id="hero">
    <h1 data-business-name>Business</h1>
    <span data-rating></span>
    <div class="slides">
      <div class="slide active"><span data-hero-cta="0">Default CTA</span></div>
      <div class="slide"><span data-hero-cta="1">Default CTA</span></div>
      <div class="slide"><span data-hero-cta="2">Default CTA</span></div>
    </div>
  </section>
  <section id="about-us">
    <p data-about-content></p>
    <div data-about-slider><div class="slide">placeholder</div></div>
  </section>
  <section id="reviewsSection">
    <span data-review-count></span>
    <div id="reviewsTrack"></div>
  </section>
  <footer><span data-business-name></span></footer>
</body>
</html>"##;

/// Viewport that shows the hero only; about-us and reviews sit below it.
pub const FOLD: Viewport = Viewport {
    scroll_y: 0.0,
    height: 800.0,
};

/// Parses [`TEMPLATE`] and lays the sections out one screen apart.
pub fn page() -> Page {
    let mut doc = parse_html(TEMPLATE);
    for (id, top) in [("hero", 0.0), ("about-us", 1000.0), ("reviewsSection", 2000.0)] {
        let node = doc.get_element_by_id(id).expect("section in template");
        doc.set_layout(node, Rect::new(top, 800.0));
    }
    Page::new(doc)
}

pub fn directory() -> BusinessDirectory {
    serde_json::from_value(json!({
        "finalWebsiteData": [
            {
                "siteId": "abc",
                "businessName": "Joe's Plumbing",
                "rating": "4.8",
                "phone": "(555) 010-0199",
                "reviewsCount": "37",
                "aboutUs": "Family owned since 1982.",
                "fiveStarReviews": [
                    {"reviewerName": "Ann", "reviewText": "Fixed it fast."},
                    {"reviewText": "Great service."},
                    {"reviewerName": "Raj", "reviewText": "Fair price."}
                ]
            },
            {"siteId": "other", "businessName": "Other Plumbing"}
        ]
    }))
    .expect("valid directory fixture")
}

pub fn photo_directory() -> PhotoDirectory {
    serde_json::from_value(json!({
        "businessPhotoContent": {
            "abc": {
                "heroSection": [
                    {"imageIndex": "https://img/hero-1.jpg", "callToAction": "Call now"},
                    {"imageIndex": "https://img/hero-2.jpg", "callToAction": "Same-day service"},
                    {"imageIndex": "https://img/hero-3.jpg"}
                ],
                "aboutUsSection": [
                    {"imageIndex": "https://img/about-1.jpg", "description": "Our van"},
                    {"imageIndex": "https://img/broken.jpg"},
                    {"imageIndex": "https://img/about-3.jpg"}
                ]
            }
        }
    }))
    .expect("valid photo fixture")
}

pub fn datasets() -> Datasets {
    Datasets {
        directory: directory(),
        photos: Some(photo_directory()),
    }
}

/// Loader that fails for the listed URLs and accepts everything else.
pub struct StubImages {
    broken: HashSet<String>,
}

impl StubImages {
    pub fn failing(urls: &[&str]) -> Rc<Self> {
        Rc::new(Self {
            broken: urls.iter().map(|u| (*u).to_owned()).collect(),
        })
    }
}

impl ImageLoader for StubImages {
    fn load<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), ImageError>> {
        let result = if self.broken.contains(url) {
            Err(ImageError::UnexpectedStatus {
                url: url.to_owned(),
                status: 404,
            })
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }
}

pub fn session(options: HydrationOptions, loader: Rc<StubImages>) -> PageSession {
    PageSession::new(page(), options, loader, FOLD)
}
