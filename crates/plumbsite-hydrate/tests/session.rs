//! End-to-end hydration of the page template from in-memory datasets.
//!
//! Timer-driven behavior runs on a paused clock inside a `LocalSet`, so
//! the 5-second rotations are observed without real waiting.

mod common;

use std::future::Future;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use plumbsite_core::{HydrationOptions, IdentifierMode, LookupKey};
use plumbsite_dom::{to_html, Document, EventKind, NodeId, Viewport};
use plumbsite_fetch::Datasets;
use plumbsite_hydrate::widgets::hero::SLIDES_SELECTOR;
use plumbsite_hydrate::{HydrateError, PageSession, WidgetState};

use common::{datasets, directory, session, StubImages, FOLD};

async fn local<F: Future>(future: F) -> F::Output {
    tokio::task::LocalSet::new().run_until(future).await
}

fn key(value: &str) -> LookupKey {
    LookupKey {
        mode: IdentifierMode::Raw,
        value: value.to_owned(),
    }
}

fn texts(doc: &Document, selector: &str) -> Vec<String> {
    doc.query_selector_all(selector)
        .unwrap()
        .into_iter()
        .map(|node| doc.text_content(node))
        .collect()
}

fn active_index(doc: &Document, slides: &[NodeId]) -> Vec<usize> {
    slides
        .iter()
        .enumerate()
        .filter(|(_, s)| doc.has_class(**s, "active"))
        .map(|(i, _)| i)
        .collect()
}

fn about_slides(doc: &Document) -> Vec<NodeId> {
    doc.query_selector_all("[data-about-slider] .slide").unwrap()
}

/// Collects formatted log output for assertions.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Binding and lookup
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn binds_record_for_matching_key() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert_eq!(report.site_id, "abc");
        assert!(report.has_photos);
        session.page().read(|doc| {
            assert_eq!(
                texts(doc, "[data-business-name]"),
                vec!["Joe's Plumbing", "Joe's Plumbing"]
            );
            assert_eq!(texts(doc, "[data-rating]"), vec!["4.8"]);
            assert_eq!(doc.title(), "Joe's Plumbing - Your Trusted Plumber");
        });
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn missing_record_leaves_page_untouched_without_overlay() {
    local(async {
        let options = HydrationOptions {
            error_overlay: false,
            ..HydrationOptions::default()
        };
        let mut session = session(options, StubImages::failing(&[]));
        let before = session.page().read(to_html);

        let err = session
            .hydrate_with(datasets(), &key("nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, HydrateError::RecordNotFound { ref key } if key == "nope"));
        assert_eq!(session.page().read(to_html), before);
        assert!(session.record().is_none());
        assert_eq!(session.timers().live_count(), 0);
        assert_eq!(session.hero().state(), WidgetState::Uninitialized);
        assert_eq!(session.reviews().state(), WidgetState::Uninitialized);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn missing_record_is_logged_and_starts_nothing() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let err = session
            .hydrate_with(datasets(), &key("nope"))
            .await
            .unwrap_err();

        assert!(matches!(err, HydrateError::RecordNotFound { .. }));
        assert_eq!(session.timers().live_count(), 0);
        assert_eq!(session.hero().state(), WidgetState::Uninitialized);
        assert_eq!(session.about().state(), WidgetState::Uninitialized);
        assert_eq!(session.reviews().state(), WidgetState::Uninitialized);
    })
    .await;

    let output = logs.contents();
    let line = output
        .lines()
        .find(|line| line.contains("page hydration failed"))
        .unwrap_or_else(|| panic!("no failure line in log output:\n{output}"));
    assert!(line.contains("ERROR"), "{line}");
    assert!(line.contains("no matching business found for: nope"), "{line}");
    assert!(!output.contains("page hydrated"), "{output}");
}

#[tokio::test(start_paused = true)]
async fn missing_record_shows_overlay_when_enabled() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let err = session
            .hydrate_with(datasets(), &key("nope"))
            .await
            .unwrap_err();

        assert!(err.shows_overlay());
        session.page().read(|doc| {
            assert!(doc.get_element_by_id("plumbsite-error").is_some());
            assert_eq!(doc.title(), "Error - Plumbing Services");
        });
        assert_eq!(session.timers().live_count(), 0);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn missing_identifier_is_reported_before_anything_happens() {
    local(async {
        let session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let err = session.resolve_key("?site=joes").unwrap_err();
        assert!(matches!(err, HydrateError::MissingIdentifier { ref param } if param == "place_id"));
        assert!(!err.shows_overlay());
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn without_photo_merge_no_carousel_starts() {
    local(async {
        let options = HydrationOptions {
            merge_photos: false,
            ..HydrationOptions::default()
        };
        let mut session = session(options, StubImages::failing(&[]));
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert!(!report.has_photos);
        assert!(!report.hero_started);
        assert_eq!(session.timers().live_count(), 0);
    })
    .await;
}

// ---------------------------------------------------------------------------
// Hero carousel
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn hero_binds_slots_and_rotates_every_five_seconds() {
    local(async {
        let mut session = session(
            HydrationOptions::default(),
            StubImages::failing(&["https://img/hero-2.jpg"]),
        );
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        assert!(report.hero_started);

        let slides = session
            .page()
            .read(|doc| doc.query_selector_all(SLIDES_SELECTOR).unwrap());
        session.page().read(|doc| {
            assert_eq!(
                doc.style_property(slides[0], "background-image"),
                Some("url('https://img/hero-1.jpg')")
            );
            assert_eq!(doc.style_property(slides[1], "background-image"), None);
            assert_eq!(texts(doc, "[data-hero-cta]"), vec![
                "Call now",
                "Same-day service",
                "Default CTA"
            ]);
            assert_eq!(active_index(doc, &slides), vec![0]);
        });

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(session.page().read(|doc| active_index(doc, &slides)), vec![1]);
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.page().read(|doc| active_index(doc, &slides)), vec![0]);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn hero_stops_when_slides_leave_the_page() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        let timer = session.hero().timer().unwrap();
        assert!(session.timers().is_live(timer));

        session.page().write(|doc| {
            let hero = doc.get_element_by_id("hero").unwrap();
            doc.detach(hero);
        });
        tokio::time::sleep(Duration::from_millis(5_100)).await;

        assert!(!session.timers().is_live(timer));
        assert_eq!(session.hero().state(), WidgetState::Stopped);
    })
    .await;
}

// ---------------------------------------------------------------------------
// Lazy sections
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn sections_below_the_fold_wait_for_visibility() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert!(report.sections_started.is_empty());
        assert_eq!(session.about().state(), WidgetState::Uninitialized);
        assert_eq!(session.reviews().state(), WidgetState::Uninitialized);
        assert_eq!(
            session.page().read(|doc| texts(doc, "[data-about-slider]")),
            vec!["placeholder"]
        );

        let started = session.on_viewport(FOLD.scrolled_to(1000.0)).await;
        assert_eq!(started, vec!["about-us".to_owned()]);
        assert_eq!(session.about().state(), WidgetState::Running);

        let started = session.on_viewport(FOLD.scrolled_to(2000.0)).await;
        assert_eq!(started, vec!["reviewsSection".to_owned()]);

        let again = session.on_viewport(FOLD.scrolled_to(1000.0)).await;
        assert!(again.is_empty());
        assert!(!session.scheduler().is_observing("about-us"));
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn sections_visible_at_load_start_immediately() {
    local(async {
        let mut session = PageSession::new(
            common::page(),
            HydrationOptions::default(),
            StubImages::failing(&[]),
            Viewport::new(0.0, 2200.0),
        );
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert_eq!(
            report.sections_started,
            vec!["about-us".to_owned(), "reviewsSection".to_owned()]
        );
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn eager_mode_starts_every_section() {
    local(async {
        let options = HydrationOptions {
            lazy_widgets: false,
            ..HydrationOptions::default()
        };
        let mut session = session(options, StubImages::failing(&[]));
        let report = session.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert_eq!(
            report.sections_started,
            vec!["about-us".to_owned(), "reviewsSection".to_owned()]
        );
        assert!(session.on_viewport(FOLD.scrolled_to(2000.0)).await.is_empty());
    })
    .await;
}

// ---------------------------------------------------------------------------
// About slider
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn about_slider_drops_broken_images_and_rotates() {
    local(async {
        let mut session = session(
            HydrationOptions::default(),
            StubImages::failing(&["https://img/broken.jpg"]),
        );
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        session.on_viewport(FOLD.scrolled_to(1000.0)).await;

        let slides = session.page().read(about_slides);
        assert_eq!(slides.len(), 2);
        session.page().read(|doc| {
            let imgs = doc.query_selector_all("[data-about-slider] img").unwrap();
            assert_eq!(doc.attr(imgs[0], "src"), Some("https://img/about-1.jpg"));
            assert_eq!(doc.attr(imgs[0], "alt"), Some("Our van"));
            assert_eq!(doc.attr(imgs[1], "src"), Some("https://img/about-3.jpg"));
            assert_eq!(doc.attr(imgs[1], "alt"), Some("About Image 2"));
            assert_eq!(active_index(doc, &slides), vec![0]);
        });
        assert!(session.about().timer().is_some());

        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(session.page().read(|doc| active_index(doc, &slides)), vec![1]);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn about_slider_with_one_valid_image_is_static() {
    local(async {
        let mut session = session(
            HydrationOptions::default(),
            StubImages::failing(&["https://img/broken.jpg", "https://img/about-3.jpg"]),
        );
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        let hero_timers = session.timers().live_count();
        session.on_viewport(FOLD.scrolled_to(1000.0)).await;

        assert_eq!(session.page().read(about_slides).len(), 1);
        assert!(session.about().timer().is_none());
        assert_eq!(session.about().state(), WidgetState::Running);
        assert_eq!(session.timers().live_count(), hero_timers);
    })
    .await;
}

// ---------------------------------------------------------------------------
// Reviews ticker
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn reviews_ticker_renders_replicated_cards() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        session.on_viewport(FOLD.scrolled_to(2000.0)).await;

        session.page().read(|doc| {
            let cards = doc.query_selector_all("#reviewsTrack .review-card").unwrap();
            assert_eq!(cards.len(), 15);
            assert_eq!(doc.style_property(cards[0], "flex"), Some("0 0 300px"));

            let names = texts(doc, ".reviewer-name");
            assert_eq!(&names[..4], ["Ann", "Anonymous", "Raj", "Ann"]);
            assert_eq!(texts(doc, ".review-stars")[0], "★★★★★");

            let track = doc.get_element_by_id("reviewsTrack").unwrap();
            assert_eq!(
                doc.style_property(track, "animation"),
                Some("slide 75s linear infinite")
            );
        });
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn reviews_ticker_pauses_on_hover_and_touch() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        session.on_viewport(FOLD.scrolled_to(2000.0)).await;

        let page = session.page().clone();
        let track = page.read(|doc| doc.get_element_by_id("reviewsTrack").unwrap());
        let play_state =
            || page.read(|doc| doc.style_property(track, "animation-play-state").map(str::to_owned));

        page.dispatch(track, EventKind::MouseEnter);
        assert_eq!(play_state().as_deref(), Some("paused"));
        page.dispatch(track, EventKind::MouseLeave);
        assert_eq!(play_state().as_deref(), Some("running"));
        page.dispatch(track, EventKind::TouchStart);
        assert_eq!(play_state().as_deref(), Some("paused"));
        page.dispatch(track, EventKind::TouchEnd);
        assert_eq!(play_state().as_deref(), Some("running"));
    })
    .await;
}

// ---------------------------------------------------------------------------
// Idempotency and teardown
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn repeated_widget_init_is_a_noop() {
    local(async {
        let options = HydrationOptions {
            lazy_widgets: false,
            ..HydrationOptions::default()
        };
        let mut session = session(options, StubImages::failing(&[]));
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        let timers_before = session.timers().live_count();
        assert_eq!(timers_before, 2);

        let record = session.record().unwrap().clone();
        let photos = record.photos.as_ref().unwrap();
        let loader = StubImages::failing(&[]);
        let page = session.page().clone();

        assert!(
            !session
                .hero()
                .init(&page, session.timers(), loader.as_ref(), &photos.hero_images)
                .await
        );
        assert!(
            !session
                .about()
                .init(&page, session.timers(), loader.as_ref(), &photos.about_us_images)
                .await
        );
        assert!(!session.reviews().init(&page, &record.five_star_reviews));

        assert_eq!(session.timers().live_count(), timers_before);
        page.read(|doc| {
            assert_eq!(about_slides(doc).len(), 3);
            assert_eq!(
                doc.query_selector_all("#reviewsTrack .review-card").unwrap().len(),
                15
            );
        });
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn second_session_on_same_page_does_not_reinitialize() {
    local(async {
        let options = HydrationOptions {
            lazy_widgets: false,
            ..HydrationOptions::default()
        };
        let mut first = session(options.clone(), StubImages::failing(&[]));
        first.hydrate_with(datasets(), &key("abc")).await.unwrap();

        let mut second = PageSession::new(
            first.page().clone(),
            options,
            StubImages::failing(&[]),
            FOLD,
        );
        let report = second.hydrate_with(datasets(), &key("abc")).await.unwrap();

        assert!(!report.hero_started);
        assert!(report.sections_started.is_empty());
        assert_eq!(second.timers().live_count(), 0);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn hydrating_twice_keeps_the_running_carousel() {
    local(async {
        let mut session = session(HydrationOptions::default(), StubImages::failing(&[]));
        let first = session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        let timer = session.hero().timer().unwrap();

        let before = session.page().read(to_html);
        let second = session.hydrate_with(datasets(), &key("other")).await.unwrap();

        assert_eq!(second, first);
        assert_eq!(session.page().read(to_html), before);
        assert_eq!(session.record().unwrap().site_id, "abc");
        assert_eq!(session.hero().state(), WidgetState::Running);
        assert!(session.timers().is_live(timer));
        assert_eq!(session.timers().live_count(), 1);

        let slides = session
            .page()
            .read(|doc| doc.query_selector_all(SLIDES_SELECTOR).unwrap());
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(session.page().read(|doc| active_index(doc, &slides)), vec![1]);
    })
    .await;
}

#[tokio::test(start_paused = true)]
async fn teardown_cancels_every_timer() {
    local(async {
        let options = HydrationOptions {
            lazy_widgets: false,
            ..HydrationOptions::default()
        };
        let mut session = session(options, StubImages::failing(&[]));
        session.hydrate_with(datasets(), &key("abc")).await.unwrap();
        assert_eq!(session.timers().live_count(), 2);

        let slides = session
            .page()
            .read(|doc| doc.query_selector_all(SLIDES_SELECTOR).unwrap());
        session.teardown();

        assert_eq!(session.timers().live_count(), 0);
        assert_eq!(session.hero().state(), WidgetState::Stopped);
        assert_eq!(session.about().state(), WidgetState::Stopped);
        assert_eq!(session.reviews().state(), WidgetState::Stopped);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(session.page().read(|doc| active_index(doc, &slides)), vec![0]);

        session.teardown();
        assert_eq!(session.timers().live_count(), 0);
    })
    .await;
}

// ---------------------------------------------------------------------------
// Slug pages with placeholder tokens
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn slug_mode_substitutes_tokens() {
    local(async {
        let options = HydrationOptions {
            identifier_mode: IdentifierMode::Slug,
            merge_photos: false,
            placeholder_tokens: true,
            ..HydrationOptions::default()
        };
        let page = plumbsite_dom::Page::new(plumbsite_dom::parse_html(
            r#"<html><head><title>{businessName}</title></head>
            <body><p>Call {businessName} at {phone}</p><a href="/{siteId}">home</a></body></html>"#,
        ));
        let mut session = PageSession::new(page, options, StubImages::failing(&[]), FOLD);
        let key = session.resolve_key("?site=ABC").unwrap();
        assert_eq!(key.value, "abc");

        let report = session
            .hydrate_with(
                Datasets {
                    directory: directory(),
                    photos: None,
                },
                &key,
            )
            .await
            .unwrap();

        assert_eq!(report.tokens_replaced, 3);
        session.page().read(|doc| {
            assert_eq!(texts(doc, "p"), vec!["Call Joe's Plumbing at (555) 010-0199"]);
            let a = doc.query_selector("a").unwrap().unwrap();
            assert_eq!(doc.attr(a, "href"), Some("/abc"));
        });
    })
    .await;
}
