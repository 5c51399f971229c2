//! Offline hydration of a template file.
//!
//! There is no layout engine here: each `section[id]` is stacked
//! `--section-height` pixels tall in document order, which is enough to
//! drive the lazy section widgets with `--scroll-to`.

use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use plumbsite_core::AppConfig;
use plumbsite_dom::{parse_html, to_html, Document, Page, Rect, Viewport};
use plumbsite_fetch::DatasetClient;
use plumbsite_hydrate::{dataset_urls, AssumeLoaded, HttpImageLoader, ImageLoader, PageSession};

use crate::PreviewArgs;

/// Stacks every `section[id]` top to bottom. Returns the number laid out.
pub(crate) fn stack_sections(doc: &mut Document, section_height: f64) -> usize {
    let sections = doc.query_selector_all("section[id]").unwrap_or_default();
    let mut top = 0.0;
    for section in &sections {
        doc.set_layout(*section, Rect::new(top, section_height));
        top += section_height;
    }
    sections.len()
}

/// Hydrates `args.template` and writes the resulting HTML.
///
/// # Errors
///
/// Returns an error if the template cannot be read, a client cannot be
/// built, hydration fails, or the output cannot be written.
pub(crate) async fn run_preview(config: &AppConfig, args: &PreviewArgs) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(&args.template)
        .with_context(|| format!("failed to read template {}", args.template.display()))?;
    let mut doc = parse_html(&source);
    let sections = stack_sections(&mut doc, args.section_height);
    tracing::debug!(sections, "template laid out");

    let loader: Rc<dyn ImageLoader> = if args.offline_images {
        Rc::new(AssumeLoaded)
    } else {
        Rc::new(
            HttpImageLoader::new(config.request_timeout_secs, &config.user_agent)
                .context("failed to build image loader")?,
        )
    };
    let client = DatasetClient::new(config.request_timeout_secs, &config.user_agent)
        .context("failed to build dataset client")?;

    let options = args.options(&config.hydration);
    let urls = dataset_urls(&options, &config.dataset_url, &config.photo_url);
    let viewport = Viewport::new(0.0, args.viewport_height);
    let mut session = PageSession::new(Page::new(doc), options, loader, viewport);

    let outcome = session.load(&client, &urls, &args.query).await;
    match &outcome {
        Ok(report) => {
            for y in &args.scroll_to {
                let started = session.on_viewport(viewport.scrolled_to(*y)).await;
                tracing::info!(scroll_y = y, ?started, "scrolled");
            }
            if args.run_for > 0 {
                tokio::time::sleep(Duration::from_secs(args.run_for)).await;
            }
            eprintln!(
                "hydrated {} ({} elements bound, hero {}, sections {:?})",
                report.site_id,
                report.bind.elements,
                if report.hero_started { "running" } else { "idle" },
                report.sections_started,
            );
        }
        // The page still gets written so the overlay can be inspected.
        Err(err) => eprintln!("hydration failed: {err}"),
    }
    session.teardown();

    let html = session.page().read(to_html);
    match &args.out {
        Some(path) => std::fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{html}"),
    }

    outcome.map(|_| ()).map_err(Into::into)
}
