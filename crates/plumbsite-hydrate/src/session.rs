//! One page load, from query string to running widgets.

use std::rc::Rc;

use plumbsite_core::{resolve_identifier, resolve_record, BusinessRecord, HydrationOptions, LookupKey};
use plumbsite_dom::{Page, Viewport};
use plumbsite_fetch::{DatasetClient, DatasetUrls, Datasets};

use crate::binder::{bind_record, BindReport};
use crate::error::HydrateError;
use crate::images::ImageLoader;
use crate::overlay::show_error_overlay;
use crate::timers::TimerRegistry;
use crate::tokens::substitute_tokens;
use crate::visibility::VisibilityScheduler;
use crate::widgets::{wire_nav_toggle, AboutSlider, HeroCarousel, ReviewsTicker};

pub const REVIEWS_SECTION_ID: &str = "reviewsSection";
pub const ABOUT_SECTION_ID: &str = "about-us";

/// Summary of a successful hydration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HydrationReport {
    pub site_id: String,
    pub bind: BindReport,
    pub tokens_replaced: usize,
    pub has_photos: bool,
    pub hero_started: bool,
    /// Section widgets started during hydration, in start order.
    pub sections_started: Vec<String>,
}

/// Builds the fetch targets for `options`.
#[must_use]
pub fn dataset_urls(options: &HydrationOptions, dataset_url: &str, photo_url: &str) -> DatasetUrls {
    DatasetUrls {
        dataset: dataset_url.to_owned(),
        photos: options.merge_photos.then(|| photo_url.to_owned()),
    }
}

/// Owns everything one page load creates: the resolved record, the
/// widgets, their timers and the visibility scheduler.
///
/// A session hydrates its page once; later `load`/`hydrate_with` calls
/// return the first report without fetching or touching the page. Must be
/// driven from inside a `tokio::task::LocalSet`. Dropping the session
/// cancels its timers.
pub struct PageSession {
    page: Page,
    options: HydrationOptions,
    loader: Rc<dyn ImageLoader>,
    timers: TimerRegistry,
    scheduler: VisibilityScheduler,
    viewport: Viewport,
    record: Option<BusinessRecord>,
    report: Option<HydrationReport>,
    hero: HeroCarousel,
    about: AboutSlider,
    reviews: ReviewsTicker,
}

impl PageSession {
    /// `viewport` is what the visitor sees when the page loads; sections
    /// inside it start without waiting for a scroll.
    #[must_use]
    pub fn new(
        page: Page,
        options: HydrationOptions,
        loader: Rc<dyn ImageLoader>,
        viewport: Viewport,
    ) -> Self {
        Self {
            page,
            options,
            loader,
            timers: TimerRegistry::new(),
            scheduler: VisibilityScheduler::default(),
            viewport,
            record: None,
            report: None,
            hero: HeroCarousel::new(),
            about: AboutSlider::new(),
            reviews: ReviewsTicker::new(),
        }
    }

    /// Resolves the lookup key from `query`, fetches the datasets and
    /// hydrates the page.
    ///
    /// # Errors
    ///
    /// - [`HydrateError::MissingIdentifier`]: nothing fetched, page untouched.
    /// - [`HydrateError::Fetch`] / [`HydrateError::Parse`]: a dataset
    ///   request failed.
    /// - [`HydrateError::RecordNotFound`]: no record matches the key.
    ///
    /// The last three render the error overlay when it is enabled.
    pub async fn load(
        &mut self,
        client: &DatasetClient,
        urls: &DatasetUrls,
        query: &str,
    ) -> Result<HydrationReport, HydrateError> {
        if let Some(report) = self.hydrated() {
            return Ok(report);
        }
        let key = self.resolve_key(query)?;
        tracing::info!(mode = %key.mode, key = %key, "hydrating page");

        let urls = DatasetUrls {
            dataset: urls.dataset.clone(),
            photos: urls.photos.clone().filter(|_| self.options.merge_photos),
        };
        let datasets = client
            .fetch_datasets(&urls)
            .await
            .map_err(|e| self.fail(e.into()))?;
        self.hydrate_with(datasets, &key).await
    }

    /// Resolves the lookup key for the configured identifier mode.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::MissingIdentifier`] when the parameter is
    /// absent or empty.
    pub fn resolve_key(&self, query: &str) -> Result<LookupKey, HydrateError> {
        let param = self.options.identifier_param();
        resolve_identifier(query, self.options.identifier_mode, param).map_err(|err| {
            tracing::warn!(param, "no identifier in page URL; leaving template as-is");
            HydrateError::from(err)
        })
    }

    /// Hydrates from already-fetched datasets.
    ///
    /// # Errors
    ///
    /// Returns [`HydrateError::RecordNotFound`] when no record matches
    /// `key`; no widget starts in that case.
    pub async fn hydrate_with(
        &mut self,
        datasets: Datasets,
        key: &LookupKey,
    ) -> Result<HydrationReport, HydrateError> {
        if let Some(report) = self.hydrated() {
            return Ok(report);
        }
        let photos = datasets.photos.as_ref().filter(|_| self.options.merge_photos);
        let record = resolve_record(datasets.directory.businesses, photos, key)
            .map_err(|e| self.fail(e.into()))?;
        let report = self.apply(record).await;
        self.report = Some(report.clone());
        Ok(report)
    }

    fn hydrated(&self) -> Option<HydrationReport> {
        let report = self.report.clone()?;
        tracing::debug!(site_id = %report.site_id, "page already hydrated; skipping");
        Some(report)
    }

    async fn apply(&mut self, record: BusinessRecord) -> HydrationReport {
        let mut report = HydrationReport {
            site_id: record.site_id.clone(),
            has_photos: record.photos.is_some(),
            ..HydrationReport::default()
        };
        report.bind = self.page.write(|doc| bind_record(doc, &record));
        if self.options.placeholder_tokens {
            let fields = record.text_fields();
            report.tokens_replaced = self.page.write(|doc| substitute_tokens(doc, &fields));
        }
        self.record = Some(record);

        let due: Vec<String> = if self.options.lazy_widgets {
            let scheduler = &mut self.scheduler;
            let viewport = self.viewport;
            self.page.read(|doc| {
                scheduler.observe_sections(doc);
                scheduler.initial_pass(doc, viewport)
            })
        } else {
            [ABOUT_SECTION_ID, REVIEWS_SECTION_ID]
                .into_iter()
                .filter(|id| self.scheduler.mark_initialized(id))
                .map(str::to_owned)
                .collect()
        };
        for id in due {
            if self.start_section(&id).await {
                report.sections_started.push(id);
            }
        }

        wire_nav_toggle(&self.page);

        if let Some(photos) = self.record.as_ref().and_then(|r| r.photos.as_ref()) {
            report.hero_started = self
                .hero
                .init(&self.page, &self.timers, self.loader.as_ref(), &photos.hero_images)
                .await;
        }

        tracing::info!(
            site_id = %report.site_id,
            bound = report.bind.elements,
            hero = report.hero_started,
            sections = ?report.sections_started,
            "page hydrated"
        );
        report
    }

    /// Starts widgets for sections that became visible. Returns the ids of
    /// sections whose widget started.
    pub async fn on_viewport(&mut self, viewport: Viewport) -> Vec<String> {
        self.viewport = viewport;
        if self.record.is_none() || !self.options.lazy_widgets {
            return Vec::new();
        }
        let due = {
            let scheduler = &mut self.scheduler;
            self.page.read(|doc| scheduler.on_viewport_change(doc, viewport))
        };
        let mut started = Vec::new();
        for id in due {
            if self.start_section(&id).await {
                started.push(id);
            }
        }
        started
    }

    async fn start_section(&self, id: &str) -> bool {
        let Some(record) = &self.record else {
            return false;
        };
        let started = match id {
            REVIEWS_SECTION_ID => self.reviews.init(&self.page, &record.five_star_reviews),
            ABOUT_SECTION_ID => match &record.photos {
                Some(photos) => {
                    self.about
                        .init(
                            &self.page,
                            &self.timers,
                            self.loader.as_ref(),
                            &photos.about_us_images,
                        )
                        .await
                }
                None => false,
            },
            _ => false,
        };
        if started {
            tracing::debug!(section = id, "section widget started");
        }
        started
    }

    /// Cancels every timer and stops the widgets. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        self.timers.clear_all();
        self.hero.stop(&self.timers);
        self.about.stop(&self.timers);
        self.reviews.stop(&self.timers);
    }

    fn fail(&self, err: HydrateError) -> HydrateError {
        tracing::error!(error = %err, "page hydration failed");
        if self.options.error_overlay && err.shows_overlay() {
            self.page.write(show_error_overlay);
        }
        err
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn timers(&self) -> &TimerRegistry {
        &self.timers
    }

    #[must_use]
    pub fn record(&self) -> Option<&BusinessRecord> {
        self.record.as_ref()
    }

    #[must_use]
    pub fn hero(&self) -> &HeroCarousel {
        &self.hero
    }

    #[must_use]
    pub fn about(&self) -> &AboutSlider {
        &self.about
    }

    #[must_use]
    pub fn reviews(&self) -> &ReviewsTicker {
        &self.reviews
    }

    #[must_use]
    pub fn scheduler(&self) -> &VisibilityScheduler {
        &self.scheduler
    }
}

impl Drop for PageSession {
    fn drop(&mut self) {
        self.timers.clear_all();
    }
}
