//! Image preloading for the carousels.
//!
//! A slide only shows an image that actually loaded. Loads run
//! concurrently and never fail as a group: each one resolves to
//! [`Preload::Loaded`] or [`Preload::Skipped`].

use std::time::Duration;

use futures::future::{join_all, LocalBoxFuture};
use reqwest::Client;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("empty image URL")]
    EmptyUrl,

    #[error("image request failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("image {url} returned HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    #[error("{url} is not an image (content-type {content_type})")]
    NotAnImage { url: String, content_type: String },
}

/// Something that can confirm an image URL is loadable.
pub trait ImageLoader {
    fn load<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), ImageError>>;
}

/// Per-item outcome of a preload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preload<T> {
    Loaded(T),
    Skipped,
}

impl<T> Preload<T> {
    pub fn loaded(self) -> Option<T> {
        match self {
            Preload::Loaded(item) => Some(item),
            Preload::Skipped => None,
        }
    }
}

/// Preloads every item's image concurrently, preserving input order.
pub async fn preload_all<T>(
    loader: &dyn ImageLoader,
    items: Vec<T>,
    url_of: impl Fn(&T) -> &str,
) -> Vec<Preload<T>> {
    let url_of = &url_of;
    join_all(items.into_iter().map(|item| async move {
        let url = url_of(&item);
        if url.is_empty() {
            return Preload::Skipped;
        }
        let outcome = loader.load(url).await;
        match outcome {
            Ok(()) => Preload::Loaded(item),
            Err(err) => {
                tracing::warn!(error = %err, "skipping image that failed to load");
                Preload::Skipped
            }
        }
    }))
    .await
}

/// Loads images over HTTP and accepts any 2xx response whose content type
/// is `image/*` (or unspecified).
pub struct HttpImageLoader {
    client: Client,
}

impl HttpImageLoader {
    /// # Errors
    ///
    /// Returns the builder error if the `reqwest::Client` cannot be built.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: &str) -> Result<(), ImageError> {
        if url.trim().is_empty() {
            return Err(ImageError::EmptyUrl);
        }
        let http = |source: reqwest::Error| ImageError::Http {
            url: url.to_owned(),
            source,
        };
        let response = self.client.get(url).send().await.map_err(http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::UnexpectedStatus {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_ascii_lowercase);
        if let Some(content_type) = content_type {
            if !content_type.starts_with("image/") {
                return Err(ImageError::NotAnImage {
                    url: url.to_owned(),
                    content_type,
                });
            }
        }
        response.bytes().await.map_err(http)?;
        Ok(())
    }
}

impl ImageLoader for HttpImageLoader {
    fn load<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), ImageError>> {
        Box::pin(self.fetch(url))
    }
}

/// Treats every non-empty URL as loadable. Used by offline previews.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeLoaded;

impl ImageLoader for AssumeLoaded {
    fn load<'a>(&'a self, url: &'a str) -> LocalBoxFuture<'a, Result<(), ImageError>> {
        let result = if url.trim().is_empty() {
            Err(ImageError::EmptyUrl)
        } else {
            Ok(())
        };
        Box::pin(async move { result })
    }
}
