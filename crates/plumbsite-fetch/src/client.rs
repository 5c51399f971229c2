//! HTTP client for the shared business dataset and photo-content documents.

use std::time::Duration;

use plumbsite_core::{BusinessDirectory, PhotoDirectory};
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;

/// Where the page's two JSON documents live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetUrls {
    pub dataset: String,
    /// `None` when the page does not merge photo content.
    pub photos: Option<String>,
}

/// The fetched, parsed documents for one page load.
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub directory: BusinessDirectory,
    pub photos: Option<PhotoDirectory>,
}

/// Fetches the page's JSON documents.
///
/// Non-2xx statuses and undecodable bodies are typed errors. Nothing is
/// retried: a failed page load stays failed until the visitor reloads.
pub struct DatasetClient {
    client: Client,
}

impl DatasetClient {
    /// Creates a `DatasetClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches the business list and, when requested, the photo document.
    ///
    /// Both requests run concurrently and the join fails fast: the first
    /// error is returned and the other request's result is discarded.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Self::fetch_json`].
    pub async fn fetch_datasets(&self, urls: &DatasetUrls) -> Result<Datasets, FetchError> {
        match &urls.photos {
            Some(photo_url) => {
                let (directory, photos) = tokio::try_join!(
                    self.fetch_json::<BusinessDirectory>(&urls.dataset, "business dataset"),
                    self.fetch_json::<PhotoDirectory>(photo_url, "photo content"),
                )?;
                tracing::debug!(
                    businesses = directory.businesses.len(),
                    photo_entries = photos.content.len(),
                    "datasets fetched"
                );
                Ok(Datasets {
                    directory,
                    photos: Some(photos),
                })
            }
            None => {
                let directory = self
                    .fetch_json::<BusinessDirectory>(&urls.dataset, "business dataset")
                    .await?;
                tracing::debug!(businesses = directory.businesses.len(), "dataset fetched");
                Ok(Datasets {
                    directory,
                    photos: None,
                })
            }
        }
    }

    /// Issues one `GET` and decodes the body as `T`.
    ///
    /// `context` names the document in deserialization errors.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidUrl`]: `url` does not parse.
    /// - [`FetchError::Http`]: network, TLS or timeout failure.
    /// - [`FetchError::UnexpectedStatus`]: any non-2xx status.
    /// - [`FetchError::Deserialize`]: body is not JSON of the expected shape.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<T, FetchError> {
        let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| FetchError::Deserialize {
            context: format!("{context} from {url}"),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
