use plumbsite_core::CoreError;
use plumbsite_fetch::FetchError;
use thiserror::Error;

/// Terminal conditions that stop a page load before any widget starts.
#[derive(Debug, Error)]
pub enum HydrateError {
    #[error("no ?{param}= provided in the page URL")]
    MissingIdentifier { param: String },

    #[error("dataset fetch failed: {0}")]
    Fetch(#[source] FetchError),

    #[error("dataset parse failed: {0}")]
    Parse(#[source] FetchError),

    #[error("no matching business found for: {key}")]
    RecordNotFound { key: String },
}

impl HydrateError {
    /// Whether the visitor-facing reload overlay applies.
    ///
    /// A missing identifier leaves the page untouched; every other failure
    /// happens after the visitor asked for a specific business.
    #[must_use]
    pub fn shows_overlay(&self) -> bool {
        !matches!(self, HydrateError::MissingIdentifier { .. })
    }
}

impl From<FetchError> for HydrateError {
    fn from(err: FetchError) -> Self {
        if err.is_parse_failure() {
            HydrateError::Parse(err)
        } else {
            HydrateError::Fetch(err)
        }
    }
}

impl From<CoreError> for HydrateError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MissingIdentifier { param } => HydrateError::MissingIdentifier { param },
            CoreError::RecordNotFound { key } => HydrateError::RecordNotFound { key },
        }
    }
}
