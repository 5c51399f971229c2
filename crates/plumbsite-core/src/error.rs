use thiserror::Error;

/// Terminal conditions raised while turning a page URL into a business record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// The query string carried no usable value for the lookup parameter.
    #[error("no ?{param}= provided in the page URL")]
    MissingIdentifier { param: String },

    #[error("no matching business found for: {key}")]
    RecordNotFound { key: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
