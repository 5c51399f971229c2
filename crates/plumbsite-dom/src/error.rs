use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("unsupported selector \"{selector}\": {reason}")]
    UnsupportedSelector { selector: String, reason: String },
}
