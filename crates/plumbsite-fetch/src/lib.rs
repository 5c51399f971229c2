pub mod client;
pub mod error;

pub use client::{DatasetClient, DatasetUrls, Datasets};
pub use error::FetchError;
