use crate::options::HydrationOptions;

pub const DEFAULT_DATASET_URL: &str =
    "https://raw.githubusercontent.com/greekfreek23/alabamaplumbersnowebsite/main/finalWebsiteData.json";
pub const DEFAULT_PHOTO_URL: &str =
    "https://raw.githubusercontent.com/greekfreek23/alabamaplumbersnowebsite/main/data/businessPhotoContent.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub dataset_url: String,
    pub photo_url: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub hydration: HydrationOptions,
}
