pub mod app_config;
pub mod config;
mod de;
pub mod error;
pub mod identifier;
pub mod locate;
pub mod model;
pub mod options;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use identifier::{query_param, resolve_identifier, slugify, IdentifierMode, LookupKey};
pub use locate::{attach_photos, locate_record, project_photos, resolve_record};
pub use model::{
    AboutEntry, AboutImage, BusinessDirectory, BusinessRecord, HeroEntry, HeroImage,
    PhotoContent, PhotoDirectory, Photos, Review,
};
pub use options::HydrationOptions;
