use crate::app_config::{AppConfig, DEFAULT_DATASET_URL, DEFAULT_PHOTO_URL};
use crate::identifier::IdentifierMode;
use crate::options::HydrationOptions;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided lookup function.
///
/// Every setting has a default, so an empty lookup yields the configuration
/// of the `place_id` page. Hosts without a process environment can pass
/// their own lookup (page meta tags, a test map).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unparseable numbers, booleans
/// or identifier modes.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => parse_flag(&raw).ok_or_else(|| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected true/false, got \"{raw}\""),
            }),
        }
    };

    let identifier_mode = or_default("PLUMBSITE_IDENTIFIER_MODE", "raw")
        .parse::<IdentifierMode>()
        .map_err(|reason| ConfigError::InvalidEnvVar {
            var: "PLUMBSITE_IDENTIFIER_MODE".to_string(),
            reason,
        })?;

    let defaults = HydrationOptions::default();
    let hydration = HydrationOptions {
        identifier_mode,
        raw_param: or_default("PLUMBSITE_RAW_PARAM", &defaults.raw_param),
        slug_param: or_default("PLUMBSITE_SLUG_PARAM", &defaults.slug_param),
        merge_photos: parse_bool("PLUMBSITE_MERGE_PHOTOS", defaults.merge_photos)?,
        lazy_widgets: parse_bool("PLUMBSITE_LAZY_WIDGETS", defaults.lazy_widgets)?,
        error_overlay: parse_bool("PLUMBSITE_ERROR_OVERLAY", defaults.error_overlay)?,
        placeholder_tokens: parse_bool(
            "PLUMBSITE_PLACEHOLDER_TOKENS",
            defaults.placeholder_tokens,
        )?,
    };

    Ok(AppConfig {
        log_level: or_default("PLUMBSITE_LOG_LEVEL", "info"),
        dataset_url: or_default("PLUMBSITE_DATASET_URL", DEFAULT_DATASET_URL),
        photo_url: or_default("PLUMBSITE_PHOTO_URL", DEFAULT_PHOTO_URL),
        request_timeout_secs: parse_u64("PLUMBSITE_REQUEST_TIMEOUT_SECS", "30")?,
        user_agent: or_default("PLUMBSITE_USER_AGENT", "plumbsite/0.1 (page-hydration)"),
        hydration,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
