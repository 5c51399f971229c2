//! Turns the page's query string into a record lookup key.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;

use crate::error::CoreError;

static NON_ALNUM_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

/// How the lookup key in the URL relates to a record's `siteId`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierMode {
    /// Opaque platform identifier, used verbatim (`?place_id=ChIJ...`).
    #[default]
    Raw,
    /// Free-text site name, slugified before lookup (`?site=Joe's Plumbing`).
    Slug,
}

impl fmt::Display for IdentifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierMode::Raw => write!(f, "raw"),
            IdentifierMode::Slug => write!(f, "slug"),
        }
    }
}

impl FromStr for IdentifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(IdentifierMode::Raw),
            "slug" => Ok(IdentifierMode::Slug),
            other => Err(format!("unknown identifier mode \"{other}\" (expected raw or slug)")),
        }
    }
}

/// A resolved key, ready for [`crate::locate::locate_record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupKey {
    pub mode: IdentifierMode,
    pub value: String,
}

impl fmt::Display for LookupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Returns the decoded value of the first `name` parameter in `query`.
///
/// Accepts the query with or without its leading `?` and decodes it the way
/// `URLSearchParams` does: `+` is a space and `%XX` escapes are expanded
/// (invalid UTF-8 is replaced rather than rejected).
#[must_use]
pub fn query_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(key, _)| decode_component(key) == name)
        .map(|(_, value)| decode_component(value))
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Extracts the lookup key for `mode` from the page's query string.
///
/// # Errors
///
/// Returns [`CoreError::MissingIdentifier`] when `param` is absent or
/// empty, or when a slug-mode value slugifies to nothing. A raw value is
/// used exactly as decoded, surrounding whitespace included.
pub fn resolve_identifier(
    query: &str,
    mode: IdentifierMode,
    param: &str,
) -> Result<LookupKey, CoreError> {
    let missing = || CoreError::MissingIdentifier {
        param: param.to_owned(),
    };

    let raw = query_param(query, param).ok_or_else(missing)?;
    let value = match mode {
        IdentifierMode::Raw => raw,
        IdentifierMode::Slug => slugify(&raw),
    };

    if value.is_empty() {
        return Err(missing());
    }
    Ok(LookupKey { mode, value })
}

/// Normalizes a free-text site name into a URL slug.
///
/// Lowercases, drops apostrophes, collapses every run of characters outside
/// `[a-z0-9]` into one `-`, and trims leading and trailing hyphens.
/// `slugify(slugify(s)) == slugify(s)` for every input.
#[must_use]
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase().replace(['\'', '\u{2019}'], "");
    NON_ALNUM_RUN
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_owned()
}
