//! Lenient deserializers for the shared dataset.
//!
//! The business list is hand-maintained JSON: numeric fields such as
//! `rating` show up both as `"4.8"` and `4.8`, optional arrays are sometimes
//! `null`, and review lists occasionally contain stray non-object entries.
//! These helpers absorb that drift so one odd record never fails the whole
//! document.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::model::Review;

/// Renders a scalar JSON value as display text.
///
/// Strings pass through, numbers and booleans use their JSON spelling.
/// Empty strings, `null`, arrays and objects collapse to `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_text))
}

pub(crate) fn lenient_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_text(deserializer).map(Option::unwrap_or_default)
}

pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Keeps only the review entries that are JSON objects.
pub(crate) fn lenient_reviews<'de, D>(deserializer: D) -> Result<Vec<Review>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|entry| serde_json::from_value::<Review>(entry).ok())
        .collect())
}
