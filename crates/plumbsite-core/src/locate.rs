//! Record lookup and the one-shot photo merge.

use crate::error::CoreError;
use crate::identifier::{IdentifierMode, LookupKey};
use crate::model::{AboutImage, BusinessRecord, HeroImage, PhotoContent, PhotoDirectory, Photos};

fn matches_key(record: &BusinessRecord, key: &LookupKey) -> bool {
    match key.mode {
        IdentifierMode::Raw => record.site_id == key.value,
        IdentifierMode::Slug => record.site_id.to_lowercase() == key.value.to_lowercase(),
    }
}

/// Finds the record whose `siteId` matches `key`.
///
/// Raw keys compare exactly; slug keys compare case-insensitively. When the
/// dataset violates uniqueness the first match wins.
///
/// # Errors
///
/// Returns [`CoreError::RecordNotFound`] when no record matches.
pub fn locate_record<'a>(
    businesses: &'a [BusinessRecord],
    key: &LookupKey,
) -> Result<&'a BusinessRecord, CoreError> {
    record_index(businesses, key).map(|index| &businesses[index])
}

fn record_index(businesses: &[BusinessRecord], key: &LookupKey) -> Result<usize, CoreError> {
    businesses
        .iter()
        .position(|record| matches_key(record, key))
        .ok_or_else(|| CoreError::RecordNotFound {
            key: key.value.clone(),
        })
}

/// Projects raw photo content into the shape the widgets consume.
///
/// Missing call-to-action and description text default to `""`.
#[must_use]
pub fn project_photos(content: &PhotoContent) -> Photos {
    Photos {
        hero_images: content
            .hero_section
            .iter()
            .map(|entry| HeroImage {
                image_url: entry.image_index.clone().unwrap_or_default(),
                call_to_action: entry.call_to_action.clone().unwrap_or_default(),
            })
            .collect(),
        about_us_images: content
            .about_us_section
            .iter()
            .map(|entry| AboutImage {
                url: entry.image_index.clone().unwrap_or_default(),
                description: entry.description.clone().unwrap_or_default(),
            })
            .collect(),
    }
}

/// Attaches photo content for `record` from the photo document.
///
/// Content is looked up by the record's own `siteId`, so slug lookups that
/// matched case-insensitively still find their photos. A `photos` field that
/// is already present is never replaced.
///
/// Returns `true` when photos were attached.
pub fn attach_photos(record: &mut BusinessRecord, photo_doc: &PhotoDirectory) -> bool {
    if record.photos.is_some() {
        return false;
    }
    let Some(content) = photo_doc.content.get(&record.site_id) else {
        return false;
    };
    record.photos = Some(project_photos(content));
    true
}

/// Locates the record for `key` and merges photo content into it.
///
/// Consumes the business list; the returned record is the single merged
/// entity the page works from.
///
/// # Errors
///
/// Returns [`CoreError::RecordNotFound`] when no record matches.
pub fn resolve_record(
    mut businesses: Vec<BusinessRecord>,
    photo_doc: Option<&PhotoDirectory>,
    key: &LookupKey,
) -> Result<BusinessRecord, CoreError> {
    let index = record_index(&businesses, key)?;
    let mut record = businesses.swap_remove(index);

    if let Some(photo_doc) = photo_doc {
        attach_photos(&mut record, photo_doc);
    }
    Ok(record)
}
