//! Dataset shapes for the business list and the photo-content document.
//!
//! ## Business list
//! `{"finalWebsiteData": [record, ...]}`. Each record is keyed by `siteId`.
//! Display fields are rendered verbatim, so they are modeled as
//! `Option<String>` and normalized by [`crate::de`]: `"4.8"` and `4.8` both
//! become `Some("4.8")`, while `""` and `null` become `None`.
//!
//! ## Photo content
//! `{"businessPhotoContent": {"<siteId>": {"heroSection": [...],
//! "aboutUsSection": [...]}}}`. Despite its name, `imageIndex` carries the
//! image URL. This document is only an input to
//! [`crate::locate::attach_photos`]; widgets consume the projected
//! [`Photos`] shape instead.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{lenient_id, lenient_reviews, lenient_text, null_as_default, scalar_text};

/// Top-level business-list document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BusinessDirectory {
    #[serde(
        rename = "finalWebsiteData",
        default,
        deserialize_with = "null_as_default"
    )]
    pub businesses: Vec<BusinessRecord>,
}

/// One business listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    /// Platform identifier, unique within the dataset.
    #[serde(default, deserialize_with = "lenient_id")]
    pub site_id: String,

    #[serde(default, deserialize_with = "lenient_text")]
    pub business_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub rating: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub reviews_count: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub street: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub state: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub postal_code: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub logo: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub reviews_link: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub about_us: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub tagline: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub primary_color: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub secondary_color: Option<String>,

    #[serde(default, deserialize_with = "lenient_reviews")]
    pub five_star_reviews: Vec<Review>,

    /// Present when the dataset already embeds photos, or after
    /// [`crate::locate::attach_photos`] has merged the photo document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Photos>,

    /// Every other field of the record, kept for `{token}` substitution.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BusinessRecord {
    /// All scalar fields of the record keyed by their JSON name.
    ///
    /// Includes both the typed display fields and anything captured in
    /// [`Self::extra`]. Nested values (`photos`, `fiveStarReviews`) are
    /// excluded.
    #[must_use]
    pub fn text_fields(&self) -> BTreeMap<String, String> {
        let typed = [
            ("siteId", Some(self.site_id.clone()).filter(|s| !s.is_empty())),
            ("businessName", self.business_name.clone()),
            ("phone", self.phone.clone()),
            ("email", self.email.clone()),
            ("rating", self.rating.clone()),
            ("reviewsCount", self.reviews_count.clone()),
            ("street", self.street.clone()),
            ("city", self.city.clone()),
            ("state", self.state.clone()),
            ("postalCode", self.postal_code.clone()),
            ("logo", self.logo.clone()),
            ("reviewsLink", self.reviews_link.clone()),
            ("aboutUs", self.about_us.clone()),
            ("tagline", self.tagline.clone()),
            ("primaryColor", self.primary_color.clone()),
            ("secondaryColor", self.secondary_color.clone()),
        ];

        let mut fields: BTreeMap<String, String> = self
            .extra
            .iter()
            .filter_map(|(key, value)| scalar_text(value).map(|text| (key.clone(), text)))
            .collect();
        for (key, value) in typed {
            if let Some(value) = value {
                fields.insert(key.to_owned(), value);
            }
        }
        fields
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, deserialize_with = "lenient_text")]
    pub reviewer_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub review_text: Option<String>,
}

/// Widget-facing photo set attached to a [`BusinessRecord`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Photos {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hero_images: Vec<HeroImage>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub about_us_images: Vec<AboutImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroImage {
    #[serde(default, deserialize_with = "lenient_id")]
    pub image_url: String,

    #[serde(default, deserialize_with = "lenient_id")]
    pub call_to_action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AboutImage {
    #[serde(default, deserialize_with = "lenient_id")]
    pub url: String,

    #[serde(default, deserialize_with = "lenient_id")]
    pub description: String,
}

/// Top-level photo-content document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhotoDirectory {
    #[serde(
        rename = "businessPhotoContent",
        default,
        deserialize_with = "null_as_default"
    )]
    pub content: HashMap<String, PhotoContent>,
}

/// Raw photo content for one business, as stored in the photo document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoContent {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hero_section: Vec<HeroEntry>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub about_us_section: Vec<AboutEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_index: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub call_to_action: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutEntry {
    #[serde(default, deserialize_with = "lenient_text")]
    pub image_index: Option<String>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}
