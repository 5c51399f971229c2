use crate::identifier::IdentifierMode;

/// Named switches for the hydration pipeline.
///
/// One pipeline covers every page variant: the `place_id` page that merges
/// photo content and lazily starts its widgets, and the `site` page that
/// only substitutes `{field}` tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HydrationOptions {
    pub identifier_mode: IdentifierMode,
    /// Query parameter carrying a raw identifier.
    pub raw_param: String,
    /// Query parameter carrying a free-text site name.
    pub slug_param: String,
    /// Fetch the photo document and merge it into the record.
    pub merge_photos: bool,
    /// Defer about/reviews widgets until their section scrolls into view.
    pub lazy_widgets: bool,
    /// Render the reload overlay on terminal fetch/lookup failures.
    pub error_overlay: bool,
    /// Replace `{fieldName}` tokens in body text and attributes.
    pub placeholder_tokens: bool,
}

impl HydrationOptions {
    /// Query parameter that [`Self::identifier_mode`] reads.
    #[must_use]
    pub fn identifier_param(&self) -> &str {
        match self.identifier_mode {
            IdentifierMode::Raw => &self.raw_param,
            IdentifierMode::Slug => &self.slug_param,
        }
    }
}

impl Default for HydrationOptions {
    fn default() -> Self {
        Self {
            identifier_mode: IdentifierMode::Raw,
            raw_param: "place_id".to_owned(),
            slug_param: "site".to_owned(),
            merge_photos: true,
            lazy_widgets: true,
            error_overlay: true,
            placeholder_tokens: false,
        }
    }
}
