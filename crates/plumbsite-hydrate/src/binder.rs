//! Writes a business record into the page's marker elements.

use plumbsite_core::BusinessRecord;
use plumbsite_dom::{Document, NodeId};

pub const DEFAULT_BUSINESS_NAME: &str = "Business Name Not Found";
pub const DEFAULT_TITLE_NAME: &str = "Plumbing Services";
pub const DEFAULT_TAGLINE: &str = "Your Trusted Plumber";
pub const TITLE_ELEMENT_ID: &str = "dynamic-title";

/// What one [`FieldBinding`] writes into each matched element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    /// Text, plus `href=tel:<digits>` on anchors.
    Phone(String),
    /// Text, plus `href=mailto:<address>` on anchors.
    Email(String),
    Image { src: String, alt: String },
    Href(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub selector: String,
    pub value: BindValue,
}

impl FieldBinding {
    fn new(selector: &str, value: BindValue) -> Self {
        Self {
            selector: selector.to_owned(),
            value,
        }
    }
}

/// Outcome of a binding pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindReport {
    /// Elements written, counted once per binding that touched them.
    pub elements: usize,
    /// Selectors the document rejected; their bindings were skipped.
    pub failed_selectors: Vec<String>,
}

fn present(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|v| !v.is_empty())
}

fn text_or<'a>(value: Option<&'a String>, default: &'a str) -> String {
    present(value).unwrap_or(default).to_owned()
}

/// The marker table for `record`.
///
/// Logo and review-link bindings are omitted when the record has no value
/// for them, so template placeholders stay in place.
#[must_use]
pub fn field_bindings(record: &BusinessRecord) -> Vec<FieldBinding> {
    let mut bindings = vec![
        FieldBinding::new(
            "[data-business-name]",
            BindValue::Text(text_or(
                record.business_name.as_ref(),
                DEFAULT_BUSINESS_NAME,
            )),
        ),
        FieldBinding::new(
            "[data-phone]",
            BindValue::Phone(text_or(record.phone.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-email]",
            BindValue::Email(text_or(record.email.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-rating]",
            BindValue::Text(text_or(record.rating.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-reviews], [data-review-count]",
            BindValue::Text(text_or(record.reviews_count.as_ref(), "0")),
        ),
        FieldBinding::new(
            "[data-city]",
            BindValue::Text(text_or(record.city.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-state]",
            BindValue::Text(text_or(record.state.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-street]",
            BindValue::Text(text_or(record.street.as_ref(), "")),
        ),
        FieldBinding::new(
            "[data-zip]",
            BindValue::Text(text_or(record.postal_code.as_ref(), "")),
        ),
    ];

    if let Some(logo) = present(record.logo.as_ref()) {
        let name = present(record.business_name.as_ref()).unwrap_or("Business");
        bindings.push(FieldBinding::new(
            "[data-logo]",
            BindValue::Image {
                src: logo.to_owned(),
                alt: format!("{name} Logo"),
            },
        ));
    }
    if let Some(link) = present(record.reviews_link.as_ref()) {
        bindings.push(FieldBinding::new(
            "[data-reviewlink]",
            BindValue::Href(link.to_owned()),
        ));
    }

    bindings.push(FieldBinding::new(
        "[data-about-content]",
        BindValue::Text(text_or(record.about_us.as_ref(), "")),
    ));
    bindings
}

/// Runs `apply` on every element matching `selector`.
///
/// A selector the document rejects is logged and reported as `None`; it
/// never aborts the surrounding pass.
pub fn for_each_match(
    doc: &mut Document,
    selector: &str,
    mut apply: impl FnMut(&mut Document, NodeId),
) -> Option<usize> {
    let nodes = match doc.query_selector_all(selector) {
        Ok(nodes) => nodes,
        Err(err) => {
            tracing::warn!(selector, error = %err, "skipping binding with invalid selector");
            return None;
        }
    };
    for node in &nodes {
        apply(doc, *node);
    }
    Some(nodes.len())
}

fn write_value(doc: &mut Document, node: NodeId, value: &BindValue) {
    let is_anchor = doc.tag_name(node) == Some("a");
    match value {
        BindValue::Text(text) => doc.set_text_content(node, text),
        BindValue::Phone(phone) => {
            doc.set_text_content(node, phone);
            if is_anchor {
                let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
                doc.set_attr(node, "href", &format!("tel:{digits}"));
            }
        }
        BindValue::Email(email) => {
            doc.set_text_content(node, email);
            if is_anchor {
                doc.set_attr(node, "href", &format!("mailto:{email}"));
            }
        }
        BindValue::Image { src, alt } => {
            doc.set_attr(node, "src", src);
            doc.set_attr(node, "alt", alt);
        }
        BindValue::Href(href) => doc.set_attr(node, "href", href),
    }
}

/// Applies `bindings` in order. Bindings whose selector matches nothing are
/// silent no-ops.
pub fn apply_bindings(doc: &mut Document, bindings: &[FieldBinding]) -> BindReport {
    let mut report = BindReport::default();
    for binding in bindings {
        match for_each_match(doc, &binding.selector, |doc, node| {
            write_value(doc, node, &binding.value);
        }) {
            Some(count) => report.elements += count,
            None => report.failed_selectors.push(binding.selector.clone()),
        }
    }
    report
}

/// `<name> - <tagline>` with the stock fallbacks.
#[must_use]
pub fn page_title(record: &BusinessRecord) -> String {
    format!(
        "{} - {}",
        present(record.business_name.as_ref()).unwrap_or(DEFAULT_TITLE_NAME),
        present(record.tagline.as_ref()).unwrap_or(DEFAULT_TAGLINE),
    )
}

/// Writes `title` into `#dynamic-title` when the template has one,
/// otherwise into the document title.
pub fn write_title(doc: &mut Document, title: &str) {
    match doc.get_element_by_id(TITLE_ELEMENT_ID) {
        Some(node) => doc.set_text_content(node, title),
        None => doc.set_title(title),
    }
}

/// Sets the theme custom properties on the root element.
///
/// The record's `secondaryColor` drives `--primary-color` and its
/// `primaryColor` drives `--accent-color`; the template's stylesheet was
/// written against that pairing.
pub fn apply_theme(doc: &mut Document, record: &BusinessRecord) {
    let Some(root) = doc.document_element() else {
        return;
    };
    if let Some(color) = present(record.secondary_color.as_ref()) {
        doc.set_style_property(root, "--primary-color", color);
    }
    if let Some(color) = present(record.primary_color.as_ref()) {
        doc.set_style_property(root, "--accent-color", color);
    }
}

/// Full binding pass: theme, marker table, then title.
pub fn bind_record(doc: &mut Document, record: &BusinessRecord) -> BindReport {
    apply_theme(doc, record);
    let report = apply_bindings(doc, &field_bindings(record));
    write_title(doc, &page_title(record));
    tracing::debug!(
        elements = report.elements,
        failed = report.failed_selectors.len(),
        "record bound"
    );
    report
}

#[cfg(test)]
#[path = "binder_test.rs"]
mod tests;
