use plumbsite_dom::Document;

use crate::binder::write_title;

pub const OVERLAY_ID: &str = "plumbsite-error";
pub const ERROR_TITLE: &str = "Error - Plumbing Services";

const OVERLAY_STYLE: &str = "position: fixed; top: 50%; left: 50%; \
    transform: translate(-50%, -50%); background: white; padding: 20px; \
    border-radius: 5px; box-shadow: 0 0 10px rgba(0,0,0,0.2); z-index: 9999;";

/// Appends the "reload the page" overlay to `<body>` and switches the
/// title to [`ERROR_TITLE`]. Returns `false` if the overlay is already up.
pub fn show_error_overlay(doc: &mut Document) -> bool {
    if doc.get_element_by_id(OVERLAY_ID).is_some() {
        return false;
    }
    if let Some(body) = doc.body() {
        let overlay = doc.create_element("div");
        doc.set_attr(overlay, "id", OVERLAY_ID);
        doc.set_attr(overlay, "style", OVERLAY_STYLE);

        let heading = doc.create_element("h3");
        doc.set_attr(heading, "style", "color: red; margin: 0 0 10px 0;");
        doc.set_text_content(heading, "Error Loading Data");
        let message = doc.create_element("p");
        doc.set_attr(message, "style", "margin: 0;");
        doc.set_text_content(message, "Please refresh the page to try again.");

        doc.append_child(overlay, heading);
        doc.append_child(overlay, message);
        doc.append_child(body, overlay);
    }
    write_title(doc, ERROR_TITLE);
    true
}
