use plumbsite_dom::{EventKind, Listener, Page};

const BOUND_KEY: &str = "navBound";

/// Makes `.hamburger` toggle `active` on `.nav-list`.
///
/// Returns `false` when either element is missing or the toggle was
/// already wired on this page.
pub fn wire_nav_toggle(page: &Page) -> bool {
    page.write(|doc| {
        let hamburger = doc.query_selector(".hamburger").ok().flatten();
        let nav_list = doc.query_selector(".nav-list").ok().flatten();
        let (Some(hamburger), Some(nav_list)) = (hamburger, nav_list) else {
            return false;
        };
        if doc.dataset(hamburger, BOUND_KEY).is_some() {
            return false;
        }
        doc.set_dataset(hamburger, BOUND_KEY, "true");
        doc.add_event_listener(
            hamburger,
            EventKind::Click,
            Listener::new(move |doc, _| {
                doc.toggle_class(nav_list, "active");
            }),
        );
        true
    })
}
