//! Deferred widget start-up driven by section visibility.

use std::collections::{BTreeMap, HashSet};

use plumbsite_dom::{Document, NodeId, Rect, Viewport};

/// Minimum visible fraction that counts as "scrolled into view".
pub const VISIBILITY_THRESHOLD: f64 = 0.1;

pub const SECTION_SELECTOR: &str = "section[id]";

/// Tracks which `section[id]` elements still wait for their first
/// appearance.
///
/// A section is reported at most once: the first time it is seen it is
/// recorded as initialized and no longer observed.
#[derive(Debug)]
pub struct VisibilityScheduler {
    threshold: f64,
    observed: BTreeMap<String, NodeId>,
    initialized: HashSet<String>,
}

impl Default for VisibilityScheduler {
    fn default() -> Self {
        Self::new(VISIBILITY_THRESHOLD)
    }
}

impl VisibilityScheduler {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            observed: BTreeMap::new(),
            initialized: HashSet::new(),
        }
    }

    /// Starts observing every `section[id]` not yet initialized. Returns the
    /// number of sections now observed.
    pub fn observe_sections(&mut self, doc: &Document) -> usize {
        for node in doc.query_selector_all(SECTION_SELECTOR).unwrap_or_default() {
            let Some(id) = doc.id(node).filter(|id| !id.is_empty()) else {
                continue;
            };
            if !self.initialized.contains(id) {
                self.observed.entry(id.to_owned()).or_insert(node);
            }
        }
        self.observed.len()
    }

    /// Claims sections already on screen at load, without waiting for a
    /// visibility change. Any overlap with the viewport counts.
    pub fn initial_pass(&mut self, doc: &Document, viewport: Viewport) -> Vec<String> {
        self.claim_where(doc, |rect| viewport.contains(rect))
    }

    /// Claims observed sections whose visible fraction reaches the
    /// threshold.
    pub fn on_viewport_change(&mut self, doc: &Document, viewport: Viewport) -> Vec<String> {
        let threshold = self.threshold;
        self.claim_where(doc, |rect| {
            viewport.contains(rect) && viewport.intersection_ratio(rect) >= threshold
        })
    }

    fn claim_where(
        &mut self,
        doc: &Document,
        visible: impl Fn(Rect) -> bool,
    ) -> Vec<String> {
        let hits: Vec<String> = self
            .observed
            .iter()
            .filter(|(_, node)| doc.is_connected(**node))
            .filter(|(_, node)| doc.bounding_rect(**node).is_some_and(&visible))
            .map(|(id, _)| id.clone())
            .collect();
        hits.into_iter().filter(|id| self.mark_initialized(id)).collect()
    }

    /// Records `id` as initialized and stops observing it. Returns `false`
    /// if it already was.
    pub fn mark_initialized(&mut self, id: &str) -> bool {
        self.observed.remove(id);
        self.initialized.insert(id.to_owned())
    }

    #[must_use]
    pub fn is_observing(&self, id: &str) -> bool {
        self.observed.contains_key(id)
    }

    #[must_use]
    pub fn is_initialized(&self, id: &str) -> bool {
        self.initialized.contains(id)
    }
}
