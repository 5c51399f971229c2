use std::cell::RefCell;
use std::rc::Rc;

use crate::document::{Document, NodeId};
use crate::events::EventKind;

/// Shared handle to the page's document.
///
/// The page is single-threaded: widgets, timers and listeners each hold a
/// clone and borrow the document only inside [`Page::read`] /
/// [`Page::write`], never across an `.await`.
#[derive(Debug, Clone, Default)]
pub struct Page(Rc<RefCell<Document>>);

impl Page {
    #[must_use]
    pub fn new(doc: Document) -> Self {
        Self(Rc::new(RefCell::new(doc)))
    }

    pub fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> R {
        f(&self.0.borrow())
    }

    pub fn write<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        f(&mut self.0.borrow_mut())
    }

    /// Dispatches `kind` on `node`; returns the number of listeners run.
    pub fn dispatch(&self, node: NodeId, kind: EventKind) -> usize {
        self.write(|doc| doc.dispatch(node, kind))
    }
}
