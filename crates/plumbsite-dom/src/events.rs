use std::fmt;
use std::rc::Rc;

use crate::document::{Document, NodeId};

/// Events the page template wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseEnter,
    MouseLeave,
    TouchStart,
    TouchEnd,
}

/// A shared event handler. Handlers receive the document mutably and the
/// node the event was dispatched on.
#[derive(Clone)]
pub struct Listener(Rc<dyn Fn(&mut Document, NodeId)>);

impl Listener {
    pub fn new(handler: impl Fn(&mut Document, NodeId) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    pub(crate) fn call(&self, doc: &mut Document, node: NodeId) {
        (self.0)(doc, node);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Listener(..)")
    }
}
