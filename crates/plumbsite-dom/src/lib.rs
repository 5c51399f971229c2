//! In-memory page model that the hydration pipeline writes into.
//!
//! [`Document`] is an arena of nodes with the handful of browser DOM
//! operations the pipeline needs: a selector subset, attributes, classes,
//! `data-*` access, inline style properties, listeners, and layout
//! rectangles for visibility checks. [`Page`] is the shared, single-threaded
//! handle that widgets and timers hold.

pub mod document;
pub mod error;
pub mod events;
pub mod html;
pub mod layout;
pub mod page;
pub mod selector;

pub use document::{Document, NodeId};
pub use error::DomError;
pub use events::{EventKind, Listener};
pub use html::{parse_html, to_html};
pub use layout::{Rect, Viewport};
pub use page::Page;
pub use selector::Selector;
