//! Page hydration: binds a business record into a page template and runs
//! the page's widgets.
//!
//! [`PageSession`] drives one page load. The pieces it composes
//! ([`binder`], [`widgets`], [`visibility`], [`timers`]) are usable on
//! their own.

pub mod binder;
pub mod error;
pub mod images;
pub mod overlay;
pub mod session;
pub mod timers;
pub mod tokens;
pub mod visibility;
pub mod widgets;

pub use binder::{bind_record, BindReport};
pub use error::HydrateError;
pub use images::{AssumeLoaded, HttpImageLoader, ImageError, ImageLoader, Preload};
pub use session::{dataset_urls, HydrationReport, PageSession};
pub use timers::{TimerId, TimerRegistry};
pub use visibility::VisibilityScheduler;
pub use widgets::{AboutSlider, HeroCarousel, ReviewsTicker, WidgetState};
