//! Turning a committed crop into pixels.
//!
//! - [`render`]: synchronous crop + rotate (+ circular clip)
//! - [`RenderJob`]: a self-contained render request
//! - [`CroppedImageProvider`]: lazy, cached result for share sheets
//! - `render_in_background`: the same render on tokio's blocking pool
//!   (`background` feature)

mod crop;
mod provider;

#[cfg(feature = "background")]
mod background;

pub use crop::render;
pub(crate) use crop::output_dimensions;
pub use provider::{CroppedImageProvider, PlaceholderItem, RenderJob};

#[cfg(feature = "background")]
pub use background::render_in_background;
