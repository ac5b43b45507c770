//! Cropkit Core - Interactive image cropping engine
//!
//! This crate provides the geometry and state behind an image-cropping UI:
//! a resizable crop box over a zoomable, pannable image, quarter-turn
//! rotation, aspect-ratio constraints, reset tracking, and the final crop
//! render. It does no drawing; hosts forward gestures and layout passes and
//! render the state it exposes.
//!
//! - [`geometry`]: points, rects, aspect ratios, rotation angles
//! - [`crop_box`]: the draggable crop rectangle
//! - [`viewport`]: the zoomable image layer under it
//! - [`crop_view`]: both kept consistent through layout changes
//! - [`session`]: the state machine, observer and toolbar
//! - [`render`]: cropping and rotating the source bitmap

pub mod bitmap;
pub mod config;
pub mod crop_box;
pub mod crop_view;
pub mod error;
pub mod geometry;
pub mod render;
pub mod session;
pub mod viewport;

pub use bitmap::Bitmap;
pub use config::{AspectRatioPreset, CropViewConfig, CroppingStyle, ToolbarConfig, ToolbarPosition};
pub use crop_box::{CropBox, CropEdge, ResizeConstraints, MINIMUM_BOX_SIZE};
pub use crop_view::{CropAnimation, CropView, ResettableTransition};
pub use error::{BitmapError, RenderError, SessionError};
pub use geometry::{AspectRatio, EdgeInsets, Point, Rect, RotationAngle, Size};
pub use render::{render, CroppedImageProvider, PlaceholderItem, RenderJob};
pub use session::{
    CallbackObserver, CancelOutcome, CommitOutcome, CropDelivery, CropObserver, CropSession,
    NoopObserver, SessionState, ToolbarAction, ToolbarResponse, ToolbarVisibility,
};
pub use viewport::{RotationOutcome, Viewport};
