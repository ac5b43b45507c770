//! Geometry primitives shared by the crop box, the viewport and the renderer.
//!
//! # Coordinate Systems
//!
//! - **View space**: the crop view's local coordinates, origin top-left, in
//!   points. The crop box and the image layer frame live here.
//! - **Image space**: pixel coordinates of the image *after* the current
//!   rotation has been applied. The image crop frame lives here.
//!
//! Rotation angles are clockwise quarter turns, matching the visual direction
//! on a y-down display.

mod angle;
mod aspect;
mod rect;

pub use angle::RotationAngle;
pub use aspect::AspectRatio;
pub use rect::{EdgeInsets, Point, Rect, Size};

/// Tolerance used when comparing geometry that went through floating point math.
pub const GEOMETRY_EPSILON: f64 = 1e-6;
