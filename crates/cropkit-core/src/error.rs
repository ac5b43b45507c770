//! Error types.
//!
//! Geometry never fails: out-of-range input is clamped. The errors below cover
//! reading and writing bitmaps, driving the session state machine
//! out of order, and the optional background render task.

use thiserror::Error;

/// Errors from building, decoding or encoding a [`Bitmap`](crate::bitmap::Bitmap).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BitmapError {
    /// The buffer length does not match `width * height * 4`.
    #[error("Pixel buffer has {actual} bytes, expected {expected}")]
    InvalidBuffer { expected: usize, actual: usize },

    /// Width or height is zero.
    #[error("Image has no pixels")]
    EmptyImage,

    /// The encoded file could not be read.
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode image: {0}")]
    Encode(String),
}

/// Errors from calling a session operation in the wrong state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs the initial layout to have been performed.
    #[error("Crop view has not been laid out yet")]
    NotLaidOut,

    /// Restore values and the initial layout can only be set once, before layout.
    #[error("Crop view has already been laid out")]
    AlreadyLaidOut,

    /// The session has left the editing states.
    #[error("Crop session has finished")]
    Finished,

    /// A blocking animation (rotation, reset) has not completed yet.
    #[error("An animation is in flight")]
    AnimationInFlight,

    /// `finish_share` or `deliver_rendered` was called with nothing pending.
    #[error("No commit is in progress")]
    NoCommitInProgress,

    /// `confirm_cancel` was called without a pending confirmation.
    #[error("No cancel confirmation is pending")]
    NoCancelPending,
}

/// Errors from rendering off the calling thread.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The worker task panicked or was cancelled.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}
