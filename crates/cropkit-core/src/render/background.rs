//! Rendering off the calling thread.
//!
//! Only available with the `background` feature.

use crate::bitmap::Bitmap;
use crate::error::RenderError;

use super::RenderJob;

/// Render `job` on tokio's blocking pool.
///
/// The caller awaits the result on its own task, so delivery to the session
/// still happens on the caller's side.
pub async fn render_in_background(job: RenderJob) -> Result<Bitmap, RenderError> {
    log::debug!(
        "Rendering {}x{} crop in the background",
        job.crop_frame.width,
        job.crop_frame.height
    );
    tokio::task::spawn_blocking(move || job.render())
        .await
        .map_err(|e| RenderError::TaskFailed(e.to_string()))
}
