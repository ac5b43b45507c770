//! Lazily rendered crop results.

use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};

use crate::bitmap::Bitmap;
use crate::geometry::{Rect, RotationAngle, Size};

use super::{output_dimensions, render};

/// Everything needed to render a committed crop.
///
/// The job owns a shared handle on the source bitmap, so it can be moved to
/// another thread independently of the session.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub image: Arc<Bitmap>,
    /// Crop rectangle in the rotated image's pixels.
    pub crop_frame: Rect,
    pub angle: RotationAngle,
    pub circular_clip: bool,
}

impl RenderJob {
    pub fn new(image: Arc<Bitmap>, crop_frame: Rect, angle: RotationAngle, circular_clip: bool) -> Self {
        Self {
            image,
            crop_frame,
            angle,
            circular_clip,
        }
    }

    pub fn render(&self) -> Bitmap {
        render(&self.image, self.crop_frame, self.angle, self.circular_clip)
    }

    /// Output dimensions, known without rendering.
    pub fn output_size(&self) -> Size {
        let (width, height) = output_dimensions(&self.image, self.crop_frame, self.angle);
        Size::new(width as f64, height as f64)
    }
}

/// Metadata a share sheet shows before the bitmap exists.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderItem {
    pub size: Size,
    pub scale: f64,
    pub circular: bool,
}

/// Hands out the cropped bitmap on first request and caches it.
///
/// A share sheet asks for the placeholder early and only asks for the item
/// once the user picks a destination.
#[derive(Debug)]
pub struct CroppedImageProvider {
    job: RenderJob,
    rendered: OnceLock<Bitmap>,
}

impl CroppedImageProvider {
    pub fn new(job: RenderJob) -> Self {
        Self {
            job,
            rendered: OnceLock::new(),
        }
    }

    pub fn job(&self) -> &RenderJob {
        &self.job
    }

    pub fn placeholder(&self) -> PlaceholderItem {
        PlaceholderItem {
            size: self.job.output_size(),
            scale: self.job.image.scale(),
            circular: self.job.circular_clip,
        }
    }

    /// The rendered bitmap, rendering it on the first call.
    pub fn item(&self) -> &Bitmap {
        self.rendered.get_or_init(|| self.job.render())
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> RenderJob {
        let bitmap = Bitmap::from_rgba(40, 30, vec![200u8; 40 * 30 * 4]).unwrap();
        RenderJob::new(
            Arc::new(bitmap),
            Rect::new(5.0, 5.0, 20.0, 10.0),
            RotationAngle::ZERO,
            false,
        )
    }

    #[test]
    fn test_placeholder_without_rendering() {
        let provider = CroppedImageProvider::new(job());
        let placeholder = provider.placeholder();
        assert_eq!(placeholder.size, Size::new(20.0, 10.0));
        assert!(!placeholder.circular);
        assert!(!provider.is_rendered());
    }

    #[test]
    fn test_item_is_cached() {
        let provider = CroppedImageProvider::new(job());
        let first = provider.item() as *const Bitmap;
        assert!(provider.is_rendered());
        let second = provider.item() as *const Bitmap;
        assert_eq!(first, second);
        assert_eq!((provider.item().width(), provider.item().height()), (20, 10));
    }

    #[test]
    fn test_placeholder_matches_item_for_out_of_range_rect() {
        let bitmap = Bitmap::from_rgba(40, 30, vec![200u8; 40 * 30 * 4]).unwrap();
        // Rotated space is 30x40; the rect overhangs both far edges
        let job = RenderJob::new(
            Arc::new(bitmap),
            Rect::new(20.0, 25.0, 50.0, 50.0),
            RotationAngle::from_degrees(90),
            false,
        );
        let provider = CroppedImageProvider::new(job);

        let placeholder = provider.placeholder();
        assert_eq!(placeholder.size, Size::new(10.0, 15.0));
        let item = provider.item();
        assert_eq!(
            (item.width() as f64, item.height() as f64),
            (placeholder.size.width, placeholder.size.height)
        );
    }
}
