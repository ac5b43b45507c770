//! Outbound notifications of a crop session.

use crate::bitmap::Bitmap;
use crate::config::CroppingStyle;
use crate::geometry::{Rect, RotationAngle};

use super::ToolbarVisibility;

/// Which single result a commit delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropDelivery {
    /// Only the image-space rectangle and angle; nothing is rendered.
    Rect,
    /// A rendered rectangular bitmap.
    Image,
    /// A rendered bitmap clipped to a circle.
    CircularImage,
}

impl CropDelivery {
    /// Pick from the callbacks a host registered: a circular crop prefers the
    /// circular variant, then the plain image, then the rectangle alone.
    pub fn from_callbacks(style: CroppingStyle, has_circular_image: bool, has_image: bool) -> Self {
        if style == CroppingStyle::Circular && has_circular_image {
            CropDelivery::CircularImage
        } else if has_image {
            CropDelivery::Image
        } else {
            CropDelivery::Rect
        }
    }
}

/// Receives the outcome of a crop session.
///
/// All methods have empty defaults; implement the ones you need. A commit
/// calls exactly one of the `did_crop_*` methods, chosen by
/// [`crop_delivery`](Self::crop_delivery).
pub trait CropObserver {
    /// The result this observer wants. Defaults to a rendered image matching
    /// the cropping style.
    fn crop_delivery(&self, style: CroppingStyle) -> CropDelivery {
        match style {
            CroppingStyle::Default => CropDelivery::Image,
            CroppingStyle::Circular => CropDelivery::CircularImage,
        }
    }

    fn did_crop_to_rect(&mut self, _rect: Rect, _angle: RotationAngle) {}

    fn did_crop_to_image(&mut self, _image: Bitmap, _rect: Rect, _angle: RotationAngle) {}

    fn did_crop_to_circular_image(&mut self, _image: Bitmap, _rect: Rect, _angle: RotationAngle) {}

    /// The session ended; `cancelled` is false after a completed share.
    fn did_finish_cancelled(&mut self, _cancelled: bool) {}

    fn did_become_resettable(&mut self) {}

    fn did_become_non_resettable(&mut self) {}

    fn toolbar_visibility_changed(&mut self, _visibility: &ToolbarVisibility) {}
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CropObserver for NoopObserver {}

type RectCallback = Box<dyn FnMut(Rect, RotationAngle)>;
type ImageCallback = Box<dyn FnMut(Bitmap, Rect, RotationAngle)>;

/// An observer assembled from closures.
///
/// Delivery follows the callbacks that are set: a circular crop uses
/// `on_crop_to_circular_image` if present, then `on_crop_to_image`, then
/// `on_crop_to_rect`.
#[derive(Default)]
pub struct CallbackObserver {
    on_crop_to_rect: Option<RectCallback>,
    on_crop_to_image: Option<ImageCallback>,
    on_crop_to_circular_image: Option<ImageCallback>,
    on_finish_cancelled: Option<Box<dyn FnMut(bool)>>,
    on_resettable_changed: Option<Box<dyn FnMut(bool)>>,
    on_toolbar_changed: Option<Box<dyn FnMut(&ToolbarVisibility)>>,
}

impl CallbackObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_crop_to_rect(mut self, callback: impl FnMut(Rect, RotationAngle) + 'static) -> Self {
        self.on_crop_to_rect = Some(Box::new(callback));
        self
    }

    pub fn on_crop_to_image(
        mut self,
        callback: impl FnMut(Bitmap, Rect, RotationAngle) + 'static,
    ) -> Self {
        self.on_crop_to_image = Some(Box::new(callback));
        self
    }

    pub fn on_crop_to_circular_image(
        mut self,
        callback: impl FnMut(Bitmap, Rect, RotationAngle) + 'static,
    ) -> Self {
        self.on_crop_to_circular_image = Some(Box::new(callback));
        self
    }

    pub fn on_finish_cancelled(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_finish_cancelled = Some(Box::new(callback));
        self
    }

    /// Called with `true` when the session becomes resettable, `false` when it stops.
    pub fn on_resettable_changed(mut self, callback: impl FnMut(bool) + 'static) -> Self {
        self.on_resettable_changed = Some(Box::new(callback));
        self
    }

    pub fn on_toolbar_changed(mut self, callback: impl FnMut(&ToolbarVisibility) + 'static) -> Self {
        self.on_toolbar_changed = Some(Box::new(callback));
        self
    }
}

impl std::fmt::Debug for CallbackObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackObserver")
            .field("on_crop_to_rect", &self.on_crop_to_rect.is_some())
            .field("on_crop_to_image", &self.on_crop_to_image.is_some())
            .field("on_crop_to_circular_image", &self.on_crop_to_circular_image.is_some())
            .field("on_finish_cancelled", &self.on_finish_cancelled.is_some())
            .field("on_resettable_changed", &self.on_resettable_changed.is_some())
            .field("on_toolbar_changed", &self.on_toolbar_changed.is_some())
            .finish()
    }
}

impl CropObserver for CallbackObserver {
    fn crop_delivery(&self, style: CroppingStyle) -> CropDelivery {
        CropDelivery::from_callbacks(
            style,
            self.on_crop_to_circular_image.is_some(),
            self.on_crop_to_image.is_some(),
        )
    }

    fn did_crop_to_rect(&mut self, rect: Rect, angle: RotationAngle) {
        if let Some(callback) = self.on_crop_to_rect.as_mut() {
            callback(rect, angle);
        }
    }

    fn did_crop_to_image(&mut self, image: Bitmap, rect: Rect, angle: RotationAngle) {
        if let Some(callback) = self.on_crop_to_image.as_mut() {
            callback(image, rect, angle);
        }
    }

    fn did_crop_to_circular_image(&mut self, image: Bitmap, rect: Rect, angle: RotationAngle) {
        if let Some(callback) = self.on_crop_to_circular_image.as_mut() {
            callback(image, rect, angle);
        }
    }

    fn did_finish_cancelled(&mut self, cancelled: bool) {
        if let Some(callback) = self.on_finish_cancelled.as_mut() {
            callback(cancelled);
        }
    }

    fn did_become_resettable(&mut self) {
        if let Some(callback) = self.on_resettable_changed.as_mut() {
            callback(true);
        }
    }

    fn did_become_non_resettable(&mut self) {
        if let Some(callback) = self.on_resettable_changed.as_mut() {
            callback(false);
        }
    }

    fn toolbar_visibility_changed(&mut self, visibility: &ToolbarVisibility) {
        if let Some(callback) = self.on_toolbar_changed.as_mut() {
            callback(visibility);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delivery_follows_style() {
        let observer = NoopObserver;
        assert_eq!(observer.crop_delivery(CroppingStyle::Default), CropDelivery::Image);
        assert_eq!(
            observer.crop_delivery(CroppingStyle::Circular),
            CropDelivery::CircularImage
        );
    }

    #[test]
    fn test_delivery_from_callbacks() {
        use CroppingStyle::{Circular, Default as Rectangular};
        assert_eq!(CropDelivery::from_callbacks(Circular, true, true), CropDelivery::CircularImage);
        assert_eq!(CropDelivery::from_callbacks(Circular, false, true), CropDelivery::Image);
        assert_eq!(CropDelivery::from_callbacks(Rectangular, true, true), CropDelivery::Image);
        assert_eq!(CropDelivery::from_callbacks(Rectangular, true, false), CropDelivery::Rect);
        assert_eq!(CropDelivery::from_callbacks(Circular, false, false), CropDelivery::Rect);
    }

    #[test]
    fn test_callback_delivery() {
        let rect_only = CallbackObserver::new().on_crop_to_rect(|_, _| {});
        assert_eq!(rect_only.crop_delivery(CroppingStyle::Circular), CropDelivery::Rect);

        let image = CallbackObserver::new().on_crop_to_image(|_, _, _| {});
        assert_eq!(image.crop_delivery(CroppingStyle::Circular), CropDelivery::Image);

        let circular = image.on_crop_to_circular_image(|_, _, _| {});
        assert_eq!(
            circular.crop_delivery(CroppingStyle::Circular),
            CropDelivery::CircularImage
        );
        assert_eq!(circular.crop_delivery(CroppingStyle::Default), CropDelivery::Image);
    }
}
