//! The zoomable, pannable image layer behind the crop box.
//!
//! The viewport follows scroll-view conventions: the image is laid out at
//! `zoom_scale` as content of size `rotated_image_size * zoom_scale`, and
//! `content_offset` is the content point shown at the view origin. A view
//! point `v` therefore shows image pixel `(v + content_offset) / zoom_scale`.
//!
//! All image coordinates here are in the rotated image's pixel space.
//!
//! # Invariants
//!
//! After any operation that takes the crop box:
//!
//! - `minimum_zoom_scale` is the smallest scale at which the image still
//!   covers the crop box.
//! - `zoom_scale` is within `[minimum_zoom_scale, maximum_zoom_scale]`.
//! - The image frame fully covers the crop box.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MAXIMUM_ZOOM_SCALE;
use crate::geometry::{Point, Rect, RotationAngle, Size, GEOMETRY_EPSILON};

/// Tolerance when snapping the image-space crop frame to whole pixels.
const PIXEL_SNAP_TOLERANCE: f64 = 1e-4;

/// Result of a quarter-turn rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationOutcome {
    pub zoom_scale: f64,
    pub content_offset: Point,
    pub crop_box_frame: Rect,
}

/// What the viewport showed before the crop view's bounds changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSnapshot {
    workable: Rect,
    crop_box_frame: Rect,
    zoom_scale: f64,
    minimum_zoom_scale: f64,
    content_offset: Point,
}

impl BoundsSnapshot {
    pub fn crop_box_frame(&self) -> Rect {
        self.crop_box_frame
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    image_size: Size,
    angle: RotationAngle,
    zoom_scale: f64,
    minimum_zoom_scale: f64,
    maximum_zoom_scale: f64,
    content_offset: Point,
}

impl Viewport {
    /// A viewport showing `image_size` (unrotated pixels) at scale 1.
    pub fn new(image_size: Size) -> Self {
        Self {
            image_size,
            angle: RotationAngle::ZERO,
            zoom_scale: 1.0,
            minimum_zoom_scale: 1.0,
            maximum_zoom_scale: DEFAULT_MAXIMUM_ZOOM_SCALE,
            content_offset: Point::ZERO,
        }
    }

    /// Unrotated image size in pixels.
    pub fn image_size(&self) -> Size {
        self.image_size
    }

    /// Image size after the current rotation.
    pub fn rotated_image_size(&self) -> Size {
        self.angle.apply_to(self.image_size)
    }

    pub fn angle(&self) -> RotationAngle {
        self.angle
    }

    /// Set the angle without moving the content. Callers re-lay out afterwards.
    pub fn set_angle(&mut self, angle: RotationAngle) {
        self.angle = angle;
    }

    pub fn zoom_scale(&self) -> f64 {
        self.zoom_scale
    }

    pub fn minimum_zoom_scale(&self) -> f64 {
        self.minimum_zoom_scale
    }

    pub fn maximum_zoom_scale(&self) -> f64 {
        self.maximum_zoom_scale
    }

    pub fn set_maximum_zoom_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.maximum_zoom_scale = scale;
        }
    }

    pub fn content_offset(&self) -> Point {
        self.content_offset
    }

    pub fn content_size(&self) -> Size {
        self.rotated_image_size().scaled(self.zoom_scale)
    }

    /// Where the image sits in view space.
    pub fn image_frame(&self) -> Rect {
        Rect::from_origin_size(Point::ZERO - self.content_offset, self.content_size())
    }

    /// Smallest zoom at which the rotated image covers a crop box of `crop`.
    pub fn minimum_zoom_scale_for(&self, crop: Size) -> f64 {
        let image = self.rotated_image_size();
        if image.is_empty() {
            return 1.0;
        }
        (crop.width / image.width).max(crop.height / image.height)
    }

    /// Image pixel shown at view point `view`.
    pub fn image_point(&self, view: Point) -> Point {
        (view + self.content_offset) * (1.0 / self.zoom_scale)
    }

    /// View point at which image pixel `image` is shown.
    pub fn view_point(&self, image: Point) -> Point {
        image * self.zoom_scale - self.content_offset
    }

    /// The crop box expressed in image pixels, without rounding.
    pub fn exact_image_crop_frame(&self, crop: Rect) -> Rect {
        let origin = self.image_point(crop.origin());
        let size = crop.size().scaled(1.0 / self.zoom_scale);
        Rect::from_origin_size(origin, size)
    }

    /// The crop box in image pixels, snapped to whole pixels inside the image.
    ///
    /// The origin is floored and the size ceiled, then the size is cut back so
    /// the frame never extends past the image.
    pub fn image_crop_frame(&self, crop: Rect) -> Rect {
        let exact = self.exact_image_crop_frame(crop);
        let image = self.rotated_image_size();

        let x = (exact.x + PIXEL_SNAP_TOLERANCE).floor().clamp(0.0, image.width);
        let y = (exact.y + PIXEL_SNAP_TOLERANCE).floor().clamp(0.0, image.height);
        let width = (exact.width - PIXEL_SNAP_TOLERANCE)
            .ceil()
            .min(image.width - x)
            .max(0.0);
        let height = (exact.height - PIXEL_SNAP_TOLERANCE)
            .ceil()
            .min(image.height - y)
            .max(0.0);

        Rect::new(x, y, width, height)
    }

    /// Lay the rotated image out at the scale that fits `workable`, centred,
    /// and return the crop box frame that exactly covers it.
    ///
    /// The maximum zoom becomes `max_zoom_multiple` times the fit scale.
    pub fn layout_to_fit(&mut self, workable: Rect, max_zoom_multiple: f64) -> Rect {
        let image = self.rotated_image_size();
        let scale = image.fit_scale(workable.size());
        let crop = Rect::centered_at(workable.center(), image.scaled(scale));

        self.zoom_scale = scale;
        self.minimum_zoom_scale = scale;
        self.maximum_zoom_scale = scale * max_zoom_multiple.max(1.0);
        self.content_offset = Point::ZERO - crop.origin();
        crop
    }

    /// Show image pixel `region_origin` at the crop box's origin, at `zoom`.
    pub fn show_region(&mut self, region_origin: Point, crop: Rect, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom_scale = zoom;
        }
        self.content_offset = region_origin * self.zoom_scale - crop.origin();
        self.clamp_to_crop_box(crop);
    }

    /// Change the zoom keeping the image point under `anchor` (view space) fixed.
    pub fn zoom_about(&mut self, scale: f64, anchor: Point) {
        if !(scale.is_finite() && scale > 0.0) {
            return;
        }
        let focus = self.image_point(anchor);
        self.zoom_scale = scale;
        self.content_offset = focus * scale - anchor;
    }

    /// Re-establish the invariants against the crop box `crop`.
    pub fn clamp_to_crop_box(&mut self, crop: Rect) {
        self.minimum_zoom_scale = self.minimum_zoom_scale_for(crop.size());
        if self.maximum_zoom_scale < self.minimum_zoom_scale {
            self.maximum_zoom_scale = self.minimum_zoom_scale;
        }

        if self.zoom_scale < self.minimum_zoom_scale {
            self.zoom_about(self.minimum_zoom_scale, crop.center());
        } else if self.zoom_scale > self.maximum_zoom_scale {
            self.zoom_about(self.maximum_zoom_scale, crop.center());
        }

        let content = self.content_size();
        let min_x = -crop.min_x();
        let min_y = -crop.min_y();
        let max_x = (content.width - crop.max_x()).max(min_x);
        let max_y = (content.height - crop.max_y()).max(min_y);
        self.content_offset = Point::new(
            self.content_offset.x.clamp(min_x, max_x),
            self.content_offset.y.clamp(min_y, max_y),
        );
    }

    /// Pan by a finger movement of `delta` view points.
    pub fn pan(&mut self, delta: Point, crop: Rect) {
        self.content_offset = self.content_offset - delta;
        self.clamp_to_crop_box(crop);
    }

    /// Pinch by `factor` around `focus` (view space).
    pub fn zoom_by(&mut self, factor: f64, focus: Point, crop: Rect) {
        if !(factor.is_finite() && factor > 0.0) {
            return;
        }
        self.minimum_zoom_scale = self.minimum_zoom_scale_for(crop.size());
        let scale = (self.zoom_scale * factor)
            .clamp(self.minimum_zoom_scale, self.maximum_zoom_scale.max(self.minimum_zoom_scale));
        self.zoom_about(scale, focus);
        self.clamp_to_crop_box(crop);
    }

    /// Grow the crop box to fill `workable`, centred, zooming in so it keeps
    /// showing the same part of the image. Returns the new crop box frame.
    ///
    /// Growth stops early at the maximum zoom.
    pub fn recenter(&mut self, crop: Rect, workable: Rect) -> Rect {
        if crop.is_empty() {
            return crop;
        }

        let mut scale = crop.size().fit_scale(workable.size());
        if self.zoom_scale * scale > self.maximum_zoom_scale {
            scale = (self.maximum_zoom_scale / self.zoom_scale).max(GEOMETRY_EPSILON);
        }

        let region_origin = self.image_point(crop.origin());
        let frame = Rect::centered_at(workable.center(), crop.size().scaled(scale));
        let zoom = self.zoom_scale * scale;

        log::trace!("Recentering crop box {:?} -> {:?}", crop, frame);
        self.show_region(region_origin, frame, zoom);
        frame
    }

    /// Turn the image a quarter turn and fit the rotated crop box into `workable`.
    ///
    /// The image pixels inside the crop box before the turn are the ones inside
    /// it afterwards, expressed in the rotated pixel space.
    pub fn rotate(&mut self, clockwise: bool, crop: Rect, workable: Rect) -> RotationOutcome {
        let mut scale = if crop.is_empty() {
            1.0
        } else {
            (workable.width / crop.height).min(workable.height / crop.width)
        };
        // Past the maximum zoom the box shrinks rather than showing more image
        if self.zoom_scale * scale > self.maximum_zoom_scale {
            scale = (self.maximum_zoom_scale / self.zoom_scale).max(GEOMETRY_EPSILON);
        }

        let focus = self.image_point(crop.center());
        let image = self.rotated_image_size();
        let rotated_focus = if clockwise {
            Point::new(image.height - focus.y, focus.x)
        } else {
            Point::new(focus.y, image.width - focus.x)
        };

        self.angle = self.angle.rotated(clockwise);

        let frame = Rect::centered_at(workable.center(), crop.size().swapped().scaled(scale));
        self.minimum_zoom_scale = self.minimum_zoom_scale_for(frame.size());
        let zoom = (self.zoom_scale * scale).min(self.maximum_zoom_scale.max(self.minimum_zoom_scale));
        self.zoom_scale = zoom;
        self.content_offset = rotated_focus * zoom - frame.center();
        self.clamp_to_crop_box(frame);

        log::debug!(
            "Rotated {} to {}deg, zoom {:.4}",
            if clockwise { "clockwise" } else { "counterclockwise" },
            self.angle.degrees(),
            self.zoom_scale
        );

        RotationOutcome {
            zoom_scale: self.zoom_scale,
            content_offset: self.content_offset,
            crop_box_frame: frame,
        }
    }

    /// Capture the visible region ahead of a bounds change.
    pub fn snapshot_for_bounds_change(&self, crop: Rect, workable: Rect) -> BoundsSnapshot {
        BoundsSnapshot {
            workable,
            crop_box_frame: crop,
            zoom_scale: self.zoom_scale,
            minimum_zoom_scale: self.minimum_zoom_scale,
            content_offset: self.content_offset,
        }
    }

    /// Restore the captured region into the new `workable` region and return
    /// the crop box frame to use.
    ///
    /// An unchanged region puts everything back exactly. Otherwise the crop box
    /// is scaled with the region and keeps its relative position in it.
    pub fn restore_after_bounds_change(&mut self, snapshot: BoundsSnapshot, workable: Rect) -> Rect {
        let old = snapshot.workable;
        if old.approx_eq(&workable, GEOMETRY_EPSILON) || old.is_empty() {
            self.zoom_scale = snapshot.zoom_scale;
            self.minimum_zoom_scale = snapshot.minimum_zoom_scale;
            self.content_offset = snapshot.content_offset;
            return snapshot.crop_box_frame;
        }

        let crop = snapshot.crop_box_frame;
        let scale = (workable.width / old.width).min(workable.height / old.height);
        let fraction_x = (crop.mid_x() - old.min_x()) / old.width;
        let fraction_y = (crop.mid_y() - old.min_y()) / old.height;
        let center = Point::new(
            workable.min_x() + fraction_x * workable.width,
            workable.min_y() + fraction_y * workable.height,
        );
        let frame = Rect::centered_at(center, crop.size().scaled(scale)).clamped_within(&workable);

        let region_origin = (crop.origin() + snapshot.content_offset) * (1.0 / snapshot.zoom_scale);
        self.show_region(region_origin, frame, snapshot.zoom_scale * scale);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workable() -> Rect {
        Rect::new(14.0, 14.0, 292.0, 452.0)
    }

    /// A 400x300 image laid out in a 320x480 view.
    fn laid_out() -> (Viewport, Rect) {
        let mut viewport = Viewport::new(Size::new(400.0, 300.0));
        let crop = viewport.layout_to_fit(workable(), 15.0);
        (viewport, crop)
    }

    fn assert_covers(viewport: &Viewport, crop: Rect) {
        assert!(
            viewport.image_frame().contains_rect(&crop),
            "image {:?} does not cover crop {:?}",
            viewport.image_frame(),
            crop
        );
    }

    #[test]
    fn test_layout_to_fit() {
        let (viewport, crop) = laid_out();
        let scale = 292.0 / 400.0;
        assert!((viewport.zoom_scale() - scale).abs() < 1e-12);
        assert!((viewport.maximum_zoom_scale() - scale * 15.0).abs() < 1e-9);
        assert!((crop.width - 292.0).abs() < 1e-9);
        assert!((crop.height - 219.0).abs() < 1e-9);
        assert!((crop.mid_y() - workable().mid_y()).abs() < 1e-9);
        assert!(viewport.image_frame().approx_eq(&crop, 1e-9));
    }

    #[test]
    fn test_full_image_crop_frame() {
        let (viewport, crop) = laid_out();
        assert_eq!(viewport.image_crop_frame(crop), Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_image_crop_frame_never_exceeds_image() {
        let (mut viewport, crop) = laid_out();
        viewport.pan(Point::new(-1_000.0, -1_000.0), crop);
        let frame = viewport.image_crop_frame(crop);
        assert!(frame.max_x() <= 400.0);
        assert!(frame.max_y() <= 300.0);
        assert!(frame.x >= 0.0 && frame.y >= 0.0);
    }

    #[test]
    fn test_pan_is_clamped() {
        let (mut viewport, crop) = laid_out();
        let before = viewport.content_offset();
        viewport.pan(Point::new(50.0, 50.0), crop);
        assert_eq!(viewport.content_offset(), before);
        assert_covers(&viewport, crop);
    }

    #[test]
    fn test_zoom_and_pan() {
        let (mut viewport, crop) = laid_out();
        viewport.zoom_by(2.0, crop.center(), crop);
        assert!((viewport.zoom_scale() - 2.0 * 292.0 / 400.0).abs() < 1e-9);
        assert_covers(&viewport, crop);

        // Centre of the image stays under the pinch focus
        let center = viewport.image_point(crop.center());
        assert!((center.x - 200.0).abs() < 1e-9);
        assert!((center.y - 150.0).abs() < 1e-9);

        viewport.pan(Point::new(-30.0, 10.0), crop);
        assert_covers(&viewport, crop);
    }

    #[test]
    fn test_zoom_clamped_to_limits() {
        let (mut viewport, crop) = laid_out();
        viewport.zoom_by(0.1, crop.center(), crop);
        assert_eq!(viewport.zoom_scale(), viewport.minimum_zoom_scale());

        viewport.zoom_by(1_000.0, crop.center(), crop);
        assert_eq!(viewport.zoom_scale(), viewport.maximum_zoom_scale());
        assert_covers(&viewport, crop);
    }

    #[test]
    fn test_clamp_raises_zoom_for_larger_crop() {
        let (mut viewport, crop) = laid_out();
        let taller = Rect::new(crop.x, crop.y - 50.0, crop.width, crop.height + 100.0);
        viewport.clamp_to_crop_box(taller);
        assert!(viewport.zoom_scale() >= viewport.minimum_zoom_scale_for(taller.size()) - 1e-12);
        assert_covers(&viewport, taller);
    }

    #[test]
    fn test_recenter_preserves_region() {
        let (mut viewport, crop) = laid_out();
        let smaller = Rect::new(crop.x + 40.0, crop.y + 20.0, 100.0, 80.0);
        viewport.clamp_to_crop_box(smaller);
        let region = viewport.exact_image_crop_frame(smaller);

        let frame = viewport.recenter(smaller, workable());
        assert!((frame.width - 292.0).abs() < 1e-9);
        assert!((frame.mid_x() - workable().mid_x()).abs() < 1e-9);
        assert!((frame.mid_y() - workable().mid_y()).abs() < 1e-9);
        assert!(viewport.exact_image_crop_frame(frame).approx_eq(&region, 1e-6));
    }

    #[test]
    fn test_rotate_swaps_and_fits() {
        let (mut viewport, crop) = laid_out();
        let outcome = viewport.rotate(true, crop, workable());
        assert_eq!(viewport.angle().degrees(), 90);
        assert_eq!(viewport.rotated_image_size(), Size::new(300.0, 400.0));

        let frame = outcome.crop_box_frame;
        assert!((frame.width / frame.height - 219.0 / 292.0).abs() < 1e-9);
        assert!(workable().contains_rect(&frame));
        assert_covers(&viewport, frame);
        assert!(viewport
            .image_crop_frame(frame)
            .approx_eq(&Rect::new(0.0, 0.0, 300.0, 400.0), 1e-9));
    }

    #[test]
    fn test_rotate_maps_region_clockwise() {
        let (mut viewport, crop) = laid_out();
        // Zoom into the top-left quadrant of the image
        let quadrant = Rect::new(crop.x, crop.y, crop.width * 0.5, crop.height * 0.5);
        viewport.clamp_to_crop_box(quadrant);
        let region = viewport.exact_image_crop_frame(quadrant);
        assert!(region.approx_eq(&Rect::new(0.0, 0.0, 200.0, 150.0), 1e-9));

        let outcome = viewport.rotate(true, quadrant, workable());
        let rotated = viewport.exact_image_crop_frame(outcome.crop_box_frame);
        // Top-left of a 400x300 image ends up top-right of the 300x400 result
        assert!(rotated.approx_eq(&Rect::new(150.0, 0.0, 150.0, 200.0), 1e-6), "{:?}", rotated);
    }

    #[test]
    fn test_restore_unchanged_bounds_is_exact() {
        let (mut viewport, crop) = laid_out();
        viewport.zoom_by(1.7, Point::new(100.0, 200.0), crop);
        let before = viewport.clone();

        let snapshot = viewport.snapshot_for_bounds_change(crop, workable());
        viewport.pan(Point::new(10.0, 10.0), crop);
        let frame = viewport.restore_after_bounds_change(snapshot, workable());
        assert_eq!(frame, crop);
        assert_eq!(viewport, before);
    }

    #[test]
    fn test_restore_after_bounds_change_keeps_region() {
        let (mut viewport, crop) = laid_out();
        viewport.zoom_by(2.0, crop.center(), crop);
        let region = viewport.exact_image_crop_frame(crop);

        let snapshot = viewport.snapshot_for_bounds_change(crop, workable());
        let landscape = Rect::new(14.0, 14.0, 452.0, 292.0);
        let frame = viewport.restore_after_bounds_change(snapshot, landscape);

        assert!(landscape.contains_rect(&frame));
        assert_covers(&viewport, frame);
        assert!(viewport.exact_image_crop_frame(frame).approx_eq(&region, 1e-6));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Gesture {
        Pan(f64, f64),
        Zoom(f64, f64, f64),
    }

    fn gesture_strategy() -> impl Strategy<Value = Gesture> {
        prop_oneof![
            (-500.0f64..500.0, -500.0f64..500.0).prop_map(|(x, y)| Gesture::Pan(x, y)),
            (0.2f64..5.0, 0.0f64..320.0, 0.0f64..480.0).prop_map(|(f, x, y)| Gesture::Zoom(f, x, y)),
        ]
    }

    fn workable() -> Rect {
        Rect::new(14.0, 14.0, 292.0, 452.0)
    }

    proptest! {
        /// Property: after any pan/zoom sequence the image covers the crop box
        /// and the zoom stays within its limits.
        #[test]
        fn prop_gestures_keep_crop_covered(
            width in 50u32..4000,
            height in 50u32..4000,
            gestures in prop::collection::vec(gesture_strategy(), 1..20),
        ) {
            let mut viewport = Viewport::new(Size::new(width as f64, height as f64));
            let crop = viewport.layout_to_fit(workable(), 15.0);

            for gesture in gestures {
                match gesture {
                    Gesture::Pan(x, y) => viewport.pan(Point::new(x, y), crop),
                    Gesture::Zoom(f, x, y) => viewport.zoom_by(f, Point::new(x, y), crop),
                }
                let image = viewport.image_frame();
                prop_assert!(image.inset(-1e-6, -1e-6).contains_rect(&crop), "{:?} vs {:?}", image, crop);
                prop_assert!(viewport.zoom_scale() >= viewport.minimum_zoom_scale() - 1e-12);
                prop_assert!(viewport.zoom_scale() <= viewport.maximum_zoom_scale() + 1e-12);

                let frame = viewport.image_crop_frame(crop);
                prop_assert!(frame.x >= 0.0 && frame.y >= 0.0);
                prop_assert!(frame.max_x() <= width as f64 && frame.max_y() <= height as f64);
            }
        }

        /// Property: four rotations in one direction restore the region.
        #[test]
        fn prop_four_rotations_identity(
            width in 50u32..4000,
            height in 50u32..4000,
            clockwise in any::<bool>(),
            zoom in 1.0f64..40.0,
        ) {
            let mut viewport = Viewport::new(Size::new(width as f64, height as f64));
            let mut crop = viewport.layout_to_fit(workable(), 15.0);
            viewport.zoom_by(zoom, crop.center(), crop);
            let region = viewport.image_crop_frame(crop);

            for _ in 0..4 {
                crop = viewport.rotate(clockwise, crop, workable()).crop_box_frame;
            }

            prop_assert!(viewport.angle().is_zero());
            let after = viewport.image_crop_frame(crop);
            prop_assert!(after.approx_eq(&region, 1.0), "{:?} vs {:?}", after, region);
        }
    }
}
