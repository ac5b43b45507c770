//! The crop view: a crop box over a viewport, kept consistent.
//!
//! The crop view owns the layout rules. It computes the workable region from
//! its bounds, lays out the image, applies restore values, aspect ratios,
//! rotations and resets, and tracks whether the layout has drifted from the
//! pristine one (the "resettable" state).
//!
//! Animations are not performed here. An operation called with
//! `animated = true` applies its final state immediately and marks an
//! animation as in flight. Until the host reports it finished, further
//! mutations are refused, so input can't observe a half-animated layout.

use std::time::Duration;

use crate::config::{CropViewConfig, CroppingStyle};
use crate::crop_box::{CropBox, CropEdge, ResizeConstraints, MINIMUM_BOX_SIZE};
use crate::error::SessionError;
use crate::geometry::{AspectRatio, Point, Rect, RotationAngle, Size, GEOMETRY_EPSILON};
use crate::viewport::{BoundsSnapshot, Viewport};

/// Layout drift below this many points is not an edit.
const LAYOUT_TOLERANCE: f64 = 0.5;

/// Edge of the resettable state, queued for the session to forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResettableTransition {
    BecameResettable,
    BecameNonResettable,
}

/// A blocking animation the host is playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropAnimation {
    Rotation,
    Reset,
    AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutSnapshot {
    angle: RotationAngle,
    crop_box_frame: Rect,
    zoom_scale: f64,
    content_offset: Point,
}

impl LayoutSnapshot {
    fn differs_from(&self, other: &LayoutSnapshot) -> bool {
        if self.angle != other.angle {
            return true;
        }
        let zoom_tolerance = GEOMETRY_EPSILON * self.zoom_scale.max(1.0);
        if (self.zoom_scale - other.zoom_scale).abs() > zoom_tolerance {
            return true;
        }
        if !self
            .crop_box_frame
            .approx_eq(&other.crop_box_frame, LAYOUT_TOLERANCE)
        {
            return true;
        }
        (self.content_offset.x - other.content_offset.x).abs() > LAYOUT_TOLERANCE
            || (self.content_offset.y - other.content_offset.y).abs() > LAYOUT_TOLERANCE
    }
}

#[derive(Debug, Clone)]
pub struct CropView {
    style: CroppingStyle,
    config: CropViewConfig,
    bounds: Size,
    crop_box: CropBox,
    viewport: Viewport,
    aspect_ratio: AspectRatio,
    aspect_ratio_lock_enabled: bool,
    restore_image_crop_frame: Option<Rect>,
    restore_angle: RotationAngle,
    laid_out: bool,
    pristine: Option<LayoutSnapshot>,
    resettable: bool,
    transitions: Vec<ResettableTransition>,
    bounds_snapshot: Option<BoundsSnapshot>,
    settle_pending: bool,
    animation: Option<CropAnimation>,
}

impl CropView {
    /// A crop view for an image of `image_size` pixels (unrotated).
    pub fn new(image_size: Size, style: CroppingStyle, config: CropViewConfig) -> Self {
        let config = config.sanitized();
        let circular = style == CroppingStyle::Circular;
        let aspect_ratio = if circular {
            AspectRatio::SQUARE
        } else {
            config.aspect_ratio_preset.ratio()
        };
        let aspect_ratio_lock_enabled = circular || config.aspect_ratio_lock_enabled;

        Self {
            style,
            config,
            bounds: Size::ZERO,
            crop_box: CropBox::new(Rect::ZERO),
            viewport: Viewport::new(image_size),
            aspect_ratio,
            aspect_ratio_lock_enabled,
            restore_image_crop_frame: None,
            restore_angle: RotationAngle::ZERO,
            laid_out: false,
            pristine: None,
            resettable: false,
            transitions: Vec::new(),
            bounds_snapshot: None,
            settle_pending: false,
            animation: None,
        }
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn cropping_style(&self) -> CroppingStyle {
        self.style
    }

    pub fn config(&self) -> &CropViewConfig {
        &self.config
    }

    pub fn bounds(&self) -> Size {
        self.bounds
    }

    pub fn is_laid_out(&self) -> bool {
        self.laid_out
    }

    pub fn crop_box(&self) -> &CropBox {
        &self.crop_box
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn crop_box_frame(&self) -> Rect {
        self.crop_box.frame()
    }

    /// The crop box in rotated image pixels, snapped to whole pixels.
    pub fn image_crop_frame(&self) -> Rect {
        self.viewport.image_crop_frame(self.crop_box.frame())
    }

    /// Where the image layer sits in view space.
    pub fn image_view_frame(&self) -> Rect {
        self.viewport.image_frame()
    }

    pub fn angle(&self) -> RotationAngle {
        self.viewport.angle()
    }

    pub fn zoom_scale(&self) -> f64 {
        self.viewport.zoom_scale()
    }

    pub fn content_offset(&self) -> Point {
        self.viewport.content_offset()
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn aspect_ratio_lock_enabled(&self) -> bool {
        self.aspect_ratio_lock_enabled
    }

    /// The circular style is always locked.
    pub fn set_aspect_ratio_lock_enabled(&mut self, enabled: bool) {
        self.aspect_ratio_lock_enabled = enabled || self.style == CroppingStyle::Circular;
    }

    pub fn can_be_reset(&self) -> bool {
        self.resettable
    }

    pub fn grid_overlay_hidden(&self) -> bool {
        self.crop_box.grid_overlay_hidden()
    }

    pub fn crop_box_aspect_ratio_is_portrait(&self) -> bool {
        self.crop_box.aspect_ratio_is_portrait()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_settle_pending(&self) -> bool {
        self.settle_pending
    }

    /// Drain the resettable edges produced since the last call.
    pub fn take_resettable_transitions(&mut self) -> Vec<ResettableTransition> {
        std::mem::take(&mut self.transitions)
    }

    /// The region the crop box may occupy: bounds minus padding and insets.
    pub fn workable_region(&self) -> Rect {
        let padding = self.config.crop_view_padding;
        let region = Rect::from_size(self.bounds)
            .inset(padding, padding)
            .inset_by(self.config.crop_region_insets);
        Rect::new(region.x, region.y, region.width.max(0.0), region.height.max(0.0))
    }

    // ------------------------------------------------------------------
    // Restore and initial layout
    // ------------------------------------------------------------------

    /// Seed the image-space crop frame to restore. After layout this applies
    /// the frame directly.
    pub fn set_image_crop_frame(&mut self, frame: Rect) -> Result<(), SessionError> {
        if !self.laid_out {
            self.restore_image_crop_frame = Some(frame);
            return Ok(());
        }
        self.ensure_interactive()?;
        self.apply_image_crop_frame(frame);
        self.check_for_can_reset();
        Ok(())
    }

    /// Seed the angle to restore. Only valid before layout.
    pub fn set_restore_angle(&mut self, angle: RotationAngle) -> Result<(), SessionError> {
        if self.laid_out {
            return Err(SessionError::AlreadyLaidOut);
        }
        self.restore_angle = angle;
        Ok(())
    }

    /// Lay the image out inside `bounds` and apply any restore values.
    pub fn perform_initial_setup(&mut self, bounds: Size) -> Result<(), SessionError> {
        if self.laid_out {
            return Err(SessionError::AlreadyLaidOut);
        }

        self.bounds = bounds;
        self.crop_box.set_workable_region(self.workable_region());

        self.viewport.set_angle(RotationAngle::ZERO);
        self.layout_default();
        self.pristine = Some(self.layout_snapshot());

        if !self.restore_angle.is_zero() {
            self.viewport.set_angle(self.restore_angle);
            self.layout_default();
        }
        if let Some(frame) = self.restore_image_crop_frame.take() {
            self.apply_image_crop_frame(frame);
        }

        self.laid_out = true;
        log::debug!(
            "Laid out {}x{} image in {}x{}: crop {:?}, zoom {:.4}",
            self.viewport.image_size().width,
            self.viewport.image_size().height,
            bounds.width,
            bounds.height,
            self.crop_box.frame(),
            self.viewport.zoom_scale()
        );

        self.check_for_can_reset();
        Ok(())
    }

    /// Fit the image at the current angle, then apply the current ratio.
    fn layout_default(&mut self) {
        let workable = self.crop_box.workable_region();
        let frame = self
            .viewport
            .layout_to_fit(workable, self.config.maximum_zoom_scale);
        let frame = self.crop_box.set_frame(frame);
        self.viewport.clamp_to_crop_box(frame);

        if self.style == CroppingStyle::Circular || !self.aspect_ratio.is_unconstrained() {
            self.apply_aspect_ratio(self.aspect_ratio);
        }
    }

    fn apply_image_crop_frame(&mut self, frame: Rect) {
        let finite = [frame.x, frame.y, frame.width, frame.height]
            .iter()
            .all(|value| value.is_finite());
        if !finite {
            log::warn!("Ignoring non-finite image crop frame {:?}", frame);
            return;
        }

        let image_bounds = Rect::from_size(self.viewport.rotated_image_size());
        let mut region = Rect::new(frame.x, frame.y, frame.width.max(1.0), frame.height.max(1.0))
            .clamped_within(&image_bounds);
        if !region.approx_eq(&frame, GEOMETRY_EPSILON) {
            log::warn!(
                "Image crop frame {:?} clamped to {:?} to fit the image",
                frame,
                region
            );
        }

        if self.style == CroppingStyle::Circular {
            let side = region.width.min(region.height);
            region = Rect::centered_at(region.center(), Size::new(side, side));
        }

        self.show_image_region(region);
    }

    /// Show the image-space `region` at the largest crop box the workable
    /// region and the maximum zoom allow, centred.
    fn show_image_region(&mut self, region: Rect) {
        if region.is_empty() {
            return;
        }
        let workable = self.crop_box.workable_region();
        let image_bounds = Rect::from_size(self.viewport.rotated_image_size());
        let max_zoom = self.viewport.maximum_zoom_scale();

        let mut region = region;
        let mut zoom = region.size().fit_scale(workable.size()).min(max_zoom);
        let size = region.size().scaled(zoom);
        if size.width < MINIMUM_BOX_SIZE || size.height < MINIMUM_BOX_SIZE {
            // Grow the region about its centre until the box reaches the minimum
            let grow = (MINIMUM_BOX_SIZE / size.width).max(MINIMUM_BOX_SIZE / size.height);
            region = Rect::centered_at(region.center(), region.size().scaled(grow))
                .clamped_within(&image_bounds);
            zoom = region.size().fit_scale(workable.size()).min(max_zoom);
        }

        let frame = Rect::centered_at(workable.center(), region.size().scaled(zoom));
        let frame = self.crop_box.set_frame(frame);
        self.viewport.show_region(region.origin(), frame, zoom);
    }

    // ------------------------------------------------------------------
    // Aspect ratio
    // ------------------------------------------------------------------

    /// The width/height value `ratio` lays out with for the current image.
    fn target_ratio(&self, ratio: AspectRatio) -> f64 {
        let image = self.viewport.rotated_image_size();
        let mut target = if self.style == CroppingStyle::Circular {
            AspectRatio::SQUARE
        } else {
            ratio.resolve(image)
        };
        if self.config.aspect_ratio_lock_dimension_swap_enabled {
            target = target.matched_to_orientation(image);
        }
        target.value().or_else(|| image.aspect()).unwrap_or(1.0)
    }

    /// Reshape the crop around the centre of the current region, keeping its
    /// area where the image allows.
    fn apply_aspect_ratio(&mut self, ratio: AspectRatio) {
        let target = self.target_ratio(ratio);
        let image = self.viewport.rotated_image_size();
        let image_bounds = Rect::from_size(image);

        let region = self
            .viewport
            .exact_image_crop_frame(self.crop_box.frame())
            .clamped_within(&image_bounds);
        let area = (region.width * region.height).max(1.0);

        let mut size = Size::new((area * target).sqrt(), (area / target).sqrt());
        let fit = size.fit_scale(image);
        if fit < 1.0 {
            size = size.scaled(fit);
        }

        let region = Rect::centered_at(region.center(), size).clamped_within(&image_bounds);
        log::debug!("Applying aspect ratio {:.4} with image region {:?}", target, region);
        self.show_image_region(region);
    }

    /// Constrain the crop box to `ratio`. An unconstrained ratio restores the
    /// image's own.
    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio, animated: bool) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.finish_gestures();

        self.aspect_ratio = if self.style == CroppingStyle::Circular {
            AspectRatio::SQUARE
        } else {
            ratio
        };
        self.apply_aspect_ratio(self.aspect_ratio);
        self.begin_animation(animated, CropAnimation::AspectRatio);
        self.check_for_can_reset();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reset and rotation
    // ------------------------------------------------------------------

    /// Return to angle zero and the default fit.
    ///
    /// With `reset_aspect_ratio_enabled` the ratio and its lock are cleared
    /// too; otherwise the current ratio is laid out again.
    pub fn reset_layout_to_default(&mut self, animated: bool) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.finish_gestures();

        if self.config.reset_aspect_ratio_enabled && self.style != CroppingStyle::Circular {
            self.aspect_ratio = AspectRatio::UNCONSTRAINED;
            self.aspect_ratio_lock_enabled = false;
        }

        self.viewport.set_angle(RotationAngle::ZERO);
        self.layout_default();
        self.pristine = Some(self.layout_snapshot());
        self.begin_animation(animated, CropAnimation::Reset);

        if self.resettable {
            self.resettable = false;
            self.transitions.push(ResettableTransition::BecameNonResettable);
            log::debug!("Crop view is no longer resettable");
        }
        Ok(())
    }

    /// Rotate the image a quarter turn, keeping the selected region.
    pub fn rotate_image_ninety_degrees(&mut self, animated: bool, clockwise: bool) -> Result<(), SessionError> {
        self.ensure_interactive()?;
        self.finish_gestures();

        let workable = self.crop_box.workable_region();
        let outcome = self
            .viewport
            .rotate(clockwise, self.crop_box.frame(), workable);
        let frame = self.crop_box.set_frame(outcome.crop_box_frame);
        if frame != outcome.crop_box_frame {
            self.viewport.clamp_to_crop_box(frame);
        }

        self.begin_animation(animated, CropAnimation::Rotation);
        self.check_for_can_reset();
        Ok(())
    }

    /// The host finished playing the animation it was asked to.
    pub fn animation_did_finish(&mut self) -> Option<CropAnimation> {
        self.animation.take()
    }

    fn begin_animation(&mut self, animated: bool, animation: CropAnimation) {
        if animated {
            self.animation = Some(animation);
        }
    }

    // ------------------------------------------------------------------
    // Bounds changes
    // ------------------------------------------------------------------

    /// First phase of a bounds change: remember what is visible.
    pub fn prepare_for_rotation(&mut self) {
        if !self.laid_out {
            return;
        }
        self.bounds_snapshot = Some(
            self.viewport
                .snapshot_for_bounds_change(self.crop_box.frame(), self.crop_box.workable_region()),
        );
    }

    /// Second phase: lay the remembered region out inside the new `bounds`.
    pub fn perform_relayout_for_rotation(&mut self, bounds: Size) {
        let old_workable = self.crop_box.workable_region();
        self.bounds = bounds;
        if !self.laid_out {
            return;
        }

        let workable = self.workable_region();
        let snapshot = self.bounds_snapshot.take().unwrap_or_else(|| {
            self.viewport
                .snapshot_for_bounds_change(self.crop_box.frame(), old_workable)
        });

        self.crop_box.set_workable_region(workable);
        let frame = self.viewport.restore_after_bounds_change(snapshot, workable);
        let sanitized = self.crop_box.set_frame(frame);
        if sanitized != frame {
            self.viewport.clamp_to_crop_box(sanitized);
        }

        // An untouched layout stays untouched in the new bounds
        if !self.resettable {
            self.pristine = Some(self.layout_snapshot());
        }
        log::debug!("Relaid out for bounds {}x{}", bounds.width, bounds.height);
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    fn resize_constraints(&self) -> ResizeConstraints {
        ResizeConstraints {
            aspect_locked: self.aspect_ratio_lock_enabled || self.style == CroppingStyle::Circular,
            minimum_aspect_ratio: self.config.minimum_aspect_ratio,
        }
    }

    /// Start a crop box drag at `point`. Returns the grabbed handle.
    pub fn begin_resize(&mut self, point: Point) -> Option<CropEdge> {
        if !self.is_interactive() || !self.config.crop_box_resize_enabled {
            return None;
        }
        let edge = self.crop_box.begin_resize(point)?;
        self.settle_pending = false;
        Some(edge)
    }

    /// Track a crop box drag. The box can't grow past the visible image.
    pub fn update_resize(&mut self, point: Point) -> Option<Rect> {
        if self.is_animating() {
            return None;
        }
        let workable = self.crop_box.workable_region();
        let limits = workable
            .intersection(&self.viewport.image_frame())
            .unwrap_or(workable);
        let frame = self
            .crop_box
            .update_resize_within(point, self.resize_constraints(), limits)?;
        self.viewport.clamp_to_crop_box(frame);
        self.check_for_can_reset();
        Some(frame)
    }

    /// End a crop box drag. Returns how long to wait before calling
    /// [`settle`](Self::settle), or `None` if no drag was active.
    pub fn end_resize(&mut self) -> Option<Duration> {
        if !self.crop_box.end_resize() {
            return None;
        }
        self.settle_pending = true;
        Some(self.config.crop_adjusting_delay())
    }

    /// A pan or pinch on the image started.
    pub fn begin_content_gesture(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.crop_box.set_editing(true);
        self.settle_pending = false;
        true
    }

    pub fn pan_content(&mut self, delta: Point) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.viewport.pan(delta, self.crop_box.frame());
        self.check_for_can_reset();
        true
    }

    pub fn zoom_content(&mut self, factor: f64, focus: Point) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.viewport.zoom_by(factor, focus, self.crop_box.frame());
        self.check_for_can_reset();
        true
    }

    /// A pan or pinch ended. Returns the settle delay while editing.
    pub fn end_content_gesture(&mut self) -> Option<Duration> {
        if !self.crop_box.is_editing() {
            return None;
        }
        self.settle_pending = true;
        Some(self.config.crop_adjusting_delay())
    }

    /// Run the delayed settle scheduled by the end of a gesture.
    ///
    /// Does nothing if another gesture started in the meantime.
    pub fn settle(&mut self) -> bool {
        if !self.settle_pending || !self.is_interactive() {
            return false;
        }
        self.move_cropped_content_to_center();
        true
    }

    /// Grow the crop box back to fill the workable region, centred, keeping
    /// the selected part of the image.
    pub fn move_cropped_content_to_center(&mut self) {
        let workable = self.crop_box.workable_region();
        let frame = self.viewport.recenter(self.crop_box.frame(), workable);
        let sanitized = self.crop_box.set_frame(frame);
        if sanitized != frame {
            self.viewport.clamp_to_crop_box(sanitized);
        }
        self.crop_box.set_editing(false);
        self.settle_pending = false;
        self.check_for_can_reset();
    }

    fn finish_gestures(&mut self) {
        self.crop_box.end_resize();
        self.crop_box.set_editing(false);
        self.settle_pending = false;
    }

    // ------------------------------------------------------------------
    // Resettable tracking
    // ------------------------------------------------------------------

    fn layout_snapshot(&self) -> LayoutSnapshot {
        LayoutSnapshot {
            angle: self.viewport.angle(),
            crop_box_frame: self.crop_box.frame(),
            zoom_scale: self.viewport.zoom_scale(),
            content_offset: self.viewport.content_offset(),
        }
    }

    /// Latch the resettable state once the layout leaves the pristine one.
    fn check_for_can_reset(&mut self) {
        if self.resettable {
            return;
        }
        let Some(pristine) = self.pristine else {
            return;
        };
        if self.layout_snapshot().differs_from(&pristine) {
            self.resettable = true;
            self.transitions.push(ResettableTransition::BecameResettable);
            log::debug!("Crop view became resettable");
        }
    }

    fn is_interactive(&self) -> bool {
        self.laid_out && self.animation.is_none()
    }

    fn ensure_interactive(&self) -> Result<(), SessionError> {
        if !self.laid_out {
            return Err(SessionError::NotLaidOut);
        }
        if self.animation.is_some() {
            return Err(SessionError::AnimationInFlight);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Size = Size {
        width: 320.0,
        height: 480.0,
    };

    fn view(config: CropViewConfig) -> CropView {
        CropView::new(Size::new(400.0, 300.0), CroppingStyle::Default, config)
    }

    fn laid_out() -> CropView {
        let mut view = view(CropViewConfig::default());
        view.perform_initial_setup(BOUNDS).unwrap();
        view
    }

    #[test]
    fn test_initial_layout_shows_whole_image() {
        let view = laid_out();
        assert_eq!(view.workable_region(), Rect::new(14.0, 14.0, 292.0, 452.0));
        assert_eq!(view.image_crop_frame(), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert!(view.image_view_frame().approx_eq(&view.crop_box_frame(), 1e-9));
        assert!(!view.can_be_reset());
        assert!(view.grid_overlay_hidden());
    }

    #[test]
    fn test_restore_frame_round_trips() {
        let mut view = view(CropViewConfig::default());
        view.set_image_crop_frame(Rect::new(50.0, 50.0, 100.0, 100.0)).unwrap();
        view.perform_initial_setup(BOUNDS).unwrap();

        assert_eq!(view.image_crop_frame(), Rect::new(50.0, 50.0, 100.0, 100.0));
        assert!(view.can_be_reset());
        assert_eq!(
            view.take_resettable_transitions(),
            vec![ResettableTransition::BecameResettable]
        );
    }

    #[test]
    fn test_restore_frame_out_of_bounds_is_clamped() {
        let mut view = view(CropViewConfig::default());
        view.set_image_crop_frame(Rect::new(-10.0, -10.0, 1_000.0, 1_000.0)).unwrap();
        view.perform_initial_setup(BOUNDS).unwrap();
        assert_eq!(view.image_crop_frame(), Rect::new(0.0, 0.0, 400.0, 300.0));
    }

    #[test]
    fn test_restore_angle() {
        let mut view = view(CropViewConfig::default());
        view.set_restore_angle(RotationAngle::from_degrees(-90)).unwrap();
        view.perform_initial_setup(BOUNDS).unwrap();

        assert_eq!(view.angle().degrees(), 270);
        assert_eq!(view.image_crop_frame(), Rect::new(0.0, 0.0, 300.0, 400.0));
        assert!(view.can_be_reset());
        assert_eq!(view.set_restore_angle(RotationAngle::ZERO), Err(SessionError::AlreadyLaidOut));
    }

    #[test]
    fn test_double_setup_rejected() {
        let mut view = laid_out();
        assert_eq!(view.perform_initial_setup(BOUNDS), Err(SessionError::AlreadyLaidOut));
    }

    #[test]
    fn test_operations_before_layout() {
        let mut view = view(CropViewConfig::default());
        assert_eq!(
            view.rotate_image_ninety_degrees(false, true),
            Err(SessionError::NotLaidOut)
        );
        assert!(view.begin_resize(Point::new(0.0, 0.0)).is_none());
        assert!(!view.pan_content(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut view = laid_out();
        view.set_aspect_ratio(AspectRatio::new(16.0, 9.0), false).unwrap();

        let frame = view.crop_box_frame();
        assert!((frame.width / frame.height - 16.0 / 9.0).abs() < 1e-3);
        assert!(view.workable_region().contains_rect(&frame));
        assert!((frame.mid_x() - view.workable_region().mid_x()).abs() < 1e-6);
        assert!(view.can_be_reset());

        let region = view.image_crop_frame();
        assert!(region.max_x() <= 400.0 && region.max_y() <= 300.0);
    }

    #[test]
    fn test_unconstrained_ratio_restores_native() {
        let mut view = laid_out();
        view.set_aspect_ratio(AspectRatio::SQUARE, false).unwrap();
        view.set_aspect_ratio(AspectRatio::new(0.0, -1.0), false).unwrap();
        let frame = view.crop_box_frame();
        assert!((frame.width / frame.height - 4.0 / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_dimension_swap_matches_image_orientation() {
        let mut config = CropViewConfig::default();
        config.aspect_ratio_lock_dimension_swap_enabled = true;
        let mut view = CropView::new(Size::new(300.0, 400.0), CroppingStyle::Default, config);
        view.perform_initial_setup(BOUNDS).unwrap();

        view.set_aspect_ratio(AspectRatio::new(16.0, 9.0), false).unwrap();
        assert!(view.crop_box_aspect_ratio_is_portrait());
        let frame = view.crop_box_frame();
        assert!((frame.width / frame.height - 9.0 / 16.0).abs() < 1e-3);
    }

    #[test]
    fn test_configured_preset_applies_at_layout() {
        let mut config = CropViewConfig::default();
        config.aspect_ratio_preset = crate::config::AspectRatioPreset::Square;
        let mut view = view(config);
        view.perform_initial_setup(BOUNDS).unwrap();

        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);
        assert!(!view.can_be_reset());
    }

    #[test]
    fn test_circular_style_is_square() {
        let mut view = CropView::new(Size::new(400.0, 300.0), CroppingStyle::Circular, CropViewConfig::default());
        view.perform_initial_setup(BOUNDS).unwrap();
        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);

        view.set_aspect_ratio(AspectRatio::new(16.0, 9.0), false).unwrap();
        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);
        assert!(view.aspect_ratio_lock_enabled());
    }

    #[test]
    fn test_rotation_and_reset() {
        let mut view = laid_out();
        view.rotate_image_ninety_degrees(false, true).unwrap();
        assert_eq!(view.angle().degrees(), 90);
        assert_eq!(view.image_crop_frame(), Rect::new(0.0, 0.0, 300.0, 400.0));
        assert!(view.can_be_reset());

        view.reset_layout_to_default(false).unwrap();
        assert!(view.angle().is_zero());
        assert_eq!(view.image_crop_frame(), Rect::new(0.0, 0.0, 400.0, 300.0));
        assert!(!view.can_be_reset());
        assert_eq!(
            view.take_resettable_transitions(),
            vec![
                ResettableTransition::BecameResettable,
                ResettableTransition::BecameNonResettable
            ]
        );
    }

    #[test]
    fn test_reset_keeps_ratio_when_configured() {
        let mut config = CropViewConfig::default();
        config.reset_aspect_ratio_enabled = false;
        let mut view = view(config);
        view.perform_initial_setup(BOUNDS).unwrap();
        view.set_aspect_ratio(AspectRatio::SQUARE, false).unwrap();

        view.reset_layout_to_default(false).unwrap();
        let frame = view.crop_box_frame();
        assert!((frame.width - frame.height).abs() < 1e-6);
    }

    #[test]
    fn test_resize_latches_resettable_once() {
        let mut view = laid_out();
        let frame = view.crop_box_frame();
        let start = Point::new(frame.max_x() - 5.0, frame.mid_y());

        assert_eq!(view.begin_resize(start), Some(CropEdge::Right));
        for step in 1..10 {
            view.update_resize(Point::new(start.x - step as f64 * 5.0, start.y));
        }
        assert_eq!(view.end_resize(), Some(Duration::from_millis(800)));
        assert_eq!(
            view.take_resettable_transitions(),
            vec![ResettableTransition::BecameResettable]
        );

        view.pan_content(Point::new(2.0, 2.0));
        assert!(view.take_resettable_transitions().is_empty());
    }

    #[test]
    fn test_resize_cannot_outgrow_image() {
        let mut view = laid_out();
        let frame = view.crop_box_frame();
        let start = Point::new(frame.mid_x(), frame.max_y() - 5.0);

        assert_eq!(view.begin_resize(start), Some(CropEdge::Bottom));
        let resized = view.update_resize(Point::new(start.x, start.y + 200.0)).unwrap();
        assert!((resized.max_y() - frame.max_y()).abs() < 1e-9);
        view.end_resize();
    }

    #[test]
    fn test_settle_recenters_after_resize() {
        let mut view = laid_out();
        let frame = view.crop_box_frame();
        let start = Point::new(frame.max_x() - 5.0, frame.mid_y());

        view.begin_resize(start);
        view.update_resize(Point::new(start.x - 100.0, start.y));
        let region = view.image_crop_frame();
        view.end_resize();

        assert!(view.is_settle_pending());
        assert!(view.settle());
        assert!(!view.is_settle_pending());

        let settled = view.crop_box_frame();
        let workable = view.workable_region();
        assert!((settled.mid_x() - workable.mid_x()).abs() < 1e-6);
        assert!(view.image_crop_frame().approx_eq(&region, 1.0));
        assert!(view.grid_overlay_hidden());
    }

    #[test]
    fn test_four_rotations_at_maximum_zoom() {
        let mut view = laid_out();
        view.zoom_content(1000.0, view.crop_box_frame().center());
        assert!((view.zoom_scale() - view.viewport().maximum_zoom_scale()).abs() < 1e-9);
        let region = view.image_crop_frame();

        for _ in 0..4 {
            view.rotate_image_ninety_degrees(false, true).unwrap();
            assert!(view.zoom_scale() <= view.viewport().maximum_zoom_scale() + 1e-9);
            assert!(view.workable_region().contains_rect(&view.crop_box_frame()));
        }

        assert!(view.angle().is_zero());
        let after = view.image_crop_frame();
        assert!(after.approx_eq(&region, 1.0), "{:?} vs {:?}", after, region);
    }

    #[test]
    fn test_animation_gates_input() {
        let mut view = laid_out();
        view.rotate_image_ninety_degrees(true, false).unwrap();
        assert!(view.is_animating());

        assert_eq!(
            view.rotate_image_ninety_degrees(true, false),
            Err(SessionError::AnimationInFlight)
        );
        assert_eq!(view.reset_layout_to_default(false), Err(SessionError::AnimationInFlight));
        assert!(!view.pan_content(Point::new(1.0, 1.0)));

        assert_eq!(view.animation_did_finish(), Some(CropAnimation::Rotation));
        assert!(view.reset_layout_to_default(false).is_ok());
    }

    #[test]
    fn test_bounds_change_round_trip() {
        let mut view = laid_out();
        view.zoom_content(2.0, view.crop_box_frame().center());
        let region = view.image_crop_frame();

        view.prepare_for_rotation();
        view.perform_relayout_for_rotation(Size::new(480.0, 320.0));
        assert!(view.workable_region().contains_rect(&view.crop_box_frame()));
        assert!(view.image_crop_frame().approx_eq(&region, 1.0));

        view.prepare_for_rotation();
        view.perform_relayout_for_rotation(Size::new(480.0, 320.0));
        assert!(view.image_crop_frame().approx_eq(&region, 1.0));
    }

    #[test]
    fn test_bounds_change_keeps_untouched_layout_pristine() {
        let mut view = laid_out();
        view.prepare_for_rotation();
        view.perform_relayout_for_rotation(Size::new(480.0, 320.0));
        assert!(!view.can_be_reset());

        view.pan_content(Point::ZERO);
        assert!(!view.can_be_reset());
    }

    #[test]
    fn test_crop_insets_shrink_workable_region() {
        let mut config = CropViewConfig::default();
        config.crop_region_insets = crate::geometry::EdgeInsets::new(0.0, 0.0, 44.0, 0.0);
        let mut view = view(config);
        view.perform_initial_setup(BOUNDS).unwrap();
        assert_eq!(view.workable_region(), Rect::new(14.0, 14.0, 292.0, 408.0));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: a restored frame inside the image comes back within a pixel.
        #[test]
        fn prop_restore_frame_round_trip(
            x in 0u32..300,
            y in 0u32..200,
            w in 40u32..100,
            h in 40u32..100,
        ) {
            let frame = Rect::new(x as f64, y as f64, w as f64, h as f64);
            let mut view = CropView::new(Size::new(400.0, 300.0), CroppingStyle::Default, CropViewConfig::default());
            view.set_image_crop_frame(frame).unwrap();
            view.perform_initial_setup(Size::new(320.0, 480.0)).unwrap();

            let restored = view.image_crop_frame();
            prop_assert!(restored.approx_eq(&frame, 1.0), "{:?} vs {:?}", restored, frame);
        }

        /// Property: any applied ratio is matched and stays inside the region.
        #[test]
        fn prop_aspect_ratio_applied(
            rw in 1u32..20,
            rh in 1u32..20,
            width in 100u32..3000,
            height in 100u32..3000,
        ) {
            let mut view = CropView::new(
                Size::new(width as f64, height as f64),
                CroppingStyle::Default,
                CropViewConfig::default(),
            );
            view.perform_initial_setup(Size::new(375.0, 667.0)).unwrap();
            view.set_aspect_ratio(AspectRatio::new(rw as f64, rh as f64), false).unwrap();

            let frame = view.crop_box_frame();
            let expected = rw as f64 / rh as f64;
            // Boxes pinned at the minimum size can't honour extreme ratios
            let above_minimum = frame.width > MINIMUM_BOX_SIZE + 1e-6
                && frame.height > MINIMUM_BOX_SIZE + 1e-6;
            if above_minimum {
                prop_assert!((frame.width / frame.height - expected).abs() / expected < 1e-3);
            }
            prop_assert!(view.workable_region().contains_rect(&frame));
            prop_assert!(view.image_view_frame().inset(-1e-6, -1e-6).contains_rect(&frame));
        }
    }
}
