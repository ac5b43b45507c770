//! The crop session: the state machine a host drives.
//!
//! A session owns the source bitmap and a [`CropView`]. Hosts forward
//! gestures, layout passes and toolbar taps to it. It reports the outcome to
//! a [`CropObserver`] and refuses input that doesn't fit its current state.
//!
//! # Animations
//!
//! Operations called with `animated = true` (including all toolbar taps)
//! leave an animation in flight. Call [`CropSession::animation_did_finish`]
//! once the host has played it; until then edits fail with
//! [`SessionError::AnimationInFlight`].

mod observer;
mod state;
mod toolbar;

use std::sync::Arc;
use std::time::Duration;

pub use observer::{CallbackObserver, CropDelivery, CropObserver, NoopObserver};
pub use state::SessionState;
pub use toolbar::{ToolbarAction, ToolbarResponse, ToolbarVisibility};

use crate::bitmap::Bitmap;
use crate::config::{AspectRatioPreset, CropViewConfig, CroppingStyle};
use crate::crop_box::CropEdge;
use crate::crop_view::{CropAnimation, CropView, ResettableTransition};
use crate::error::SessionError;
use crate::geometry::{AspectRatio, Point, Rect, RotationAngle, Size};
use crate::render::{render, CroppedImageProvider, RenderJob};

/// Result of [`CropSession::commit`].
#[derive(Debug)]
pub enum CommitOutcome {
    /// The observer received the crop.
    Delivered,
    /// Present a share sheet, then call [`CropSession::finish_share`].
    ShareSheet(CroppedImageProvider),
}

/// Result of [`CropSession::cancel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// Ask the user, then call `confirm_cancel` or `dismiss_cancel_confirmation`.
    ConfirmationRequired,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommitStage {
    /// Waiting for the host to render off-thread.
    Rendering(CropDelivery),
    /// Waiting for the share sheet to close.
    Sharing,
}

pub struct CropSession {
    image: Arc<Bitmap>,
    style: CroppingStyle,
    crop_view: CropView,
    observer: Box<dyn CropObserver>,
    state: SessionState,
    toolbar: ToolbarVisibility,
    stage: Option<CommitStage>,
    cancel_confirmation_pending: bool,
}

impl std::fmt::Debug for CropSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CropSession")
            .field("style", &self.style)
            .field("state", &self.state)
            .field("crop_view", &self.crop_view)
            .field("stage", &self.stage)
            .finish_non_exhaustive()
    }
}

impl CropSession {
    pub fn new(
        image: impl Into<Arc<Bitmap>>,
        style: CroppingStyle,
        config: CropViewConfig,
        observer: Box<dyn CropObserver>,
    ) -> Self {
        let image = image.into();
        let crop_view = CropView::new(image.size(), style, config);
        let toolbar = ToolbarVisibility::compute(
            crop_view.config(),
            style,
            false,
            crop_view.aspect_ratio_lock_enabled(),
        );

        Self {
            image,
            style,
            crop_view,
            observer,
            state: SessionState::Initializing,
            toolbar,
            stage: None,
            cancel_confirmation_pending: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image(&self) -> &Arc<Bitmap> {
        &self.image
    }

    pub fn cropping_style(&self) -> CroppingStyle {
        self.style
    }

    pub fn crop_view(&self) -> &CropView {
        &self.crop_view
    }

    pub fn toolbar_visibility(&self) -> ToolbarVisibility {
        self.toolbar
    }

    pub fn can_be_reset(&self) -> bool {
        self.crop_view.can_be_reset()
    }

    pub fn is_cancel_confirmation_pending(&self) -> bool {
        self.cancel_confirmation_pending
    }

    // ------------------------------------------------------------------
    // Setup
    // ------------------------------------------------------------------

    /// Seed a previous crop to resume. Only valid before the first layout.
    pub fn set_restore(&mut self, image_crop_frame: Option<Rect>, angle: RotationAngle) -> Result<(), SessionError> {
        self.ensure_initializing()?;
        if let Some(frame) = image_crop_frame {
            self.crop_view.set_image_crop_frame(frame)?;
        }
        self.crop_view.set_restore_angle(angle)
    }

    pub fn perform_initial_setup(&mut self, bounds: Size) -> Result<(), SessionError> {
        self.ensure_initializing()?;
        self.crop_view.perform_initial_setup(bounds)?;
        self.transition(SessionState::LaidOut);
        self.sync();
        Ok(())
    }

    /// First half of a bounds change (e.g. a device rotation).
    pub fn prepare_for_bounds_change(&mut self) {
        if !self.state.is_terminal() {
            self.crop_view.prepare_for_rotation();
        }
    }

    /// Second half of a bounds change.
    pub fn complete_bounds_change(&mut self, bounds: Size) {
        if !self.state.is_terminal() {
            self.crop_view.perform_relayout_for_rotation(bounds);
            self.sync();
        }
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    pub fn begin_resize(&mut self, point: Point) -> Result<Option<CropEdge>, SessionError> {
        self.begin_edit()?;
        let edge = self.crop_view.begin_resize(point);
        self.sync();
        Ok(edge)
    }

    pub fn update_resize(&mut self, point: Point) -> Result<Option<Rect>, SessionError> {
        self.begin_edit()?;
        let frame = self.crop_view.update_resize(point);
        self.sync();
        Ok(frame)
    }

    /// Returns the delay after which to call [`settle`](Self::settle).
    pub fn end_resize(&mut self) -> Result<Option<Duration>, SessionError> {
        self.ensure_active()?;
        Ok(self.crop_view.end_resize())
    }

    pub fn begin_content_gesture(&mut self) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.begin_content_gesture();
        Ok(())
    }

    pub fn pan_content(&mut self, delta: Point) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.pan_content(delta);
        self.sync();
        Ok(())
    }

    pub fn zoom_content(&mut self, factor: f64, focus: Point) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.zoom_content(factor, focus);
        self.sync();
        Ok(())
    }

    pub fn end_content_gesture(&mut self) -> Result<Option<Duration>, SessionError> {
        self.ensure_active()?;
        Ok(self.crop_view.end_content_gesture())
    }

    /// Run a settle scheduled by `end_resize` or `end_content_gesture`.
    pub fn settle(&mut self) -> Result<bool, SessionError> {
        self.ensure_active()?;
        let settled = self.crop_view.settle();
        self.sync();
        Ok(settled)
    }

    // ------------------------------------------------------------------
    // Layout actions
    // ------------------------------------------------------------------

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio, animated: bool) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.set_aspect_ratio(ratio, animated)?;
        self.sync();
        Ok(())
    }

    /// Apply a picker choice. Any preset except `Original` locks the ratio.
    pub fn set_aspect_ratio_preset(&mut self, preset: AspectRatioPreset, animated: bool) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.set_aspect_ratio(preset.ratio(), animated)?;
        let locked = preset != AspectRatioPreset::Original || self.crop_view.config().aspect_ratio_lock_enabled;
        self.crop_view.set_aspect_ratio_lock_enabled(locked);
        self.sync();
        Ok(())
    }

    /// Flip the aspect-ratio lock. Returns the new lock state.
    pub fn toggle_aspect_ratio_lock(&mut self) -> Result<bool, SessionError> {
        self.begin_edit()?;
        let locked = !self.crop_view.aspect_ratio_lock_enabled();
        self.crop_view.set_aspect_ratio_lock_enabled(locked);
        self.sync();
        Ok(self.crop_view.aspect_ratio_lock_enabled())
    }

    pub fn rotate(&mut self, clockwise: bool, animated: bool) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.rotate_image_ninety_degrees(animated, clockwise)?;
        self.sync();
        Ok(())
    }

    pub fn reset(&mut self, animated: bool) -> Result<(), SessionError> {
        self.begin_edit()?;
        self.crop_view.reset_layout_to_default(animated)?;
        self.sync();
        Ok(())
    }

    pub fn animation_did_finish(&mut self) -> Option<CropAnimation> {
        self.crop_view.animation_did_finish()
    }

    // ------------------------------------------------------------------
    // Toolbar
    // ------------------------------------------------------------------

    pub fn handle_toolbar_action(&mut self, action: ToolbarAction) -> Result<ToolbarResponse, SessionError> {
        log::debug!("Toolbar action {:?} in {:?}", action, self.state);
        match action {
            ToolbarAction::Done => match self.commit()? {
                CommitOutcome::Delivered => Ok(ToolbarResponse::Finished),
                CommitOutcome::ShareSheet(provider) => Ok(ToolbarResponse::ShowShareSheet(provider)),
            },
            ToolbarAction::Cancel => match self.cancel()? {
                CancelOutcome::ConfirmationRequired => Ok(ToolbarResponse::CancelConfirmationRequired),
                CancelOutcome::Cancelled => Ok(ToolbarResponse::Finished),
            },
            ToolbarAction::Reset => {
                self.reset(true)?;
                Ok(ToolbarResponse::None)
            }
            ToolbarAction::RotateClockwise => {
                self.rotate(true, true)?;
                Ok(ToolbarResponse::None)
            }
            ToolbarAction::RotateCounterclockwise => {
                self.rotate(false, true)?;
                Ok(ToolbarResponse::None)
            }
            ToolbarAction::AspectRatioPicker => {
                self.ensure_editable()?;
                Ok(ToolbarResponse::ShowAspectRatioPicker {
                    presets: self.crop_view.config().picker_presets(),
                    portrait: self.crop_view.crop_box_aspect_ratio_is_portrait(),
                })
            }
            ToolbarAction::ClampToggle => {
                self.toggle_aspect_ratio_lock()?;
                Ok(ToolbarResponse::None)
            }
        }
    }

    // ------------------------------------------------------------------
    // Commit
    // ------------------------------------------------------------------

    /// A render request for the current crop.
    pub fn render_job(&self, circular_clip: bool) -> RenderJob {
        RenderJob::new(
            Arc::clone(&self.image),
            self.crop_view.image_crop_frame(),
            self.crop_view.angle(),
            circular_clip,
        )
    }

    /// Freeze the crop and deliver it, rendering on the calling thread.
    pub fn commit(&mut self) -> Result<CommitOutcome, SessionError> {
        self.ensure_editable()?;
        self.crop_view.end_resize();
        self.cancel_confirmation_pending = false;

        if self.crop_view.config().show_activity_sheet_on_done {
            let provider =
                CroppedImageProvider::new(self.render_job(self.style == CroppingStyle::Circular));
            self.stage = Some(CommitStage::Sharing);
            self.transition(SessionState::Committing);
            return Ok(CommitOutcome::ShareSheet(provider));
        }

        self.transition(SessionState::Committing);
        let delivery = self.observer.crop_delivery(self.style);
        self.deliver(delivery, None);
        Ok(CommitOutcome::Delivered)
    }

    /// Freeze the crop, leaving the render to the host.
    ///
    /// Returns the job to render (for example with `render_in_background`)
    /// and hand back via [`deliver_rendered`](Self::deliver_rendered), or
    /// `None` when the observer only wants the rectangle, which has then
    /// already been delivered.
    pub fn commit_deferred(&mut self) -> Result<Option<RenderJob>, SessionError> {
        self.ensure_editable()?;
        self.crop_view.end_resize();
        self.cancel_confirmation_pending = false;
        self.transition(SessionState::Committing);

        let delivery = self.observer.crop_delivery(self.style);
        if delivery == CropDelivery::Rect {
            self.deliver(delivery, None);
            return Ok(None);
        }

        self.stage = Some(CommitStage::Rendering(delivery));
        Ok(Some(self.render_job(delivery == CropDelivery::CircularImage)))
    }

    /// Hand back the bitmap rendered for [`commit_deferred`](Self::commit_deferred).
    pub fn deliver_rendered(&mut self, image: Bitmap) -> Result<(), SessionError> {
        match self.stage {
            Some(CommitStage::Rendering(delivery)) => {
                self.stage = None;
                self.deliver(delivery, Some(image));
                Ok(())
            }
            _ => Err(SessionError::NoCommitInProgress),
        }
    }

    /// The share sheet closed. A completed share ends the session.
    pub fn finish_share(&mut self, completed: bool) -> Result<(), SessionError> {
        if self.stage != Some(CommitStage::Sharing) {
            return Err(SessionError::NoCommitInProgress);
        }
        self.stage = None;
        if completed {
            self.observer.did_finish_cancelled(false);
            self.transition(SessionState::Committed);
        } else {
            self.transition(SessionState::editing(self.crop_view.can_be_reset()));
        }
        Ok(())
    }

    fn deliver(&mut self, delivery: CropDelivery, rendered: Option<Bitmap>) {
        let rect = self.crop_view.image_crop_frame();
        let angle = self.crop_view.angle();
        log::debug!("Delivering {:?} for {:?} at {}deg", delivery, rect, angle.degrees());

        match delivery {
            CropDelivery::Rect => self.observer.did_crop_to_rect(rect, angle),
            CropDelivery::Image => {
                let image = rendered.unwrap_or_else(|| render(&self.image, rect, angle, false));
                self.observer.did_crop_to_image(image, rect, angle);
            }
            CropDelivery::CircularImage => {
                let image = rendered.unwrap_or_else(|| render(&self.image, rect, angle, true));
                self.observer.did_crop_to_circular_image(image, rect, angle);
            }
        }
        self.transition(SessionState::Committed);
    }

    // ------------------------------------------------------------------
    // Cancel
    // ------------------------------------------------------------------

    pub fn cancel(&mut self) -> Result<CancelOutcome, SessionError> {
        if self.state.is_terminal() {
            return Err(SessionError::Finished);
        }

        let needs_confirmation = self.crop_view.config().show_cancel_confirmation_dialog
            && self.crop_view.can_be_reset()
            && self.state.accepts_edits();
        if needs_confirmation && !self.cancel_confirmation_pending {
            self.cancel_confirmation_pending = true;
            return Ok(CancelOutcome::ConfirmationRequired);
        }

        self.finish_cancel();
        Ok(CancelOutcome::Cancelled)
    }

    pub fn confirm_cancel(&mut self) -> Result<(), SessionError> {
        if !self.cancel_confirmation_pending {
            return Err(SessionError::NoCancelPending);
        }
        self.finish_cancel();
        Ok(())
    }

    pub fn dismiss_cancel_confirmation(&mut self) {
        self.cancel_confirmation_pending = false;
    }

    fn finish_cancel(&mut self) {
        self.cancel_confirmation_pending = false;
        self.stage = None;
        self.observer.did_finish_cancelled(true);
        self.transition(SessionState::Cancelled);
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn transition(&mut self, state: SessionState) {
        if self.state != state {
            log::debug!("Crop session {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn ensure_initializing(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Initializing => Ok(()),
            state if state.accepts_edits() => Err(SessionError::AlreadyLaidOut),
            _ => Err(SessionError::Finished),
        }
    }

    /// Laid out and not finished. Animations don't matter.
    fn ensure_active(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Initializing => Err(SessionError::NotLaidOut),
            state if state.accepts_edits() => Ok(()),
            _ => Err(SessionError::Finished),
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        self.ensure_active()?;
        if self.crop_view.is_animating() {
            return Err(SessionError::AnimationInFlight);
        }
        Ok(())
    }

    fn begin_edit(&mut self) -> Result<(), SessionError> {
        self.ensure_editable()?;
        if self.state == SessionState::LaidOut {
            self.transition(SessionState::editing(self.crop_view.can_be_reset()));
        }
        Ok(())
    }

    /// Forward resettable edges and toolbar changes to the observer.
    fn sync(&mut self) {
        for transition in self.crop_view.take_resettable_transitions() {
            match transition {
                ResettableTransition::BecameResettable => self.observer.did_become_resettable(),
                ResettableTransition::BecameNonResettable => {
                    self.observer.did_become_non_resettable()
                }
            }
        }

        if matches!(
            self.state,
            SessionState::Editing | SessionState::ResettableEditing
        ) {
            self.transition(SessionState::editing(self.crop_view.can_be_reset()));
        }

        let toolbar = ToolbarVisibility::compute(
            self.crop_view.config(),
            self.style,
            self.crop_view.can_be_reset(),
            self.crop_view.aspect_ratio_lock_enabled(),
        );
        if toolbar != self.toolbar {
            self.toolbar = toolbar;
            self.observer.toolbar_visibility_changed(&toolbar);
        }
    }
}
