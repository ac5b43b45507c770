//! WASM bindings for an interactive crop session.
//!
//! `JsCropSession` wraps the core `CropSession`. The host forwards pointer
//! gestures, layout passes and toolbar taps, reads back the frames it has to
//! draw, and receives the result through callbacks registered with the
//! `on_*` setters.
//!
//! # Example (TypeScript)
//!
//! ```typescript
//! const bitmap = new JsBitmap(width, height, imageData.data);
//! const session = new JsCropSession(bitmap, false, { aspect_ratio_preset: 'square' });
//! session.on_crop_to_image((image, result) => upload(image.pixels(), result.rect));
//! session.perform_initial_setup(container.clientWidth, container.clientHeight);
//!
//! const edge = session.begin_resize(x, y);
//! session.update_resize(x + 20, y);
//! const delayMs = session.end_resize();
//! setTimeout(() => session.settle(), delayMs);
//!
//! const response = session.toolbar_action('rotate_counterclockwise');
//! animate(session.crop_box_frame()).then(() => session.animation_did_finish());
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use cropkit_core::{
    AspectRatio, AspectRatioPreset, Bitmap, CancelOutcome, CommitOutcome, CropDelivery,
    CropObserver, CropSession, CropViewConfig, CroppedImageProvider, CroppingStyle,
    PlaceholderItem, Point, Rect, RotationAngle, SessionError, SessionState, Size,
    ToolbarAction, ToolbarResponse, ToolbarVisibility,
};
use js_sys::Function;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::types::{edge_name, JsBitmap, JsCropResult};

fn to_js_error(e: SessionError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn duration_ms(delay: Duration) -> f64 {
    delay.as_secs_f64() * 1000.0
}

fn parse_config(config: JsValue) -> Result<CropViewConfig, JsValue> {
    if config.is_undefined() || config.is_null() {
        return Ok(CropViewConfig::default());
    }
    serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// JavaScript callbacks, shared between the session wrapper and its observer.
#[derive(Default)]
struct JsCallbacks {
    on_crop_to_rect: Option<Function>,
    on_crop_to_image: Option<Function>,
    on_crop_to_circular_image: Option<Function>,
    on_finish: Option<Function>,
    on_resettable_changed: Option<Function>,
    on_toolbar_changed: Option<Function>,
}

struct JsObserver {
    callbacks: Rc<RefCell<JsCallbacks>>,
}

impl JsObserver {
    fn notify(&self, pick: impl Fn(&JsCallbacks) -> Option<&Function>, args: &[JsValue]) {
        // Cloned out so a callback can re-register callbacks
        let Some(callback) = pick(&*self.callbacks.borrow()).cloned() else {
            return;
        };
        let result = match args {
            [] => callback.call0(&JsValue::NULL),
            [a] => callback.call1(&JsValue::NULL, a),
            [a, b, ..] => callback.call2(&JsValue::NULL, a, b),
        };
        if let Err(e) = result {
            log::error!("Crop callback threw: {:?}", e);
        }
    }

    fn crop_result(rect: Rect, angle: RotationAngle) -> JsValue {
        match to_js(&JsCropResult::new(rect, angle)) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Failed to convert crop result: {:?}", e);
                JsValue::UNDEFINED
            }
        }
    }
}

impl CropObserver for JsObserver {
    fn crop_delivery(&self, style: CroppingStyle) -> CropDelivery {
        let callbacks = self.callbacks.borrow();
        CropDelivery::from_callbacks(
            style,
            callbacks.on_crop_to_circular_image.is_some(),
            callbacks.on_crop_to_image.is_some(),
        )
    }

    fn did_crop_to_rect(&mut self, rect: Rect, angle: RotationAngle) {
        self.notify(|c| c.on_crop_to_rect.as_ref(), &[Self::crop_result(rect, angle)]);
    }

    fn did_crop_to_image(&mut self, image: Bitmap, rect: Rect, angle: RotationAngle) {
        let image = JsValue::from(JsBitmap::from_bitmap(image));
        self.notify(|c| c.on_crop_to_image.as_ref(), &[image, Self::crop_result(rect, angle)]);
    }

    fn did_crop_to_circular_image(&mut self, image: Bitmap, rect: Rect, angle: RotationAngle) {
        let image = JsValue::from(JsBitmap::from_bitmap(image));
        self.notify(
            |c| c.on_crop_to_circular_image.as_ref(),
            &[image, Self::crop_result(rect, angle)],
        );
    }

    fn did_finish_cancelled(&mut self, cancelled: bool) {
        self.notify(|c| c.on_finish.as_ref(), &[JsValue::from_bool(cancelled)]);
    }

    fn did_become_resettable(&mut self) {
        self.notify(|c| c.on_resettable_changed.as_ref(), &[JsValue::TRUE]);
    }

    fn did_become_non_resettable(&mut self) {
        self.notify(|c| c.on_resettable_changed.as_ref(), &[JsValue::FALSE]);
    }

    fn toolbar_visibility_changed(&mut self, visibility: &ToolbarVisibility) {
        if self.callbacks.borrow().on_toolbar_changed.is_none() {
            return;
        }
        match to_js(visibility) {
            Ok(value) => self.notify(|c| c.on_toolbar_changed.as_ref(), &[value]),
            Err(e) => log::error!("Failed to convert toolbar state: {:?}", e),
        }
    }
}

/// What the host has to do after a tap, as a tagged object.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JsToolbarResponse {
    None,
    ShowAspectRatioPicker {
        presets: Vec<AspectRatioPreset>,
        portrait: bool,
    },
    CancelConfirmationRequired,
    /// The provider is kept by the session; see `share_item`.
    ShowShareSheet {
        placeholder: PlaceholderItem,
    },
    Finished,
}

/// An interactive crop session for JavaScript.
///
/// Frames are returned as `{ x, y, width, height }` objects in view points,
/// except `image_crop_frame` which is in image pixels.
#[wasm_bindgen]
pub struct JsCropSession {
    inner: CropSession,
    callbacks: Rc<RefCell<JsCallbacks>>,
    share: Option<CroppedImageProvider>,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session over `image`.
    ///
    /// # Arguments
    /// * `image` - Source bitmap (copied into the session)
    /// * `circular` - Use the circular cropping style
    /// * `config` - Configuration object; `undefined` uses the defaults
    #[wasm_bindgen(constructor)]
    pub fn new(image: &JsBitmap, circular: bool, config: JsValue) -> Result<JsCropSession, JsValue> {
        let style = if circular {
            CroppingStyle::Circular
        } else {
            CroppingStyle::Default
        };
        Ok(Self::with_config(image.as_bitmap().clone(), style, parse_config(config)?))
    }

    // ------------------------------------------------------------------
    // Callbacks
    // ------------------------------------------------------------------

    /// `(result: { rect, angle }) => void`
    pub fn on_crop_to_rect(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_crop_to_rect = Some(callback);
    }

    /// `(image: JsBitmap, result: { rect, angle }) => void`
    pub fn on_crop_to_image(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_crop_to_image = Some(callback);
    }

    /// `(image: JsBitmap, result: { rect, angle }) => void`
    pub fn on_crop_to_circular_image(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_crop_to_circular_image = Some(callback);
    }

    /// `(cancelled: boolean) => void`
    pub fn on_finish(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_finish = Some(callback);
    }

    /// `(resettable: boolean) => void`
    pub fn on_resettable_changed(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_resettable_changed = Some(callback);
    }

    /// `(visibility: ToolbarVisibility) => void`
    pub fn on_toolbar_changed(&mut self, callback: Function) {
        self.callbacks.borrow_mut().on_toolbar_changed = Some(callback);
    }

    // ------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------

    /// Seed a previous crop (`{ x, y, width, height }` in image pixels, or
    /// `null`) and angle in degrees. Only valid before the first layout.
    pub fn set_restore(&mut self, image_crop_frame: JsValue, angle: i32) -> Result<(), JsValue> {
        let frame: Option<Rect> = if image_crop_frame.is_undefined() || image_crop_frame.is_null() {
            None
        } else {
            Some(
                serde_wasm_bindgen::from_value(image_crop_frame)
                    .map_err(|e| JsValue::from_str(&e.to_string()))?,
            )
        };
        self.inner
            .set_restore(frame, RotationAngle::from_degrees(angle as i64))
            .map_err(to_js_error)
    }

    pub fn perform_initial_setup(&mut self, width: f64, height: f64) -> Result<(), JsValue> {
        self.inner
            .perform_initial_setup(Size::new(width, height))
            .map_err(to_js_error)
    }

    /// Call before the container resizes (e.g. on orientation change).
    pub fn prepare_for_bounds_change(&mut self) {
        self.inner.prepare_for_bounds_change();
    }

    pub fn complete_bounds_change(&mut self, width: f64, height: f64) {
        self.inner.complete_bounds_change(Size::new(width, height));
    }

    // ------------------------------------------------------------------
    // Gestures
    // ------------------------------------------------------------------

    /// Start an edge drag. Returns the grabbed edge (`"top_left"`, `"right"`,
    /// ...) or `undefined` when the point misses the crop box handles.
    pub fn begin_resize(&mut self, x: f64, y: f64) -> Result<Option<String>, JsValue> {
        let edge = self.inner.begin_resize(Point::new(x, y)).map_err(to_js_error)?;
        Ok(edge.map(|edge| edge_name(edge).to_string()))
    }

    /// Returns the new crop box frame, or `undefined` without an active drag.
    pub fn update_resize(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        match self.inner.update_resize(Point::new(x, y)).map_err(to_js_error)? {
            Some(frame) => to_js(&frame),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Returns the delay in milliseconds before `settle` should be called.
    pub fn end_resize(&mut self) -> Result<Option<f64>, JsValue> {
        let delay = self.inner.end_resize().map_err(to_js_error)?;
        Ok(delay.map(duration_ms))
    }

    pub fn begin_content_gesture(&mut self) -> Result<(), JsValue> {
        self.inner.begin_content_gesture().map_err(to_js_error)
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), JsValue> {
        self.inner.pan_content(Point::new(dx, dy)).map_err(to_js_error)
    }

    /// Pinch by `factor` around the view point (`focus_x`, `focus_y`).
    pub fn zoom(&mut self, factor: f64, focus_x: f64, focus_y: f64) -> Result<(), JsValue> {
        self.inner
            .zoom_content(factor, Point::new(focus_x, focus_y))
            .map_err(to_js_error)
    }

    /// Returns the delay in milliseconds before `settle` should be called.
    pub fn end_content_gesture(&mut self) -> Result<Option<f64>, JsValue> {
        let delay = self.inner.end_content_gesture().map_err(to_js_error)?;
        Ok(delay.map(duration_ms))
    }

    /// Recenter the crop box after a gesture. Returns whether anything moved.
    pub fn settle(&mut self) -> Result<bool, JsValue> {
        self.inner.settle().map_err(to_js_error)
    }

    // ------------------------------------------------------------------
    // Edits
    // ------------------------------------------------------------------

    /// Constrain to `width:height`; `0:0` removes the constraint.
    pub fn set_aspect_ratio(&mut self, width: f64, height: f64, animated: bool) -> Result<(), JsValue> {
        self.inner
            .set_aspect_ratio(AspectRatio::new(width, height), animated)
            .map_err(to_js_error)
    }

    /// Apply a preset picked from `show_aspect_ratio_picker`, e.g. `"ratio16x9"`.
    pub fn set_aspect_ratio_preset(&mut self, preset: JsValue, animated: bool) -> Result<(), JsValue> {
        let preset: AspectRatioPreset =
            serde_wasm_bindgen::from_value(preset).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner
            .set_aspect_ratio_preset(preset, animated)
            .map_err(to_js_error)
    }

    /// Returns whether the ratio is now locked.
    pub fn toggle_aspect_ratio_lock(&mut self) -> Result<bool, JsValue> {
        self.inner.toggle_aspect_ratio_lock().map_err(to_js_error)
    }

    pub fn rotate(&mut self, clockwise: bool, animated: bool) -> Result<(), JsValue> {
        self.inner.rotate(clockwise, animated).map_err(to_js_error)
    }

    pub fn reset(&mut self, animated: bool) -> Result<(), JsValue> {
        self.inner.reset(animated).map_err(to_js_error)
    }

    /// The host finished playing the last animation.
    pub fn animation_did_finish(&mut self) {
        self.inner.animation_did_finish();
    }

    /// Handle a toolbar tap such as `"done"` or `"rotate_clockwise"`.
    ///
    /// Returns `{ kind, ... }` telling the host what to present next.
    pub fn toolbar_action(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: ToolbarAction =
            serde_wasm_bindgen::from_value(action).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let response = self.inner.handle_toolbar_action(action).map_err(to_js_error)?;
        to_js(&self.keep_response(response))
    }

    // ------------------------------------------------------------------
    // Commit and cancel
    // ------------------------------------------------------------------

    /// Deliver the crop through the registered callbacks.
    ///
    /// Returns `{ kind: "finished" }`, or `{ kind: "show_share_sheet", ... }`
    /// when the configuration asks for a share sheet.
    pub fn commit(&mut self) -> Result<JsValue, JsValue> {
        let response = match self.inner.commit().map_err(to_js_error)? {
            CommitOutcome::Delivered => ToolbarResponse::Finished,
            CommitOutcome::ShareSheet(provider) => ToolbarResponse::ShowShareSheet(provider),
        };
        to_js(&self.keep_response(response))
    }

    /// The rendered bitmap for an open share sheet, rendered on first access.
    pub fn share_item(&self) -> Option<JsBitmap> {
        self.share
            .as_ref()
            .map(|provider| JsBitmap::from_bitmap(provider.item().clone()))
    }

    /// The share sheet closed; `completed` ends the session.
    pub fn finish_share(&mut self, completed: bool) -> Result<(), JsValue> {
        self.inner.finish_share(completed).map_err(to_js_error)?;
        self.share = None;
        Ok(())
    }

    /// Returns `true` if the user has to confirm first.
    pub fn cancel(&mut self) -> Result<bool, JsValue> {
        let outcome = self.inner.cancel().map_err(to_js_error)?;
        if outcome == CancelOutcome::Cancelled {
            self.share = None;
        }
        Ok(outcome == CancelOutcome::ConfirmationRequired)
    }

    pub fn confirm_cancel(&mut self) -> Result<(), JsValue> {
        self.inner.confirm_cancel().map_err(to_js_error)?;
        self.share = None;
        Ok(())
    }

    pub fn dismiss_cancel_confirmation(&mut self) {
        self.inner.dismiss_cancel_confirmation();
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    /// Current lifecycle state, e.g. `"resettable_editing"`.
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_name(self.inner.state()).to_string()
    }

    pub fn crop_box_frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_view().crop_box_frame())
    }

    /// The crop rectangle in image pixels.
    pub fn image_crop_frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_view().image_crop_frame())
    }

    /// Where to draw the (rotated) image.
    pub fn image_view_frame(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.crop_view().image_view_frame())
    }

    pub fn toolbar_visibility(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.toolbar_visibility())
    }

    #[wasm_bindgen(getter)]
    pub fn angle(&self) -> u16 {
        self.inner.crop_view().angle().degrees()
    }

    #[wasm_bindgen(getter)]
    pub fn zoom_scale(&self) -> f64 {
        self.inner.crop_view().zoom_scale()
    }

    #[wasm_bindgen(getter)]
    pub fn can_be_reset(&self) -> bool {
        self.inner.can_be_reset()
    }

    #[wasm_bindgen(getter)]
    pub fn grid_overlay_hidden(&self) -> bool {
        self.inner.crop_view().grid_overlay_hidden()
    }

    #[wasm_bindgen(getter)]
    pub fn aspect_ratio_locked(&self) -> bool {
        self.inner.crop_view().aspect_ratio_lock_enabled()
    }

    #[wasm_bindgen(getter)]
    pub fn is_animating(&self) -> bool {
        self.inner.crop_view().is_animating()
    }
}

impl JsCropSession {
    fn with_config(image: Bitmap, style: CroppingStyle, config: CropViewConfig) -> Self {
        let callbacks = Rc::new(RefCell::new(JsCallbacks::default()));
        let observer = JsObserver {
            callbacks: Rc::clone(&callbacks),
        };
        Self {
            inner: CropSession::new(image, style, config, Box::new(observer)),
            callbacks,
            share: None,
        }
    }

    /// Convert a response for JavaScript, keeping any share provider.
    fn keep_response(&mut self, response: ToolbarResponse) -> JsToolbarResponse {
        match response {
            ToolbarResponse::None => JsToolbarResponse::None,
            ToolbarResponse::ShowAspectRatioPicker { presets, portrait } => {
                JsToolbarResponse::ShowAspectRatioPicker { presets, portrait }
            }
            ToolbarResponse::CancelConfirmationRequired => JsToolbarResponse::CancelConfirmationRequired,
            ToolbarResponse::ShowShareSheet(provider) => {
                let placeholder = provider.placeholder();
                self.share = Some(provider);
                JsToolbarResponse::ShowShareSheet { placeholder }
            }
            ToolbarResponse::Finished => JsToolbarResponse::Finished,
        }
    }
}

fn state_name(state: SessionState) -> &'static str {
    match state {
        SessionState::Initializing => "initializing",
        SessionState::LaidOut => "laid_out",
        SessionState::Editing => "editing",
        SessionState::ResettableEditing => "resettable_editing",
        SessionState::Committing => "committing",
        SessionState::Committed => "committed",
        SessionState::Cancelled => "cancelled",
    }
}
