//! Configuration surface of a crop session.
//!
//! Everything here is plain data with serde support so hosts can pass it in as
//! JSON. Out-of-range values are clamped by [`CropViewConfig::sanitized`]
//! rather than rejected.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::{AspectRatio, EdgeInsets};

/// Shape of the crop region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CroppingStyle {
    /// The regular, resizable rectangular crop box.
    #[default]
    Default,
    /// A square crop box rendered and delivered as a circle.
    Circular,
}

/// The common aspect ratios offered by the aspect-ratio picker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectRatioPreset {
    /// The image's own ratio.
    #[default]
    Original,
    Square,
    Ratio3x2,
    Ratio5x3,
    Ratio4x3,
    Ratio5x4,
    Ratio7x5,
    Ratio16x9,
    Custom(AspectRatio),
}

impl AspectRatioPreset {
    /// Presets shown by the picker when no allow-list is configured.
    pub const STANDARD: [AspectRatioPreset; 8] = [
        AspectRatioPreset::Original,
        AspectRatioPreset::Square,
        AspectRatioPreset::Ratio3x2,
        AspectRatioPreset::Ratio5x3,
        AspectRatioPreset::Ratio4x3,
        AspectRatioPreset::Ratio5x4,
        AspectRatioPreset::Ratio7x5,
        AspectRatioPreset::Ratio16x9,
    ];

    /// The landscape form of this preset (`Original` is unconstrained).
    pub fn ratio(&self) -> AspectRatio {
        match self {
            AspectRatioPreset::Original => AspectRatio::UNCONSTRAINED,
            AspectRatioPreset::Square => AspectRatio::SQUARE,
            AspectRatioPreset::Ratio3x2 => AspectRatio::new(3.0, 2.0),
            AspectRatioPreset::Ratio5x3 => AspectRatio::new(5.0, 3.0),
            AspectRatioPreset::Ratio4x3 => AspectRatio::new(4.0, 3.0),
            AspectRatioPreset::Ratio5x4 => AspectRatio::new(5.0, 4.0),
            AspectRatioPreset::Ratio7x5 => AspectRatio::new(7.0, 5.0),
            AspectRatioPreset::Ratio16x9 => AspectRatio::new(16.0, 9.0),
            AspectRatioPreset::Custom(ratio) => *ratio,
        }
    }
}

/// Where the host places the toolbar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarPosition {
    #[default]
    Bottom,
    Top,
}

/// Host-chosen toolbar button visibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    pub position: ToolbarPosition,
    pub done_button_hidden: bool,
    pub cancel_button_hidden: bool,
    pub reset_button_hidden: bool,
    pub aspect_ratio_picker_button_hidden: bool,
    /// Hides both rotation buttons.
    pub rotate_buttons_hidden: bool,
    /// The clockwise button is an optional extra next to the counter-clockwise one.
    pub rotate_clockwise_button_hidden: bool,
    pub reverse_content_layout: bool,
    pub show_only_icons: bool,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            position: ToolbarPosition::Bottom,
            done_button_hidden: false,
            cancel_button_hidden: false,
            reset_button_hidden: false,
            aspect_ratio_picker_button_hidden: false,
            rotate_buttons_hidden: false,
            rotate_clockwise_button_hidden: true,
            reverse_content_layout: false,
            show_only_icons: false,
        }
    }
}

/// Default padding between the crop view's edge and the workable region.
pub const DEFAULT_CROP_VIEW_PADDING: f64 = 14.0;

/// Default maximum zoom, as a multiple of the initial fit scale.
pub const DEFAULT_MAXIMUM_ZOOM_SCALE: f64 = 15.0;

/// Default delay before the crop box settles after a resize gesture.
pub const DEFAULT_CROP_ADJUSTING_DELAY_SECS: f64 = 0.8;

/// Configuration of a crop view and its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropViewConfig {
    /// Padding around the workable region, in view points.
    pub crop_view_padding: f64,
    /// Extra insets that make room for accessory views (e.g. the toolbar).
    pub crop_region_insets: EdgeInsets,
    /// Seconds to wait after a resize before the crop box settles.
    pub crop_adjusting_delay_secs: f64,
    /// Maximum zoom as a multiple of the fit scale.
    pub maximum_zoom_scale: f64,
    /// Smallest short-side/long-side ratio a free resize may produce (0 disables).
    pub minimum_aspect_ratio: f64,
    /// Ratio applied during initial layout.
    pub aspect_ratio_preset: AspectRatioPreset,
    /// Lock the crop box to its current ratio while resizing.
    pub aspect_ratio_lock_enabled: bool,
    /// Swap preset ratios to match the image's orientation.
    pub aspect_ratio_lock_dimension_swap_enabled: bool,
    /// Whether reset also clears the aspect ratio.
    pub reset_aspect_ratio_enabled: bool,
    /// Whether the crop box edges can be dragged at all.
    pub crop_box_resize_enabled: bool,
    /// Hand a share-sheet provider to the host instead of delivering on done.
    pub show_activity_sheet_on_done: bool,
    /// Ask before discarding pending edits on cancel.
    pub show_cancel_confirmation_dialog: bool,
    /// Presets offered by the picker; `None` offers all standard presets.
    pub allowed_aspect_ratios: Option<Vec<AspectRatioPreset>>,
    pub toolbar: ToolbarConfig,
}

impl Default for CropViewConfig {
    fn default() -> Self {
        Self {
            crop_view_padding: DEFAULT_CROP_VIEW_PADDING,
            crop_region_insets: EdgeInsets::default(),
            crop_adjusting_delay_secs: DEFAULT_CROP_ADJUSTING_DELAY_SECS,
            maximum_zoom_scale: DEFAULT_MAXIMUM_ZOOM_SCALE,
            minimum_aspect_ratio: 0.0,
            aspect_ratio_preset: AspectRatioPreset::Original,
            aspect_ratio_lock_enabled: false,
            aspect_ratio_lock_dimension_swap_enabled: false,
            reset_aspect_ratio_enabled: true,
            crop_box_resize_enabled: true,
            show_activity_sheet_on_done: false,
            show_cancel_confirmation_dialog: false,
            allowed_aspect_ratios: None,
            toolbar: ToolbarConfig::default(),
        }
    }
}

impl CropViewConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp every numeric field into its meaningful range.
    pub fn sanitized(mut self) -> Self {
        self.crop_view_padding = finite_or(self.crop_view_padding, DEFAULT_CROP_VIEW_PADDING).max(0.0);
        self.crop_region_insets = self.crop_region_insets.non_negative();
        self.crop_adjusting_delay_secs =
            finite_or(self.crop_adjusting_delay_secs, DEFAULT_CROP_ADJUSTING_DELAY_SECS).max(0.0);
        self.maximum_zoom_scale =
            finite_or(self.maximum_zoom_scale, DEFAULT_MAXIMUM_ZOOM_SCALE).max(1.0);
        self.minimum_aspect_ratio = finite_or(self.minimum_aspect_ratio, 0.0).clamp(0.0, 1.0);
        self
    }

    pub fn crop_adjusting_delay(&self) -> Duration {
        Duration::from_secs_f64(self.crop_adjusting_delay_secs.max(0.0))
    }

    /// The presets the picker should offer, in display order.
    pub fn picker_presets(&self) -> Vec<AspectRatioPreset> {
        match &self.allowed_aspect_ratios {
            Some(allowed) if !allowed.is_empty() => allowed.clone(),
            _ => AspectRatioPreset::STANDARD.to_vec(),
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
