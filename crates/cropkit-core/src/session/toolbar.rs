//! Toolbar events and button state.

use serde::{Deserialize, Serialize};

use crate::config::{AspectRatioPreset, CropViewConfig, CroppingStyle};
use crate::render::CroppedImageProvider;

/// A toolbar button tap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolbarAction {
    Done,
    Cancel,
    Reset,
    RotateClockwise,
    RotateCounterclockwise,
    /// Open the aspect-ratio picker.
    AspectRatioPicker,
    /// The clamp button: toggle the aspect-ratio lock.
    ClampToggle,
}

/// What the host has to do after a toolbar tap.
#[derive(Debug)]
pub enum ToolbarResponse {
    /// Nothing beyond redrawing.
    None,
    /// Present a picker with these presets. `portrait` asks for the presets
    /// to be labelled in portrait form (9:16 rather than 16:9).
    ShowAspectRatioPicker {
        presets: Vec<AspectRatioPreset>,
        portrait: bool,
    },
    /// Ask the user before discarding edits.
    CancelConfirmationRequired,
    /// Present a share sheet for the provider, then call `finish_share`.
    ShowShareSheet(CroppedImageProvider),
    /// The observer has been told the outcome; dismiss.
    Finished,
}

/// Button state derived from the configuration and the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarVisibility {
    pub done_button_hidden: bool,
    pub cancel_button_hidden: bool,
    pub reset_button_hidden: bool,
    /// The clamp (aspect-ratio) button.
    pub clamp_button_hidden: bool,
    pub rotate_counterclockwise_button_hidden: bool,
    pub rotate_clockwise_button_hidden: bool,
    pub reset_button_enabled: bool,
    /// The clamp button is highlighted while a ratio is locked.
    pub clamp_button_glowing: bool,
}

impl ToolbarVisibility {
    pub fn compute(
        config: &CropViewConfig,
        style: CroppingStyle,
        resettable: bool,
        aspect_ratio_locked: bool,
    ) -> Self {
        let toolbar = &config.toolbar;
        let circular = style == CroppingStyle::Circular;

        // A locked ratio that reset won't clear leaves nothing to pick
        let ratio_fixed = config.aspect_ratio_lock_enabled && !config.reset_aspect_ratio_enabled;

        Self {
            done_button_hidden: toolbar.done_button_hidden,
            cancel_button_hidden: toolbar.cancel_button_hidden,
            reset_button_hidden: toolbar.reset_button_hidden,
            clamp_button_hidden: toolbar.aspect_ratio_picker_button_hidden || circular || ratio_fixed,
            rotate_counterclockwise_button_hidden: toolbar.rotate_buttons_hidden,
            rotate_clockwise_button_hidden: toolbar.rotate_buttons_hidden
                || toolbar.rotate_clockwise_button_hidden,
            reset_button_enabled: resettable,
            clamp_button_glowing: aspect_ratio_locked && !circular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_visibility() {
        let config = CropViewConfig::default();
        let visibility = ToolbarVisibility::compute(&config, CroppingStyle::Default, false, false);
        assert!(!visibility.clamp_button_hidden);
        assert!(!visibility.rotate_counterclockwise_button_hidden);
        assert!(visibility.rotate_clockwise_button_hidden);
        assert!(!visibility.reset_button_enabled);
    }

    #[test]
    fn test_clamp_hidden_for_circular() {
        let config = CropViewConfig::default();
        let visibility = ToolbarVisibility::compute(&config, CroppingStyle::Circular, true, true);
        assert!(visibility.clamp_button_hidden);
        assert!(!visibility.clamp_button_glowing);
        assert!(visibility.reset_button_enabled);
    }

    #[test]
    fn test_clamp_hidden_for_fixed_ratio() {
        let mut config = CropViewConfig::default();
        config.aspect_ratio_lock_enabled = true;
        config.reset_aspect_ratio_enabled = false;
        let visibility = ToolbarVisibility::compute(&config, CroppingStyle::Default, false, true);
        assert!(visibility.clamp_button_hidden);
    }

    #[test]
    fn test_rotate_buttons_hidden_together() {
        let mut config = CropViewConfig::default();
        config.toolbar.rotate_clockwise_button_hidden = false;
        let visibility = ToolbarVisibility::compute(&config, CroppingStyle::Default, false, false);
        assert!(!visibility.rotate_clockwise_button_hidden);

        config.toolbar.rotate_buttons_hidden = true;
        let visibility = ToolbarVisibility::compute(&config, CroppingStyle::Default, false, false);
        assert!(visibility.rotate_clockwise_button_hidden);
        assert!(visibility.rotate_counterclockwise_button_hidden);
    }
}
