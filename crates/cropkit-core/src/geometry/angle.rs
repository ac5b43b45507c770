//! Quarter-turn rotation angles.

use serde::{Deserialize, Serialize};

use super::Size;

/// A clockwise rotation in 90° steps, always stored as 0, 90, 180 or 270.
///
/// Counter-clockwise rotations are represented by their clockwise equivalent
/// (-90° is 270°).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct RotationAngle(u16);

impl RotationAngle {
    pub const ZERO: RotationAngle = RotationAngle(0);

    /// Normalize any angle in degrees.
    ///
    /// Values that are not a multiple of 90 snap to the nearest quarter turn;
    /// the result wraps into `[0, 360)`.
    pub fn from_degrees(degrees: i64) -> Self {
        let quarters = (degrees as f64 / 90.0).round() as i64;
        RotationAngle((quarters.rem_euclid(4) * 90) as u16)
    }

    /// Degrees in `[0, 360)`.
    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Number of clockwise quarter turns, 0..=3.
    pub fn quarter_turns(self) -> u8 {
        (self.0 / 90) as u8
    }

    /// The angle after one more quarter turn.
    pub fn rotated(self, clockwise: bool) -> Self {
        let delta = if clockwise { 90 } else { -90 };
        Self::from_degrees(self.0 as i64 + delta)
    }

    /// Additive composition modulo 360.
    pub fn compose(self, other: RotationAngle) -> Self {
        Self::from_degrees(self.0 as i64 + other.0 as i64)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// 90° and 270° exchange width and height.
    pub fn swaps_dimensions(self) -> bool {
        self.0 == 90 || self.0 == 270
    }

    /// `size` as seen after applying this rotation.
    pub fn apply_to(self, size: Size) -> Size {
        if self.swaps_dimensions() {
            size.swapped()
        } else {
            size
        }
    }
}

impl From<i64> for RotationAngle {
    fn from(degrees: i64) -> Self {
        Self::from_degrees(degrees)
    }
}

impl From<RotationAngle> for i64 {
    fn from(angle: RotationAngle) -> Self {
        angle.0 as i64
    }
}
