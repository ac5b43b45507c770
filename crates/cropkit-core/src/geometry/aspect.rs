//! Width:height aspect ratios.

use serde::{Deserialize, Serialize};

use super::{Size, GEOMETRY_EPSILON};

/// A width:height ratio such as 16:9.
///
/// A ratio with a zero or negative component is *unconstrained*: it stands for
/// "whatever the image's own ratio is" and resolves against the image size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    /// The zero/zero sentinel.
    pub const UNCONSTRAINED: AspectRatio = AspectRatio {
        width: 0.0,
        height: 0.0,
    };

    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1.0,
        height: 1.0,
    };

    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_unconstrained(&self) -> bool {
        !(self.width > GEOMETRY_EPSILON && self.height > GEOMETRY_EPSILON)
    }

    /// Width divided by height, `None` when unconstrained.
    pub fn value(&self) -> Option<f64> {
        if self.is_unconstrained() {
            None
        } else {
            Some(self.width / self.height)
        }
    }

    pub fn swapped(self) -> Self {
        Self::new(self.height, self.width)
    }

    pub fn is_portrait(&self) -> bool {
        !self.is_unconstrained() && self.width < self.height
    }

    pub fn is_landscape(&self) -> bool {
        !self.is_unconstrained() && self.width > self.height
    }

    /// The ratio to lay out with: unconstrained ratios become the image's own.
    pub fn resolve(self, native: Size) -> AspectRatio {
        if self.is_unconstrained() {
            AspectRatio::new(native.width, native.height)
        } else {
            self
        }
    }

    /// Swap the ratio when its orientation disagrees with `image`'s.
    ///
    /// Square ratios and square images never swap.
    pub fn matched_to_orientation(self, image: Size) -> AspectRatio {
        let image_portrait = image.height > image.width;
        let image_landscape = image.width > image.height;
        if (self.is_landscape() && image_portrait) || (self.is_portrait() && image_landscape) {
            self.swapped()
        } else {
            self
        }
    }
}
