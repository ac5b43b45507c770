//! Rendering the final cropped bitmap.
//!
//! The crop rectangle is expressed in the *rotated* image's pixel space: first
//! picture the whole image turned by `angle`, then cut `crop_rect` out of that.
//! Rather than rotating the full image, the rectangle is mapped back into the
//! source and only the pixels it covers are copied and turned.
//!
//! # Coordinate System
//!
//! - (0, 0) = top-left corner of the rotated image
//! - rotation is clockwise in quarter turns
//!
//! # Example
//!
//! ```ignore
//! // Crop a 100x100 region from a 400x300 image turned a quarter clockwise
//! let out = render(&bitmap, Rect::new(50.0, 50.0, 100.0, 100.0), RotationAngle::from_degrees(90), false);
//! assert_eq!((out.width(), out.height()), (100, 100));
//! ```

use image::imageops;
use image::RgbaImage;

use crate::bitmap::Bitmap;
use crate::geometry::{Rect, RotationAngle};

/// Pixel rectangle as `(x, y, width, height)`.
type PixelRect = (u32, u32, u32, u32);

/// Render `crop_rect` of `image` rotated by `angle`.
///
/// # Behavior
///
/// - The rectangle is clamped to the rotated image bounds and rounded to whole
///   pixels; the output is at least 1x1
/// - With `circular_clip` every pixel outside the inscribed ellipse of the
///   output is transparent
/// - The source's display scale is carried over
pub fn render(image: &Bitmap, crop_rect: Rect, angle: RotationAngle, circular_clip: bool) -> Bitmap {
    let turns = angle.quarter_turns();
    let rect = rotated_pixel_rect(image, crop_rect, angle);
    let (sx, sy, sw, sh) = source_rect(rect, turns, image.width(), image.height());

    let region = imageops::crop_imm(image.as_rgba_image(), sx, sy, sw, sh).to_image();
    let mut output = match turns {
        0 => region,
        1 => imageops::rotate90(&region),
        2 => imageops::rotate180(&region),
        _ => imageops::rotate270(&region),
    };

    if circular_clip {
        apply_circular_clip(&mut output);
    }

    log::debug!(
        "Rendered {}x{} crop at {}deg{}",
        output.width(),
        output.height(),
        angle.degrees(),
        if circular_clip { " (circular)" } else { "" }
    );

    Bitmap::from_rgba_image(output).with_scale(image.scale())
}

/// Output dimensions `render` produces for these arguments.
pub(crate) fn output_dimensions(image: &Bitmap, crop_rect: Rect, angle: RotationAngle) -> (u32, u32) {
    let (_, _, w, h) = rotated_pixel_rect(image, crop_rect, angle);
    (w, h)
}

/// `crop_rect` rounded to whole pixels inside the image turned by `angle`.
fn rotated_pixel_rect(image: &Bitmap, crop_rect: Rect, angle: RotationAngle) -> PixelRect {
    let (rotated_w, rotated_h) = if angle.swaps_dimensions() {
        (image.height(), image.width())
    } else {
        (image.width(), image.height())
    };
    pixel_rect(crop_rect, rotated_w, rotated_h)
}

/// Round `rect` to whole pixels inside a `width` x `height` image.
fn pixel_rect(rect: Rect, width: u32, height: u32) -> PixelRect {
    let max_x = width.saturating_sub(1) as f64;
    let max_y = height.saturating_sub(1) as f64;

    // NaN casts to 0
    let x = rect.x.round().clamp(0.0, max_x) as u32;
    let y = rect.y.round().clamp(0.0, max_y) as u32;
    let w = rect.width.round().max(1.0) as u32;
    let h = rect.height.round().max(1.0) as u32;

    (x, y, w.min(width - x).max(1), h.min(height - y).max(1))
}

/// Map a rectangle in rotated space back to the unrotated source.
///
/// For a clockwise quarter turn, rotated pixel `(x', y')` is source pixel
/// `(y', H - 1 - x')`; the other turns follow the same pattern.
fn source_rect(rect: PixelRect, turns: u8, width: u32, height: u32) -> PixelRect {
    let (x, y, w, h) = rect;
    match turns {
        0 => (x, y, w, h),
        1 => (y, height - x - w, h, w),
        2 => (width - x - w, height - y - h, w, h),
        _ => (width - y - h, x, h, w),
    }
}

/// Make every pixel outside the inscribed ellipse transparent.
///
/// Edge pixels get partial alpha over roughly one pixel so the circle is not
/// jagged.
fn apply_circular_clip(image: &mut RgbaImage) {
    let (width, height) = image.dimensions();
    let radius_x = width as f64 * 0.5;
    let radius_y = height as f64 * 0.5;
    let edge = 1.0 / radius_x.min(radius_y).max(1.0);

    for (px, py, pixel) in image.enumerate_pixels_mut() {
        let dx = (px as f64 + 0.5 - radius_x) / radius_x;
        let dy = (py as f64 + 0.5 - radius_y) / radius_y;
        let distance = (dx * dx + dy * dy).sqrt();

        let coverage = ((1.0 - distance) / edge + 0.5).clamp(0.0, 1.0);
        if coverage <= 0.0 {
            pixel.0 = [0, 0, 0, 0];
        } else if coverage < 1.0 {
            pixel.0[3] = (pixel.0[3] as f64 * coverage).round() as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A bitmap where every pixel encodes its position: (x, y, 0, 255).
    fn test_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&[x as u8, y as u8, 0, 255]);
            }
        }
        Bitmap::from_rgba(width, height, pixels).unwrap()
    }

    /// Like `test_bitmap`, but positions past 255 survive: the high bits of x
    /// and y go into the low and high nibble of blue.
    fn wide_test_bitmap(width: u32, height: u32) -> Bitmap {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let high = ((x >> 8) | ((y >> 8) << 4)) as u8;
                pixels.extend_from_slice(&[x as u8, y as u8, high, 255]);
            }
        }
        Bitmap::from_rgba(width, height, pixels).unwrap()
    }

    /// Source position encoded by `wide_test_bitmap`.
    fn position(pixel: [u8; 4]) -> (u32, u32) {
        let [r, g, b, _] = pixel;
        (r as u32 | ((b as u32 & 0x0f) << 8), g as u32 | ((b as u32 >> 4) << 8))
    }

    #[test]
    fn test_square_crop_of_landscape_image() {
        let bitmap = wide_test_bitmap(400, 300);
        let rect = Rect::new(50.0, 50.0, 100.0, 100.0);

        let out = render(&bitmap, rect, RotationAngle::ZERO, false);
        assert_eq!((out.width(), out.height()), (100, 100));
        assert_eq!(position(out.pixel(0, 0)), (50, 50));
        assert_eq!(position(out.pixel(99, 99)), (149, 149));

        // Rotated space is 300x400; the rect maps back to x in [50, 150), y in [150, 250)
        let out = render(&bitmap, rect, RotationAngle::from_degrees(90), false);
        assert_eq!((out.width(), out.height()), (100, 100));
        assert_eq!(position(out.pixel(0, 0)), (50, 249));
        assert_eq!(position(out.pixel(99, 0)), (50, 150));
        assert_eq!(position(out.pixel(0, 99)), (149, 249));
    }

    #[test]
    fn test_wide_positions_past_255() {
        let bitmap = wide_test_bitmap(400, 300);
        let out = render(&bitmap, Rect::new(380.0, 280.0, 20.0, 20.0), RotationAngle::ZERO, false);
        assert_eq!(position(out.pixel(0, 0)), (380, 280));
        assert_eq!(position(out.pixel(19, 19)), (399, 299));
    }

    #[test]
    fn test_unrotated_crop() {
        let bitmap = test_bitmap(200, 150);
        let out = render(&bitmap, Rect::new(50.0, 50.0, 100.0, 80.0), RotationAngle::ZERO, false);
        assert_eq!((out.width(), out.height()), (100, 80));
        assert_eq!(out.pixel(0, 0), [50, 50, 0, 255]);
        assert_eq!(out.pixel(99, 79), [149, 129, 0, 255]);
    }

    #[test]
    fn test_quarter_turn_clockwise() {
        let bitmap = test_bitmap(200, 150);
        // Rotated space is 150x200
        let out = render(
            &bitmap,
            Rect::new(50.0, 50.0, 100.0, 100.0),
            RotationAngle::from_degrees(90),
            false,
        );
        assert_eq!((out.width(), out.height()), (100, 100));

        // Source region is x in [50, 150), y in [0, 100).
        // After a clockwise turn its bottom-left pixel is the output's top-left.
        assert_eq!(out.pixel(0, 0), [50, 99, 0, 255]);
        assert_eq!(out.pixel(99, 0), [50, 0, 0, 255]);
        assert_eq!(out.pixel(0, 99), [149, 99, 0, 255]);
    }

    #[test]
    fn test_half_turn() {
        let bitmap = test_bitmap(200, 150);
        let out = render(
            &bitmap,
            Rect::new(0.0, 0.0, 10.0, 10.0),
            RotationAngle::from_degrees(180),
            false,
        );
        assert_eq!(out.pixel(0, 0), [199, 149, 0, 255]);
        assert_eq!(out.pixel(9, 9), [190, 140, 0, 255]);
    }

    #[test]
    fn test_quarter_turn_counterclockwise() {
        let bitmap = test_bitmap(200, 150);
        let out = render(
            &bitmap,
            Rect::new(0.0, 0.0, 150.0, 200.0),
            RotationAngle::from_degrees(270),
            false,
        );
        assert_eq!((out.width(), out.height()), (150, 200));
        // The source's top-right corner comes to the top-left
        assert_eq!(out.pixel(0, 0), [199, 0, 0, 255]);
        assert_eq!(out.pixel(149, 199), [0, 149, 0, 255]);
    }

    #[test]
    fn test_rect_clamped_to_bounds() {
        let bitmap = test_bitmap(100, 100);
        let out = render(
            &bitmap,
            Rect::new(80.0, -20.0, 50.0, 50.0),
            RotationAngle::ZERO,
            false,
        );
        assert_eq!((out.width(), out.height()), (20, 50));
        assert_eq!(out.pixel(0, 0), [80, 0, 0, 255]);
    }

    #[test]
    fn test_degenerate_rect_yields_one_pixel() {
        let bitmap = test_bitmap(10, 10);
        let out = render(&bitmap, Rect::new(3.0, 3.0, 0.0, f64::NAN), RotationAngle::ZERO, false);
        assert_eq!((out.width(), out.height()), (1, 1));
    }

    #[test]
    fn test_circular_clip() {
        let bitmap = test_bitmap(100, 100);
        let out = render(&bitmap, Rect::new(0.0, 0.0, 100.0, 100.0), RotationAngle::ZERO, true);

        assert_eq!(out.pixel(0, 0)[3], 0);
        assert_eq!(out.pixel(99, 0)[3], 0);
        assert_eq!(out.pixel(0, 99)[3], 0);
        assert_eq!(out.pixel(99, 99)[3], 0);
        assert_eq!(out.pixel(50, 50), [50, 50, 0, 255]);
        assert_eq!(out.pixel(50, 2)[3], 255);
    }

    #[test]
    fn test_scale_carried_over() {
        let bitmap = test_bitmap(20, 20).with_scale(3.0);
        let out = render(&bitmap, Rect::new(0.0, 0.0, 10.0, 10.0), RotationAngle::ZERO, false);
        assert_eq!(out.scale(), 3.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
