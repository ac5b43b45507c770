//! WASM-compatible wrapper types for bitmaps and crop geometry.
//!
//! This module provides JavaScript-friendly types that wrap the core cropkit types,
//! handling the conversion between Rust and JavaScript data representations.

use cropkit_core::{Bitmap, CropEdge, Rect, RotationAngle};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// An RGBA bitmap wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy is made
/// to JavaScript memory as a `Uint8Array`, laid out like `ImageData.data`.
///
/// The `free()` method can be called to explicitly release WASM memory, but this is
/// optional as wasm-bindgen's finalizer will handle cleanup automatically.
#[wasm_bindgen]
pub struct JsBitmap {
    inner: Bitmap,
}

#[wasm_bindgen]
impl JsBitmap {
    /// Create a new JsBitmap from dimensions and pixel data.
    ///
    /// # Arguments
    /// * `width` - Bitmap width in pixels
    /// * `height` - Bitmap height in pixels
    /// * `pixels` - RGBA pixel data (4 bytes per pixel, row-major order)
    ///
    /// # Errors
    /// Throws if the buffer length doesn't match the dimensions.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsBitmap, JsValue> {
        Bitmap::from_rgba(width, height, pixels)
            .map(Self::from_bitmap)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Decode a JPEG or PNG file.
    ///
    /// # Errors
    /// Throws if the bytes are not a readable image.
    pub fn decode(bytes: &[u8]) -> Result<JsBitmap, JsValue> {
        Bitmap::decode(bytes)
            .map(Self::from_bitmap)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Get the bitmap width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    /// Get the bitmap height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Pixels per point, carried from the source through the crop.
    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.inner.scale()
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns RGBA pixel data as Uint8Array.
    ///
    /// Note: This creates a copy of the pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.as_raw().to_vec()
    }

    /// Encode as PNG bytes, e.g. for a download or share target.
    pub fn encode_png(&self) -> Result<Vec<u8>, JsValue> {
        self.inner
            .encode_png()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Return a copy that reports `scale` pixels per point.
    pub fn with_scale(&self, scale: f64) -> JsBitmap {
        Self::from_bitmap(self.inner.clone().with_scale(scale))
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsBitmap {
    pub(crate) fn from_bitmap(inner: Bitmap) -> Self {
        Self { inner }
    }

    pub(crate) fn as_bitmap(&self) -> &Bitmap {
        &self.inner
    }
}

/// A crop result as handed to JavaScript callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub(crate) struct JsCropResult {
    pub rect: Rect,
    pub angle: u16,
}

impl JsCropResult {
    pub(crate) fn new(rect: Rect, angle: RotationAngle) -> Self {
        Self {
            rect,
            angle: angle.degrees(),
        }
    }
}

/// Name of a crop box edge as seen by JavaScript.
pub(crate) fn edge_name(edge: CropEdge) -> &'static str {
    match edge {
        CropEdge::Top => "top",
        CropEdge::Bottom => "bottom",
        CropEdge::Left => "left",
        CropEdge::Right => "right",
        CropEdge::TopLeft => "top_left",
        CropEdge::TopRight => "top_right",
        CropEdge::BottomLeft => "bottom_left",
        CropEdge::BottomRight => "bottom_right",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_bitmap_creation() {
        let img = JsBitmap::from_bitmap(Bitmap::from_rgba(100, 50, vec![0u8; 100 * 50 * 4]).unwrap());
        assert_eq!(img.width(), 100);
        assert_eq!(img.height(), 50);
        assert_eq!(img.byte_length(), 20000);
        assert_eq!(img.scale(), 1.0);
    }

    #[test]
    fn test_js_bitmap_pixels() {
        let pixels = vec![255u8, 128, 64, 255, 32, 16, 8, 255];
        let img = JsBitmap::from_bitmap(Bitmap::from_rgba(2, 1, pixels.clone()).unwrap());
        assert_eq!(img.pixels(), pixels);
        assert_eq!(img.as_bitmap().pixel(1, 0), [32, 16, 8, 255]);
    }

    #[test]
    fn test_with_scale() {
        let img = JsBitmap::from_bitmap(Bitmap::from_rgba(4, 4, vec![0u8; 64]).unwrap());
        let scaled = img.with_scale(2.0);
        assert_eq!(scaled.scale(), 2.0);
        assert_eq!(img.scale(), 1.0);
    }

    #[test]
    fn test_edge_names() {
        assert_eq!(edge_name(CropEdge::TopLeft), "top_left");
        assert_eq!(edge_name(CropEdge::Right), "right");
    }

    #[test]
    fn test_crop_result_angle() {
        let result = JsCropResult::new(Rect::new(0.0, 0.0, 10.0, 10.0), RotationAngle::from_degrees(-90));
        assert_eq!(result.angle, 270);
    }
}
