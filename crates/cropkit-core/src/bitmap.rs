//! The decoded bitmap a crop session works on.

use std::io::Cursor;

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};

use crate::error::BitmapError;
use crate::geometry::Size;

/// An immutable, decoded RGBA bitmap.
///
/// `scale` is the display scale factor of the source (2.0 for a @2x asset).
/// Crop geometry always works in pixels, the scale is only carried through to
/// rendered output.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pixels: RgbaImage,
    scale: f64,
}

impl Bitmap {
    /// Create a bitmap from RGBA pixel data in row-major order (4 bytes per pixel).
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::EmptyImage);
        }
        let expected = width as usize * height as usize * 4;
        let actual = pixels.len();
        RgbaImage::from_raw(width, height, pixels)
            .map(Self::from_rgba_image)
            .ok_or(BitmapError::InvalidBuffer { expected, actual })
    }

    /// Create a bitmap from RGB pixel data (3 bytes per pixel), fully opaque.
    pub fn from_rgb(width: u32, height: u32, pixels: &[u8]) -> Result<Self, BitmapError> {
        if width == 0 || height == 0 {
            return Err(BitmapError::EmptyImage);
        }
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(BitmapError::InvalidBuffer {
                expected,
                actual: pixels.len(),
            });
        }
        let mut rgba = Vec::with_capacity(width as usize * height as usize * 4);
        for chunk in pixels.chunks_exact(3) {
            rgba.extend_from_slice(&[chunk[0], chunk[1], chunk[2], 255]);
        }
        Self::from_rgba(width, height, rgba)
    }

    /// Decode an encoded file (JPEG or PNG), guessing the format from its bytes.
    ///
    /// EXIF orientation is not applied; hosts pass an already-oriented image
    /// or restore the orientation through the crop angle.
    pub fn decode(bytes: &[u8]) -> Result<Self, BitmapError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| BitmapError::Decode(e.to_string()))?;
        let img = reader
            .decode()
            .map_err(|e| BitmapError::Decode(e.to_string()))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(BitmapError::EmptyImage);
        }
        Ok(Self::from_rgba_image(img.into_rgba8()))
    }

    pub fn from_rgba_image(pixels: RgbaImage) -> Self {
        Self { pixels, scale: 1.0 }
    }

    /// The same bitmap tagged with a display scale factor.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        self
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Pixel dimensions as a geometry size.
    pub fn size(&self) -> Size {
        Size::new(self.width() as f64, self.height() as f64)
    }

    /// Size in display points (pixels divided by scale).
    pub fn point_size(&self) -> Size {
        self.size().scaled(1.0 / self.scale)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_rgba_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        self.pixels
    }

    /// Raw RGBA bytes.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.as_raw().len()
    }

    /// Encode as PNG, keeping the alpha channel of circular crops.
    pub fn encode_png(&self) -> Result<Vec<u8>, BitmapError> {
        let mut output = Vec::new();
        PngEncoder::new(&mut output)
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| BitmapError::Encode(e.to_string()))?;
        Ok(output)
    }
}
