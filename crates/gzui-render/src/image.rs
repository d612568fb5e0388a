//! Decoded bitmaps.

use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::slice::SliceTable;

/// A decoded bitmap in RGBA8.
///
/// Pixels are shared; cloning is cheap.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pixels: Arc<RgbaImage>,
    slices: Option<SliceTable>,
}

impl DecodedImage {
    /// Decode bitmap bytes.
    ///
    /// Format sniffing does not recognise TGA (it has no magic number), so
    /// a failed guess is retried as TGA before giving up.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let decoded = match image::load_from_memory(bytes) {
            Ok(image) => image,
            Err(first) => image::load_from_memory_with_format(bytes, ImageFormat::Tga)
                .map_err(|_| ImageError::Decode(first))?,
        };
        Ok(Self::from_rgba(decoded.to_rgba8()))
    }

    #[must_use]
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
            slices: None,
        }
    }

    /// Attach an edge-slice table.
    #[must_use]
    pub fn with_slices(mut self, slices: SliceTable) -> Self {
        self.slices = Some(slices);
        self
    }

    #[must_use]
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    #[must_use]
    pub fn slices(&self) -> Option<SliceTable> {
        self.slices
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

/// Errors raised by image decoding or encoding.
#[derive(Debug)]
pub enum ImageError {
    Decode(image::ImageError),
    Encode(image::ImageError),
}

impl From<image::ImageError> for ImageError {
    fn from(err: image::ImageError) -> Self {
        Self::Decode(err)
    }
}

impl std::fmt::Display for ImageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "image decode error: {err}"),
            Self::Encode(err) => write!(f, "image encode error: {err}"),
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) | Self::Encode(err) => Some(err),
        }
    }
}
