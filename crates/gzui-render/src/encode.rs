//! Encoded composites handed to the presentation layer.

use std::io::Cursor;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage};

use crate::image::ImageError;

/// A PNG-encoded composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ImageBlob {
    /// Encode an RGBA buffer as PNG.
    pub fn encode(pixels: &RgbaImage) -> Result<Self, ImageError> {
        let mut out = Cursor::new(Vec::new());
        pixels
            .write_to(&mut out, ImageFormat::Png)
            .map_err(ImageError::Encode)?;
        Ok(Self {
            width: pixels.width(),
            height: pixels.height(),
            png: out.into_inner(),
        })
    }

    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }

    /// `data:image/png;base64,...`, usable directly as a CSS `url()`.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.png.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.png.is_empty()
    }
}
