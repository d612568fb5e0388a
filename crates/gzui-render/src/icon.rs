//! 16×16 tree thumbnails.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::image::DecodedImage;

pub const ICON_SIZE: u32 = 16;

/// Shown for elements whose image could not be resolved.
pub const MISSING_ICON_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Build a thumbnail for an element's image.
///
/// Button bitmaps hold four states side by side; only the second (normal)
/// state is shown. The image is scaled to fit, keeping its aspect ratio,
/// and centred on a transparent square.
#[must_use]
pub fn icon(image: Option<&DecodedImage>, interface: Option<&str>) -> RgbaImage {
    let Some(image) = image else {
        return RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, MISSING_ICON_COLOR);
    };
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return RgbaImage::new(ICON_SIZE, ICON_SIZE);
    }

    let source = if interface == Some("IGZWinBtn") && w >= 4 {
        let quarter = w / 4;
        imageops::crop_imm(image.pixels(), quarter, 0, quarter, h).to_image()
    } else {
        image.pixels().clone()
    };

    let (sw, sh) = source.dimensions();
    let scale = f64::from(ICON_SIZE) / f64::from(sw.max(sh));
    let fit_w = ((f64::from(sw) * scale).round() as u32).clamp(1, ICON_SIZE);
    let fit_h = ((f64::from(sh) * scale).round() as u32).clamp(1, ICON_SIZE);
    let scaled = imageops::resize(&source, fit_w, fit_h, FilterType::Triangle);

    let mut canvas = RgbaImage::new(ICON_SIZE, ICON_SIZE);
    let x = (ICON_SIZE - fit_w) / 2;
    let y = (ICON_SIZE - fit_h) / 2;
    imageops::replace(&mut canvas, &scaled, i64::from(x), i64::from(y));
    canvas
}

/// A solid swatch for color attributes in the property view.
#[must_use]
pub fn swatch(color: gzui_core::Rgb) -> RgbaImage {
    RgbaImage::from_pixel(ICON_SIZE, ICON_SIZE, Rgba(color.to_rgba()))
}
