//! Placing a bitmap into a target rectangle.
//!
//! - `normal`: native size at the origin, clipped; uncovered pixels stay
//!   transparent.
//! - `tile`: repeated from the origin across both axes, unscaled.
//! - `edge`: corners at native size, edge bands stretched along one axis,
//!   center stretched along both (see [`crate::slice`]).
//!
//! When the bands of one axis do not fit the target, each band wider than
//! half the target is limited to that half, so the center never goes
//! negative. Clamped bands keep their outer pixels.

use gzui_core::BlitMode;
use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::image::DecodedImage;
use crate::slice::{HalfImage, SliceRule, SliceTable};

/// Largest composite the workers render by default, in pixels.
pub const DEFAULT_MAX_SURFACE: u64 = 4096 * 4096;

/// Whether a `width`×`height` buffer stays within `max_pixels`.
#[must_use]
pub const fn fits_surface(width: u32, height: u32, max_pixels: u64) -> bool {
    (width as u64) * (height as u64) <= max_pixels
}

/// Composite `image` into a `width`×`height` buffer.
///
/// Edge mode uses the image's slice table, or [`HalfImage`] if it has none.
/// The buffer is allocated up front; callers bound untrusted sizes with
/// [`fits_surface`].
#[must_use]
pub fn composite(image: &DecodedImage, width: u32, height: u32, blit: BlitMode) -> RgbaImage {
    match blit {
        BlitMode::Normal => place(image.pixels(), width, height),
        BlitMode::Tile => tile(image.pixels(), width, height),
        BlitMode::Edge => {
            let (w, h) = image.dimensions();
            let table = image
                .slices()
                .unwrap_or_else(|| HalfImage.table(w, h, None));
            edge(image.pixels(), &table, width, height)
        }
    }
}

fn place(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    imageops::replace(&mut canvas, source, 0, 0);
    canvas
}

fn tile(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 {
        return canvas;
    }
    for y in (0..height).step_by(sh as usize) {
        for x in (0..width).step_by(sw as usize) {
            imageops::replace(&mut canvas, source, i64::from(x), i64::from(y));
        }
    }
    canvas
}

/// Fit two border bands into `target`.
///
/// Returns the bands unchanged when they fit; otherwise each is capped at
/// `target / 2`.
#[must_use]
pub fn clamp_bands(first: u32, second: u32, target: u32) -> (u32, u32) {
    if u64::from(first) + u64::from(second) <= u64::from(target) {
        return (first, second);
    }
    let half = target / 2;
    (first.min(half), second.min(half))
}

/// One axis of the 3×3 grid: (source offset, source length, target offset, target length).
type Span = (u32, u32, u32, u32);

fn spans(lead: u32, trail: u32, source: u32, target: u32) -> [Span; 3] {
    let (t_lead, t_trail) = clamp_bands(lead, trail, target);
    let center = source - lead - trail;
    // An empty source center stretches the first pixel past the leading band.
    let (c_off, c_len) = if center == 0 {
        (lead.min(source.saturating_sub(1)), 1)
    } else {
        (lead, center)
    };
    [
        (0, t_lead, 0, t_lead),
        (c_off, c_len, t_lead, target - t_lead - t_trail),
        (source - t_trail, t_trail, target - t_trail, t_trail),
    ]
}

/// Fit one axis of the table to the bitmap.
///
/// Bands one pixel too wide are the odd-size half split: the bitmap is
/// stretched by a pixel to hold them. Anything wider is clamped like a
/// target.
fn fit_source(lead: u32, trail: u32, source: u32) -> (u32, u32, u32) {
    let total = u64::from(lead) + u64::from(trail);
    if total <= u64::from(source) {
        (lead, trail, source)
    } else if total == u64::from(source) + 1 {
        (lead, trail, source + 1)
    } else {
        let (lead, trail) = clamp_bands(lead, trail, source);
        (lead, trail, source)
    }
}

fn edge(source: &RgbaImage, table: &SliceTable, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::new(width, height);
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return canvas;
    }

    let (left, right, need_w) = fit_source(table.left, table.right, sw);
    let (top, bottom, need_h) = fit_source(table.top, table.bottom, sh);
    let padded;
    let source = if (need_w, need_h) == (sw, sh) {
        source
    } else {
        tracing::trace!(from = ?(sw, sh), to = ?(need_w, need_h), "padding edge source");
        padded = imageops::resize(source, need_w, need_h, FilterType::Nearest);
        &padded
    };

    let cols = spans(left, right, need_w, width);
    let rows = spans(top, bottom, need_h, height);
    for &(sy, sh, dy, dh) in &rows {
        for &(sx, sw, dx, dw) in &cols {
            if dw == 0 || dh == 0 || sw == 0 || sh == 0 {
                continue;
            }
            let cell = imageops::crop_imm(source, sx, sy, sw, sh).to_image();
            let cell = if (sw, sh) == (dw, dh) {
                cell
            } else {
                imageops::resize(&cell, dw, dh, FilterType::Nearest)
            };
            imageops::replace(&mut canvas, &cell, i64::from(dx), i64::from(dy));
        }
    }
    canvas
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    /// Quadrant image: red left half, blue right half, green bottom-right.
    fn quadrants(w: u32, h: u32) -> DecodedImage {
        DecodedImage::from_rgba(RgbaImage::from_fn(w, h, |x, y| {
            match (x < w / 2, y < h / 2) {
                (true, _) => RED,
                (false, true) => BLUE,
                (false, false) => GREEN,
            }
        }))
    }

    #[test]
    fn normal_clips_and_letterboxes() {
        let image = quadrants(4, 4);
        let small = composite(&image, 2, 2, BlitMode::Normal);
        assert_eq!(small.dimensions(), (2, 2));
        assert_eq!(small.get_pixel(1, 1), &RED);

        let large = composite(&image, 6, 6, BlitMode::Normal);
        assert_eq!(large.get_pixel(3, 3), &GREEN);
        assert_eq!(large.get_pixel(5, 5), &CLEAR);
    }

    #[test]
    fn tile_repeats_unscaled() {
        let image = quadrants(2, 2);
        let out = composite(&image, 5, 3, BlitMode::Tile);
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(1, 0), &BLUE);
        assert_eq!(out.get_pixel(2, 0), &RED);
        assert_eq!(out.get_pixel(3, 1), &GREEN);
        assert_eq!(out.get_pixel(4, 2), &RED);
    }

    #[test]
    fn edge_half_slices_keep_corners() {
        let image = quadrants(4, 4);
        let out = composite(&image, 10, 8, BlitMode::Edge);
        assert_eq!(out.dimensions(), (10, 8));
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(9, 0), &BLUE);
        assert_eq!(out.get_pixel(9, 7), &GREEN);
        assert_eq!(out.get_pixel(0, 7), &RED);
        // Center comes from the first pixel past both leading bands.
        assert_eq!(out.get_pixel(5, 4), &GREEN);
        // Top edge stretches the first column of the right half.
        assert_eq!(out.get_pixel(5, 0), &BLUE);
    }

    #[test]
    fn edge_explicit_table_stretches_center() {
        let pixels = RgbaImage::from_fn(5, 5, |x, y| {
            if x == 2 && y == 2 { GREEN } else { RED }
        });
        let image = DecodedImage::from_rgba(pixels).with_slices(SliceTable::uniform(2));
        let out = composite(&image, 9, 9, BlitMode::Edge);
        for y in 2..7 {
            for x in 2..7 {
                assert_eq!(out.get_pixel(x, y), &GREEN, "({x},{y})");
            }
        }
        assert_eq!(out.get_pixel(1, 1), &RED);
        assert_eq!(out.get_pixel(7, 7), &RED);
    }

    #[test]
    fn edge_one_dimensional() {
        let image = quadrants(4, 2).with_slices(SliceTable::horizontal(2, 2));
        let out = composite(&image, 8, 6, BlitMode::Edge);
        assert_eq!(out.get_pixel(0, 5), &RED);
        assert_eq!(out.get_pixel(7, 0), &BLUE);
        assert_eq!(out.get_pixel(7, 5), &GREEN);
    }

    #[test]
    fn clamp_rules() {
        assert_eq!(clamp_bands(3, 3, 10), (3, 3));
        assert_eq!(clamp_bands(8, 8, 10), (5, 5));
        assert_eq!(clamp_bands(8, 1, 10), (8, 1));
        assert_eq!(clamp_bands(9, 4, 10), (5, 4));
        assert_eq!(clamp_bands(2, 30, 11), (2, 5));
        assert_eq!(clamp_bands(u32::MAX, u32::MAX, 7), (3, 3));
    }

    #[test]
    fn oversized_band_gives_center_its_share() {
        let pixels = RgbaImage::from_fn(40, 1, |x, _| match x {
            0..2 => RED,
            2..10 => GREEN,
            _ => BLUE,
        });
        let image = DecodedImage::from_rgba(pixels).with_slices(SliceTable::horizontal(2, 30));
        let out = composite(&image, 11, 1, BlitMode::Edge);
        assert_eq!(out.get_pixel(1, 0), &RED);
        assert_eq!(out.get_pixel(2, 0), &GREEN);
        assert_eq!(out.get_pixel(5, 0), &GREEN);
        assert_eq!(out.get_pixel(6, 0), &BLUE);
        assert_eq!(out.get_pixel(10, 0), &BLUE);
    }

    #[test]
    fn edge_narrower_than_bands_keeps_outer_pixels() {
        let image = quadrants(40, 40);
        let out = composite(&image, 6, 6, BlitMode::Edge);
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(5, 0), &BLUE);
        assert_eq!(out.get_pixel(5, 5), &GREEN);
    }

    #[test]
    fn odd_source_is_padded() {
        let image = quadrants(5, 5);
        let out = composite(&image, 12, 12, BlitMode::Edge);
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(11, 0), &BLUE);
        assert_eq!(out.get_pixel(11, 11), &GREEN);
    }

    #[test]
    fn oversized_table_is_fitted_to_source() {
        let image = quadrants(4, 4).with_slices(SliceTable::uniform(1_000_000));
        let out = composite(&image, 8, 8, BlitMode::Edge);
        assert_eq!(out.get_pixel(0, 0), &RED);
        assert_eq!(out.get_pixel(7, 7), &GREEN);
    }

    #[test]
    fn surface_limit() {
        assert!(fits_surface(4096, 4096, DEFAULT_MAX_SURFACE));
        assert!(!fits_surface(4097, 4096, DEFAULT_MAX_SURFACE));
        assert!(!fits_surface(u32::MAX, u32::MAX, DEFAULT_MAX_SURFACE));
        assert!(fits_surface(u32::MAX, 0, 0));
    }

    #[test]
    fn zero_target_is_empty() {
        let image = quadrants(4, 4);
        for mode in [BlitMode::Normal, BlitMode::Tile, BlitMode::Edge] {
            assert_eq!(composite(&image, 0, 5, mode).dimensions(), (0, 5));
        }
    }
}
