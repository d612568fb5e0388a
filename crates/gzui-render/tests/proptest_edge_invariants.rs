//! Property-based invariant tests for the compositor.
//!
//! 1. Output always has exactly the target dimensions.
//! 2. Oversized bands clamp to half the target, so the center is never negative.
//! 3. Bands that fit are left untouched.
//! 4. Edge corners reproduce the source corner pixels.
//! 5. Tiling is periodic in the source dimensions.

use gzui_core::BlitMode;
use gzui_render::composite::clamp_bands;
use gzui_render::{DecodedImage, SliceTable, composite};
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

fn patterned(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]))
}

proptest! {
    #[test]
    fn output_matches_target(
        sw in 1u32..24, sh in 1u32..24,
        tw in 0u32..64, th in 0u32..64,
        band in 0u32..40,
        mode in prop::sample::select(vec![BlitMode::Normal, BlitMode::Tile, BlitMode::Edge]),
    ) {
        let image = DecodedImage::from_rgba(patterned(sw, sh)).with_slices(SliceTable::uniform(band));
        prop_assert_eq!(composite(&image, tw, th, mode).dimensions(), (tw, th));
    }

    #[test]
    fn clamped_bands_fit(a in any::<u32>(), b in any::<u32>(), target in any::<u32>()) {
        let (ca, cb) = clamp_bands(a, b, target);
        prop_assert!(u64::from(ca) + u64::from(cb) <= u64::from(target));
        prop_assert!(ca <= a && cb <= b);
        if u64::from(a) + u64::from(b) > u64::from(target) {
            prop_assert!(ca <= target / 2 && cb <= target / 2);
            prop_assert!(ca == a.min(target / 2) && cb == b.min(target / 2));
        }
    }

    #[test]
    fn fitting_bands_untouched(a in 0u32..1000, b in 0u32..1000, extra in 0u32..1000) {
        prop_assert_eq!(clamp_bands(a, b, a + b + extra), (a, b));
    }

    #[test]
    fn edge_corners_are_source_corners(
        sw in 2u32..20, sh in 2u32..20,
        extra_w in 0u32..40, extra_h in 0u32..40,
    ) {
        let band_w = sw / 2;
        let band_h = sh / 2;
        prop_assume!(band_w > 0 && band_h > 0);
        let source = patterned(sw, sh);
        let table = SliceTable::new(band_w, band_h, sw - band_w, sh - band_h);
        let image = DecodedImage::from_rgba(source.clone()).with_slices(table);
        let (tw, th) = (sw + extra_w, sh + extra_h);
        let out = composite(&image, tw, th, BlitMode::Edge);
        prop_assert_eq!(out.get_pixel(0, 0), source.get_pixel(0, 0));
        prop_assert_eq!(out.get_pixel(tw - 1, 0), source.get_pixel(sw - 1, 0));
        prop_assert_eq!(out.get_pixel(0, th - 1), source.get_pixel(0, sh - 1));
        prop_assert_eq!(out.get_pixel(tw - 1, th - 1), source.get_pixel(sw - 1, sh - 1));
    }

    #[test]
    fn tiling_is_periodic(sw in 1u32..8, sh in 1u32..8, x in 0u32..40, y in 0u32..40) {
        let source = patterned(sw, sh);
        let image = DecodedImage::from_rgba(source.clone());
        let out = composite(&image, 40, 40, BlitMode::Tile);
        prop_assert_eq!(out.get_pixel(x, y), source.get_pixel(x % sw, y % sh));
    }
}
