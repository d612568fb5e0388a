//! Edge-slice tables.
//!
//! An edge-blitted bitmap is cut into fixed border bands and a stretchable
//! center. How wide the bands are is not recorded in the package; the game
//! derives it from the bitmap and the element's `wparam`. [`SliceRule`]
//! keeps that derivation swappable.
//!
//! Observed behaviour:
//! - most edge images split exactly in half, padded to even dimensions,
//!   with a one-pixel strip stretched across the middle ([`HalfImage`]);
//! - question dialogs use 30px side/top bands and a 62px bottom band
//!   ([`FixedBands::DIALOG`]).

use std::fmt;

/// Border band widths in source pixels.
///
/// A table with zero `top` and `bottom` slices horizontally only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SliceTable {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl SliceTable {
    #[must_use]
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Same band on every edge.
    #[must_use]
    pub const fn uniform(band: u32) -> Self {
        Self::new(band, band, band, band)
    }

    /// Left/right bands only; the full height is stretched.
    #[must_use]
    pub const fn horizontal(left: u32, right: u32) -> Self {
        Self::new(left, 0, right, 0)
    }

    #[must_use]
    pub const fn is_one_dimensional(&self) -> bool {
        self.top == 0 && self.bottom == 0
    }
}

impl fmt::Display for SliceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

/// Derives a slice table for one element.
///
/// `param` is the numeric value of the element's `wparam`, when present.
pub trait SliceRule: fmt::Debug + Send + Sync {
    fn table(&self, width: u32, height: u32, param: Option<i64>) -> SliceTable;
}

/// Bands are half the source, after padding odd dimensions to even.
#[derive(Debug, Clone, Copy, Default)]
pub struct HalfImage;

impl SliceRule for HalfImage {
    fn table(&self, width: u32, height: u32, _param: Option<i64>) -> SliceTable {
        let half_w = width.div_ceil(2);
        let half_h = height.div_ceil(2);
        SliceTable::new(half_w, half_h, half_w, half_h)
    }
}

/// A positive `wparam` value is a uniform band; otherwise [`HalfImage`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ParamBands;

impl SliceRule for ParamBands {
    fn table(&self, width: u32, height: u32, param: Option<i64>) -> SliceTable {
        match param.and_then(|p| u32::try_from(p).ok()).filter(|p| *p > 0) {
            Some(band) => SliceTable::uniform(band),
            None => HalfImage.table(width, height, param),
        }
    }
}

/// One table for every image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBands(pub SliceTable);

impl FixedBands {
    /// Question-dialog backgrounds (e.g. the 90×186 dialog frame).
    pub const DIALOG: Self = Self(SliceTable::new(30, 30, 30, 62));
}

impl SliceRule for FixedBands {
    fn table(&self, _width: u32, _height: u32, _param: Option<i64>) -> SliceTable {
        self.0
    }
}
