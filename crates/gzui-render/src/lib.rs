#![forbid(unsafe_code)]

//! Image decoding and compositing for UI-script elements.
//!
//! - [`DecodedImage`] - bitmap bytes decoded to RGBA, with an optional slice table
//! - [`slice`] - edge-slice tables and the rules that derive them
//! - [`composite()`] - normal / tile / edge placement into a target rectangle
//! - [`CompositeCache`] - LRU of encoded composites
//! - [`ImageBlob`] - PNG payload handed to the presentation layer
//! - [`icon`] - 16×16 tree thumbnails
//!
//! Nothing in this crate knows where bytes come from; see `gzui-resource`.

pub mod cache;
pub mod composite;
pub mod encode;
pub mod icon;
pub mod image;
pub mod slice;

pub use cache::{CompositeCache, CompositeKey};
pub use composite::composite;
pub use encode::ImageBlob;
pub use image::{DecodedImage, ImageError};
pub use slice::{FixedBands, HalfImage, ParamBands, SliceRule, SliceTable};
