#![forbid(unsafe_code)]

//! The element tree built from a UI-script document.
//!
//! - [`build`] - document → [`ElementTree`] plus pending image requests
//! - [`ElementTree`] - owned element tree, id index, presentation flags
//! - [`filter`], [`search`], [`properties`], [`hint`] - inspector queries
//!
//! The tree's structure is fixed once built. Only [`PresentationFlags`]
//! change afterwards, and only through [`ElementTree`].

pub mod builder;
pub mod element;
pub mod filter;
pub mod flags;
pub mod hint;
pub mod index;
pub mod properties;
pub mod search;

pub use builder::{BuildOptions, BuildOutput, DEFAULT_BACKGROUND_TYPES, build};
pub use element::{ImagePaint, Paint, UIElement};
pub use filter::{FilterOutcome, filter};
pub use flags::PresentationFlags;
pub use hint::{caption_hint, caption_hints, group_hint};
pub use index::ElementTree;
pub use properties::{Property, properties};
pub use search::{SearchHit, SearchQuery, search};

pub use gzui_core::ElementId;
