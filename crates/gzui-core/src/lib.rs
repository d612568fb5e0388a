#![forbid(unsafe_code)]

//! Core: geometry, colors, resource keys, the UI-script attribute grammar,
//! element ids, and the record tree produced by the script tokenizer.

pub mod attr;
pub mod color;
pub mod font_style;
pub mod geometry;
pub mod id;
pub mod logging;
pub mod resource;
pub mod script;

pub use attr::{Align, AttrDecodeError, AttrKind, AttrValue, BlitMode, WinParam};
pub use color::Rgb;
pub use geometry::{Gutters, Rect};
pub use id::ElementId;
pub use resource::ResourceKey;
pub use script::{Document, Record, ScriptError};

#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, warn};
