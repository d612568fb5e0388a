#![forbid(unsafe_code)]

//! UI-script inspector engine.
//!
//! Reads a legacy UI script, resolves its bitmap resources from a package,
//! and produces a renderer-agnostic element tree with composited
//! background images. This crate re-exports the public surface of the
//! `gzui-*` crates and adds [`InspectorConfig`] and [`Session`].
//!
//! ```no_run
//! use std::sync::Arc;
//! use gzui::prelude::*;
//!
//! let package = Arc::new(MemoryPackage::new());
//! let config = InspectorConfig::from_env();
//! let mut session = Session::new(package, &config)?;
//! session.load_source("<LEGACY iid=IGZWinGen area=(0,0,640,480)>")?;
//! session.poll_images();
//! # Ok::<(), gzui::SessionError>(())
//! ```

pub mod config;
pub mod session;

pub use config::{ConfigError, ConfigParse, InspectorConfig, SliceRuleChoice};
pub use session::{Session, SessionError};

// --- Core re-exports -------------------------------------------------------

pub use gzui_core::font_style::{FontStyle, parse_font_styles};
pub use gzui_core::{
    Align, AttrDecodeError, AttrValue, BlitMode, Document, ElementId, Gutters, Record, Rect,
    ResourceKey, Rgb, ScriptError,
};

// --- Layout re-exports -----------------------------------------------------

pub use gzui_layout::{Caption, CaptionPolicy, Layout};

// --- Render re-exports -----------------------------------------------------

pub use gzui_render::{DecodedImage, ImageBlob, ImageError, SliceRule, SliceTable};

// --- Resource re-exports ---------------------------------------------------

pub use gzui_resource::{MemoryPackage, PackageSource, ResolveError, Resolver};

// --- Tree re-exports -------------------------------------------------------

pub use gzui_tree::{
    BuildOptions, ElementTree, PresentationFlags, Property, SearchHit, SearchQuery, UIElement,
};

#[cfg(feature = "tracing-json")]
pub use gzui_core::logging::init_json;

pub mod prelude {
    pub use crate::{
        BlitMode, Document, ElementId, ElementTree, InspectorConfig, MemoryPackage,
        PackageSource, Rect, ResourceKey, Session, SessionError, UIElement,
    };

    pub use crate::{core, layout, render, resource, tree};
}

pub use gzui_core as core;
pub use gzui_layout as layout;
pub use gzui_render as render;
pub use gzui_resource as resource;
pub use gzui_tree as tree;
