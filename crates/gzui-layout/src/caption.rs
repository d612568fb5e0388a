//! Caption text and visibility.
//!
//! A caption is displayed only when all of these hold:
//! - `showcaption` is not `no`,
//! - the raw caption is not a `key=value` assignment (metadata such as
//!   `kCollapsedRows=1`),
//! - the element's interface tag is in the caption-bearing allow-list,
//! - the decoded text is not empty.
//!
//! Scripts encode line breaks as the literal escapes `\r\n` or `\n`.

use gzui_core::attr::{self, Align, AttrValue};

/// Interface tags that render captions by default.
pub const DEFAULT_CAPTION_TYPES: &[&str] = &[
    "IGZWinText",
    "IGZWinTextEdit",
    "IGZWinBtn",
    "IGZWinFlatRect",
    "IGZWinBMP",
    "IGZWinGen",
];

/// A displayable caption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    pub align: Align,
}

/// Why a caption is not displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suppressed {
    /// No caption attribute, or it decodes to nothing.
    Empty,
    /// `showcaption=no`.
    Hidden,
    /// The caption is a `key=value` assignment.
    KeyValue,
    /// The interface tag is absent or not caption-bearing.
    Interface,
}

/// Caption allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionPolicy {
    allowed: Vec<String>,
}

impl Default for CaptionPolicy {
    fn default() -> Self {
        Self::with_types(DEFAULT_CAPTION_TYPES.iter().copied())
    }
}

impl CaptionPolicy {
    /// Build a policy from interface tags.
    #[must_use]
    pub fn with_types<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: types.into_iter().map(Into::into).collect(),
        }
    }

    /// Interface tags in priority order.
    #[must_use]
    pub fn types(&self) -> &[String] {
        &self.allowed
    }

    #[must_use]
    pub fn allows(&self, interface: &str) -> bool {
        self.allowed.iter().any(|t| t == interface)
    }

    /// Decide whether and how a caption renders.
    pub fn classify(
        &self,
        interface: Option<&str>,
        raw_caption: Option<&str>,
        show_caption: Option<&str>,
        align: Option<&str>,
    ) -> Result<Caption, Suppressed> {
        let raw = raw_caption.ok_or(Suppressed::Empty)?;
        let shown = show_caption
            .and_then(|v| attr::decode_soft("showcaption", v))
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if !shown {
            return Err(Suppressed::Hidden);
        }
        if is_key_value(raw) {
            return Err(Suppressed::KeyValue);
        }
        if !interface.is_some_and(|iid| self.allows(iid)) {
            return Err(Suppressed::Interface);
        }
        let text = decode_newlines(raw);
        if text.is_empty() {
            return Err(Suppressed::Empty);
        }
        Ok(Caption {
            text,
            align: resolve_align(align),
        })
    }

    /// [`classify`](Self::classify), discarding the reason.
    #[must_use]
    pub fn resolve(
        &self,
        interface: Option<&str>,
        raw_caption: Option<&str>,
        show_caption: Option<&str>,
        align: Option<&str>,
    ) -> Option<Caption> {
        self.classify(interface, raw_caption, show_caption, align).ok()
    }
}

/// Whether the raw caption carries a `key=value` assignment.
#[must_use]
pub fn is_key_value(raw: &str) -> bool {
    raw.contains('=')
}

/// Replace the script's literal newline escapes with line breaks.
#[must_use]
pub fn decode_newlines(raw: &str) -> String {
    raw.replace("\\r\\n", "\n").replace("\\n", "\n")
}

/// Decode an `align` attribute through the grammar (unknown → left).
#[must_use]
pub fn resolve_align(raw: Option<&str>) -> Align {
    match raw.and_then(|v| attr::decode_soft("align", v)) {
        Some(AttrValue::Enum(attr::EnumValue::Align(align))) => align,
        _ => Align::Left,
    }
}
