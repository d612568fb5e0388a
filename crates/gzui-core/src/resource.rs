//! Package resource keys.

use std::fmt;

/// Identifies one resource in a package by `(type, group, instance)`.
///
/// Equality and hashing are structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub type_id: u32,
    pub group: u32,
    pub instance: u32,
}

impl ResourceKey {
    /// Resource type of bitmaps referenced by `image` attributes.
    pub const IMAGE_TYPE: u32 = 0x856D_DBAC;
    /// Resource type of UI scripts.
    pub const UI_SCRIPT_TYPE: u32 = 0x0000_0000;

    #[must_use]
    pub const fn new(type_id: u32, group: u32, instance: u32) -> Self {
        Self {
            type_id,
            group,
            instance,
        }
    }

    /// Key of a bitmap resource.
    #[must_use]
    pub const fn image(group: u32, instance: u32) -> Self {
        Self::new(Self::IMAGE_TYPE, group, instance)
    }

    /// Key of a UI script resource.
    #[must_use]
    pub const fn ui_script(group: u32, instance: u32) -> Self {
        Self::new(Self::UI_SCRIPT_TYPE, group, instance)
    }

    /// Parse a `{group,instance}` reference as written in `image` attributes.
    ///
    /// Both components are hexadecimal, with or without a `0x` prefix.
    #[must_use]
    pub fn parse_image_ref(raw: &str) -> Option<Self> {
        let inner = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
        let (group, instance) = inner.split_once(',')?;
        Some(Self::image(parse_hex(group)?, parse_hex(instance)?))
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#010x}:{:#010x}:{:#010x}",
            self.type_id, self.group, self.instance
        )
    }
}

pub(crate) fn parse_hex(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let digits = raw
        .strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw);
    if digits.is_empty() {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}
