//! Presentation state.

bitflags::bitflags! {
    /// Runtime state of one element. Never derived from the script.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PresentationFlags: u8 {
        /// Shown on the surface.
        const VISIBLE       = 0b0000_0001;
        /// The single selected element.
        const SELECTED      = 0b0000_0010;
        /// The single hovered element.
        const HOVERED       = 0b0000_0100;
        /// Pointer events pass through to elements below.
        const IGNORED       = 0b0000_1000;
        /// The image reference did not resolve to a bitmap.
        const MISSING_IMAGE = 0b0001_0000;
    }
}

impl Default for PresentationFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}
