#![forbid(unsafe_code)]

//! Geometric primitives.

/// A rectangle in UI-script pixel space.
///
/// The origin may be negative (scripts occasionally park elements
/// off-screen) but the extent never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// The zero-area rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Build from a start and an end corner.
    ///
    /// An end before its start yields a zero extent on that axis.
    pub fn from_corners(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x: x1,
            y: y1,
            width: span(x1, x2),
            height: span(y1, y2),
        }
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && (x as i64) < self.right() && y >= self.y && (y as i64) < self.bottom()
    }

    /// Shift the rectangle by the origin of `parent`.
    #[must_use]
    pub fn offset_by(&self, parent: &Rect) -> Rect {
        Rect {
            x: self.x.saturating_add(parent.x),
            y: self.y.saturating_add(parent.y),
            ..*self
        }
    }

    /// Create a new rectangle inside the current one, shrunk by the gutters.
    ///
    /// Negative gutters are treated as zero.
    pub fn inner(&self, gutters: Gutters) -> Rect {
        let left = gutters.left.max(0) as u32;
        let top = gutters.top.max(0) as u32;
        let right = gutters.right.max(0) as u32;
        let bottom = gutters.bottom.max(0) as u32;

        Rect {
            x: self.x.saturating_add(left.min(self.width) as i32),
            y: self.y.saturating_add(top.min(self.height) as i32),
            width: self.width.saturating_sub(left).saturating_sub(right),
            height: self.height.saturating_sub(top).saturating_sub(bottom),
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());

        Rect {
            x,
            y,
            width: clamp_extent(right - x as i64),
            height: clamp_extent(bottom - y as i64),
        }
    }
}

fn span(start: i32, end: i32) -> u32 {
    clamp_extent(end as i64 - start as i64)
}

fn clamp_extent(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

/// Inner padding offsets of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Gutters {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Gutters {
    /// All four edges zero.
    pub const ZERO: Self = Self::all(0);

    /// Create new gutters with equal values.
    pub const fn all(val: i32) -> Self {
        Self {
            left: val,
            top: val,
            right: val,
            bottom: val,
        }
    }

    /// Create gutters with specific values, in script order.
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Broadcast a horizontal and a vertical value to their paired edges.
    pub const fn symmetric(horizontal: i32, vertical: i32) -> Self {
        Self::new(horizontal, vertical, horizontal, vertical)
    }
}
