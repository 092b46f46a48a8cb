//! Core geometry types: Offset, Size, Rect, Align.
//!
//! Coordinates are signed device pixels. Markup coordinates may be written as
//! plain pixels (`"120"`) or as a percentage of the screen (`"50%"`); see
//! [`parse_coord`].

use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D position or displacement in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// Width and height in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of pixels covered (`width * height`), zero for degenerate sizes.
    #[inline]
    pub fn area(self) -> usize {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            self.width as usize * self.height as usize
        }
    }
}

// ---------------------------------------------------------------------------
// Rect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle: origin plus size.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn origin(&self) -> Offset {
        Offset::new(self.x, self.y)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Whether the point lies inside the rectangle (right/bottom edges excluded).
    #[inline]
    pub fn contains(&self, point: Offset) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x < self.x + self.width
            && point.y < self.y + self.height
    }
}

// ---------------------------------------------------------------------------
// Align
// ---------------------------------------------------------------------------

/// Position of a widget relative to its parent on the 3×3 alignment grid.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    #[default]
    TopLeft,
    TopMid,
    TopRight,
    LeftMid,
    Center,
    RightMid,
    BottomLeft,
    BottomMid,
    BottomRight,
}

impl Align {
    /// Resolve a horizontal (`left|center|right`) and vertical
    /// (`top|center|bottom`) keyword pair. Unknown keywords fall back to
    /// top-left.
    pub fn from_keywords(h: &str, v: &str) -> Self {
        match (v, h) {
            ("top" | "", "left" | "") => Align::TopLeft,
            ("top" | "", "center") => Align::TopMid,
            ("top" | "", "right") => Align::TopRight,
            ("center", "left" | "") => Align::LeftMid,
            ("center", "center") => Align::Center,
            ("center", "right") => Align::RightMid,
            ("bottom", "left" | "") => Align::BottomLeft,
            ("bottom", "center") => Align::BottomMid,
            ("bottom", "right") => Align::BottomRight,
            _ => Align::TopLeft,
        }
    }

    /// Top-left corner of a child of `child` size aligned inside `parent`,
    /// shifted by `offset`.
    pub fn place(self, parent: Size, child: Size, offset: Offset) -> Offset {
        let left = 0;
        let mid_x = (parent.width - child.width) / 2;
        let right = parent.width - child.width;
        let top = 0;
        let mid_y = (parent.height - child.height) / 2;
        let bottom = parent.height - child.height;
        let (x, y) = match self {
            Align::TopLeft => (left, top),
            Align::TopMid => (mid_x, top),
            Align::TopRight => (right, top),
            Align::LeftMid => (left, mid_y),
            Align::Center => (mid_x, mid_y),
            Align::RightMid => (right, mid_y),
            Align::BottomLeft => (left, bottom),
            Align::BottomMid => (mid_x, bottom),
            Align::BottomRight => (right, bottom),
        };
        Offset::new(x + offset.x, y + offset.y)
    }
}

/// Split an `"h v"` alignment attribute into its horizontal and vertical
/// keywords. Missing parts default to `left` and `top`.
pub fn split_align_pair(value: &str) -> (String, String) {
    if value.is_empty() {
        return ("left".into(), "top".into());
    }
    match value.split_once(' ') {
        Some((h, v)) => (h.to_string(), v.to_string()),
        None => (value.to_string(), "top".into()),
    }
}

// ---------------------------------------------------------------------------
// Coordinates
// ---------------------------------------------------------------------------

/// Parse a coordinate written as pixels or as a percentage of `extent`.
///
/// The numeric prefix is read as a float; a trailing `%` scales it by
/// `extent / 100`. The result is rounded by adding `0.5` and truncating
/// toward zero, so negative values land one pixel closer to zero (`-10`
/// becomes `-9`). An empty or non-numeric value yields `0`.
pub fn parse_coord(value: &str, extent: i32) -> i32 {
    let (number, rest) = leading_float(value);
    let Some(val) = number else {
        return 0;
    };
    if rest.starts_with('%') {
        (val * extent as f32 / 100.0 + 0.5) as i32
    } else {
        (val + 0.5) as i32
    }
}

/// Read the longest float prefix (`[ws][+-]digits[.digits]`) of `s`.
pub(crate) fn leading_float(s: &str) -> (Option<f32>, &str) {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start || has_digits {
            has_digits |= frac_end > frac_start;
            end = frac_end;
        }
    }
    if !has_digits {
        return (None, s);
    }
    let number = s[..end].trim_end_matches('.').parse::<f32>().ok();
    (number, &s[end..])
}

/// Parse the leading integer of `s`: optional whitespace and sign, then
/// digits. Input without a numeric prefix yields `0`.
pub(crate) fn leading_int(s: &str) -> i32 {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'-' || bytes[end] == b'+') {
        end += 1;
    }
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    s[..end].parse::<i64>().map_or(0, |v| v.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}
