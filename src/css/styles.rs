//! Visual style state of a single widget.
//!
//! [`Style`] holds one typed `Option<T>` per visual property the backend
//! understands. `None` means "not set" (the toolkit default applies).
//! Mutations arrive as [`StyleProp`] values so that the CSS cascade, inline
//! attributes and binding updates all go through the same channel.

/// Fonts available on the target. Requested pixel sizes snap to the nearest
/// one via [`Font::nearest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Font {
    #[default]
    Small,
    Medium,
    Large,
    XLarge,
}

impl Font {
    /// Snap a requested pixel size: ≤16 → 16, ≤32 → 32, ≤48 → 48, else 72.
    /// A size of `0` (unset) selects the default font.
    pub fn nearest(size: i32) -> Self {
        match size {
            0 => Font::default(),
            s if s <= 16 => Font::Small,
            s if s <= 32 => Font::Medium,
            s if s <= 48 => Font::Large,
            _ => Font::XLarge,
        }
    }

    /// Nominal pixel size of the font.
    pub fn size(self) -> i32 {
        match self {
            Font::Small => 16,
            Font::Medium => 32,
            Font::Large => 48,
            Font::XLarge => 72,
        }
    }
}

/// Horizontal alignment of text inside its widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

impl TextAlign {
    /// `center` and `right` are recognised; anything else is left.
    pub fn from_keyword(s: &str) -> Self {
        match s {
            "center" => TextAlign::Center,
            "right" => TextAlign::Right,
            _ => TextAlign::Left,
        }
    }
}

/// What a fixed-width label does with text that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LongMode {
    #[default]
    Wrap,
    Ellipsis,
    Clip,
    Scroll,
}

impl LongMode {
    /// Map an `overflow` attribute value.
    pub fn from_overflow(s: &str) -> Self {
        match s {
            "ellipsis" | "dot" => LongMode::Ellipsis,
            "clip" => LongMode::Clip,
            "scroll" => LongMode::Scroll,
            _ => LongMode::Wrap,
        }
    }
}

/// Which edge of the padding box a value applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

/// A single style mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleProp {
    /// Text color as `0xRRGGBB`.
    TextColor(u32),
    /// Background color as `0xRRGGBB`.
    BgColor(u32),
    /// Background opacity, 0 (transparent) to 255 (cover).
    BgOpacity(u8),
    Font(Font),
    Radius(i32),
    Padding(Side, i32),
    /// Whole-widget opacity, 0 to 255.
    Opacity(u8),
    TextAlign(TextAlign),
    BorderWidth(i32),
}

/// Accumulated style of one widget.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Style {
    pub text_color: Option<u32>,
    pub bg_color: Option<u32>,
    pub bg_opacity: Option<u8>,
    pub font: Option<Font>,
    pub radius: Option<i32>,
    pub pad_top: Option<i32>,
    pub pad_right: Option<i32>,
    pub pad_bottom: Option<i32>,
    pub pad_left: Option<i32>,
    pub opacity: Option<u8>,
    pub text_align: Option<TextAlign>,
    pub border_width: Option<i32>,
}

impl Style {
    /// Create an empty style.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one mutation, overwriting any previous value of that property.
    pub fn apply(&mut self, prop: StyleProp) {
        match prop {
            StyleProp::TextColor(c) => self.text_color = Some(c),
            StyleProp::BgColor(c) => self.bg_color = Some(c),
            StyleProp::BgOpacity(o) => self.bg_opacity = Some(o),
            StyleProp::Font(f) => self.font = Some(f),
            StyleProp::Radius(r) => self.radius = Some(r),
            StyleProp::Padding(side, v) => match side {
                Side::Top => self.pad_top = Some(v),
                Side::Right => self.pad_right = Some(v),
                Side::Bottom => self.pad_bottom = Some(v),
                Side::Left => self.pad_left = Some(v),
            },
            StyleProp::Opacity(o) => self.opacity = Some(o),
            StyleProp::TextAlign(a) => self.text_align = Some(a),
            StyleProp::BorderWidth(w) => self.border_width = Some(w),
        }
    }

    /// Builder form of [`Style::apply`].
    pub fn with(mut self, prop: StyleProp) -> Self {
        self.apply(prop);
        self
    }

    /// Font in effect, falling back to the default font.
    pub fn font_or_default(&self) -> Font {
        self.font.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_nearest() {
        assert_eq!(Font::nearest(0), Font::Small);
        assert_eq!(Font::nearest(12), Font::Small);
        assert_eq!(Font::nearest(16), Font::Small);
        assert_eq!(Font::nearest(17), Font::Medium);
        assert_eq!(Font::nearest(32), Font::Medium);
        assert_eq!(Font::nearest(40), Font::Large);
        assert_eq!(Font::nearest(48), Font::Large);
        assert_eq!(Font::nearest(49), Font::XLarge);
        assert_eq!(Font::nearest(200), Font::XLarge);
    }

    #[test]
    fn test_style_apply_overwrites() {
        let mut style = Style::new();
        style.apply(StyleProp::TextColor(0xFF0000));
        style.apply(StyleProp::TextColor(0x00FF00));
        assert_eq!(style.text_color, Some(0x00FF00));
    }

    #[test]
    fn test_style_padding_sides() {
        let style = Style::new()
            .with(StyleProp::Padding(Side::Top, 4))
            .with(StyleProp::Padding(Side::Bottom, 6));
        assert_eq!(style.pad_top, Some(4));
        assert_eq!(style.pad_bottom, Some(6));
        assert_eq!(style.pad_left, None);
    }

    #[test]
    fn test_keyword_mappings() {
        assert_eq!(TextAlign::from_keyword("center"), TextAlign::Center);
        assert_eq!(TextAlign::from_keyword("justify"), TextAlign::Left);
        assert_eq!(LongMode::from_overflow("dot"), LongMode::Ellipsis);
        assert_eq!(LongMode::from_overflow("scroll"), LongMode::Scroll);
        assert_eq!(LongMode::from_overflow(""), LongMode::Wrap);
    }
}
