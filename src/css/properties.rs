//! Property parsing and application: declaration strings → widget mutations.
//!
//! Each recognised property name maps to a typed [`Declaration`], which is
//! then applied to a widget through the [`Backend`]. Unknown properties are
//! ignored.

use std::collections::BTreeMap;

use crate::backend::{Backend, WidgetId};
use crate::css::color::parse_css_color;
use crate::css::styles::{Font, Side, StyleProp, TextAlign};
use crate::geometry::{leading_float, leading_int, parse_coord, Size};

/// Full background opacity.
pub const OPA_COVER: u8 = 255;

/// A recognised declaration with its value resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    TextColor(u32),
    Background(u32),
    Font(Font),
    Radius(i32),
    ZIndex(i32),
    Width(i32),
    Height(i32),
    Left(i32),
    Top(i32),
    /// `None` side means all four.
    Padding(Option<Side>, i32),
    Opacity(u8),
    /// Horizontal alignment plus the optional vertical keyword of the
    /// compound `"h v"` form.
    TextAlign(TextAlign, Option<String>),
    TextValign(String),
}

/// Parse one declaration. Percent coordinates resolve against `screen`.
pub fn parse_declaration(name: &str, value: &str, screen: Size) -> Option<Declaration> {
    let decl = match name {
        "color" => Declaration::TextColor(parse_css_color(value)),
        "background" | "background-color" | "bgcolor" => {
            Declaration::Background(parse_css_color(value))
        }
        "font-size" | "font" => Declaration::Font(Font::nearest(parse_size_value(value))),
        "border-radius" | "radius" => Declaration::Radius(parse_size_value(value)),
        "z-index" => Declaration::ZIndex(leading_int(value)),
        "width" | "w" => Declaration::Width(parse_coord(value, screen.width)),
        "height" | "h" => Declaration::Height(parse_coord(value, screen.height)),
        "left" => Declaration::Left(parse_coord(value, screen.width)),
        "top" => Declaration::Top(parse_coord(value, screen.height)),
        "padding" => Declaration::Padding(None, parse_size_value(value)),
        "padding-top" => Declaration::Padding(Some(Side::Top), parse_size_value(value)),
        "padding-right" => Declaration::Padding(Some(Side::Right), parse_size_value(value)),
        "padding-bottom" => Declaration::Padding(Some(Side::Bottom), parse_size_value(value)),
        "padding-left" => Declaration::Padding(Some(Side::Left), parse_size_value(value)),
        "opacity" => {
            let f = leading_float(value).0.unwrap_or(0.0);
            Declaration::Opacity((f * 255.0).clamp(0.0, 255.0) as u8)
        }
        "text-align" => match value.split_once(' ') {
            Some((h, v)) => Declaration::TextAlign(TextAlign::from_keyword(h), Some(v.trim().to_string())),
            None => Declaration::TextAlign(TextAlign::from_keyword(value), None),
        },
        "text-valign" => Declaration::TextValign(value.to_string()),
        _ => return None,
    };
    Some(decl)
}

/// Parse a size such as `"12"`, `"12px"` or `"-4"`: digits and `-` are
/// collected (spaces skipped) up to the first other character.
pub fn parse_size_value(value: &str) -> i32 {
    let mut digits = String::new();
    for c in value.chars() {
        match c {
            '0'..='9' | '-' => digits.push(c),
            ' ' => continue,
            _ => break,
        }
    }
    leading_int(&digits)
}

/// Apply one rule's declarations to `widget` in property-name order.
///
/// Vertical text alignment is deferred until every other declaration of the
/// rule has been applied, because it depends on the final height, font and
/// bottom padding. `text-valign` wins over the vertical half of a compound
/// `text-align`. Returns the rule's `z-index`, which the caller resolves
/// against its element registry.
pub fn apply_properties<B: Backend + ?Sized>(
    backend: &mut B,
    widget: WidgetId,
    properties: &BTreeMap<String, String>,
    screen: Size,
) -> Option<i32> {
    let mut z_index = None;
    let mut valign: Option<String> = None;
    let mut compound_valign: Option<String> = None;

    for (name, value) in properties {
        let Some(decl) = parse_declaration(name, value, screen) else {
            continue;
        };
        match decl {
            Declaration::TextColor(c) => backend.set_style(widget, StyleProp::TextColor(c)),
            Declaration::Background(c) => {
                backend.set_style(widget, StyleProp::BgColor(c));
                backend.set_style(widget, StyleProp::BgOpacity(OPA_COVER));
            }
            Declaration::Font(f) => backend.set_style(widget, StyleProp::Font(f)),
            Declaration::Radius(r) => backend.set_style(widget, StyleProp::Radius(r)),
            Declaration::ZIndex(z) => z_index = Some(z),
            Declaration::Width(w) if w > 0 => {
                let r = backend.rect(widget);
                backend.set_size(widget, w, r.height);
            }
            Declaration::Height(h) if h > 0 => {
                let r = backend.rect(widget);
                backend.set_size(widget, r.width, h);
            }
            Declaration::Left(x) if x >= 0 => {
                let r = backend.rect(widget);
                backend.set_pos(widget, x, r.y);
            }
            Declaration::Top(y) if y >= 0 => {
                let r = backend.rect(widget);
                backend.set_pos(widget, r.x, y);
            }
            Declaration::Padding(side, p) if p >= 0 => match side {
                Some(s) => backend.set_style(widget, StyleProp::Padding(s, p)),
                None => {
                    for s in [Side::Top, Side::Right, Side::Bottom, Side::Left] {
                        backend.set_style(widget, StyleProp::Padding(s, p));
                    }
                }
            },
            Declaration::Opacity(o) => backend.set_style(widget, StyleProp::Opacity(o)),
            Declaration::TextAlign(h, v) => {
                backend.set_style(widget, StyleProp::TextAlign(h));
                compound_valign = v;
            }
            Declaration::TextValign(v) => valign = Some(v),
            _ => {}
        }
    }

    if let Some(v) = valign.or(compound_valign) {
        let height = backend.rect(widget).height;
        apply_text_valign(backend, widget, &v, height);
    }
    z_index
}

/// Vertically place single-line text inside a widget of `height` by setting
/// its top padding. `top` and empty values, and non-positive heights, leave
/// the widget untouched.
pub fn apply_text_valign<B: Backend + ?Sized>(
    backend: &mut B,
    widget: WidgetId,
    valign: &str,
    height: i32,
) {
    if valign.is_empty() || valign == "top" || height <= 0 {
        return;
    }
    let style = backend.style(widget);
    let line = backend.line_height(style.font_or_default());
    let available = height - style.pad_bottom.unwrap_or(0);
    let pad = match valign {
        "center" => (available - line) / 2,
        "bottom" => available - line,
        _ => return,
    };
    if pad > 0 {
        backend.set_style(widget, StyleProp::Padding(Side::Top, pad));
    }
}
