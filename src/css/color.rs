//! Color value parsing.
//!
//! Colors are plain `0xRRGGBB` integers throughout the crate.

/// Named colors accepted in stylesheets.
const NAMED_COLORS: &[(&str, u32)] = &[
    ("black", 0x000000),
    ("white", 0xFFFFFF),
    ("red", 0xFF0000),
    ("green", 0x00FF00),
    ("blue", 0x0000FF),
    ("yellow", 0xFFFF00),
    ("cyan", 0x00FFFF),
    ("magenta", 0xFF00FF),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("orange", 0xFFA500),
    ("transparent", 0x000000),
];

/// Parse a stylesheet color: a named color, `#RGB` or `#RRGGBB` (the `#` is
/// optional). Unrecognised values are black.
pub fn parse_css_color(value: &str) -> u32 {
    let v = value.trim();
    let v = v.strip_prefix('#').unwrap_or(v);
    if let Some((_, rgb)) = NAMED_COLORS.iter().find(|(name, _)| *name == v) {
        return *rgb;
    }
    match v.len() {
        6 => u32::from_str_radix(v, 16).unwrap_or(0),
        3 => u32::from_str_radix(v, 16).map_or(0, expand_short_hex),
        _ => 0,
    }
}

/// Parse an inline attribute color (`#RGB`, `#RRGGBB` or bare hex digits).
///
/// Hex digits are read up to the first non-hex character; a three digit
/// value expands by nibble duplication. Anything unparsable is black.
pub fn parse_attr_color(value: &str) -> u32 {
    let v = value.trim();
    let v = v.strip_prefix('#').unwrap_or(v);
    let digits = v.bytes().take_while(u8::is_ascii_hexdigit).count();
    let hex = &v[..digits];
    let Ok(raw) = u32::from_str_radix(hex, 16) else {
        return 0;
    };
    if digits == 3 {
        expand_short_hex(raw)
    } else {
        raw & 0xFFFFFF
    }
}

/// `0xRGB` → `0xRRGGBB`.
fn expand_short_hex(rgb: u32) -> u32 {
    let r = (rgb >> 8) & 0xF;
    let g = (rgb >> 4) & 0xF;
    let b = rgb & 0xF;
    (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)
}
