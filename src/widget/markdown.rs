//! Markdown subset → styled spans.
//!
//! Supported, line by line:
//!
//! | Markdown        | Span                         |
//! |-----------------|------------------------------|
//! | `# H1`          | large font, `h1_color`       |
//! | `## H2`         | medium font, `h2_color`      |
//! | `### H3`        | small font, `h2_color`       |
//! | `**bold**`      | `accent`                     |
//! | `*italic*`      | `dim`                        |
//! | `` `code` ``    | `code`                       |
//! | `- item`        | `"  • "` bullet then inline  |
//! | `1. item`       | indented number then text    |
//! | blank line      | paragraph break              |

use crate::backend::{Backend, Span, WidgetId};
use crate::css::styles::Font;

use super::TextRenderer;

/// Colors used by the markdown renderer, all `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownTheme {
    pub color: u32,
    pub h1_color: u32,
    pub h2_color: u32,
    pub accent: u32,
    pub dim: u32,
    pub code: u32,
}

impl Default for MarkdownTheme {
    fn default() -> Self {
        Self {
            color: 0xFFFFFF,
            h1_color: 0xFFFFFF,
            h2_color: 0xDDDDDD,
            accent: 0x4FC3F7,
            dim: 0xAAAAAA,
            code: 0x81C784,
        }
    }
}

/// Turn markdown text into spans.
pub fn render_markdown(text: &str, theme: &MarkdownTheme) -> Vec<Span> {
    let mut out = SpanWriter {
        spans: Vec::new(),
        theme,
    };
    if text.is_empty() {
        return out.spans;
    }
    let mut first_in_block = true;
    for line in text.split('\n') {
        if line.trim().is_empty() {
            out.push("\n\n", Font::Small, theme.color);
            first_in_block = true;
            continue;
        }
        if !first_in_block {
            out.push("\n", Font::Small, theme.color);
        }
        first_in_block = false;

        if let Some(rest) = line.strip_prefix("### ") {
            out.push(rest, Font::Small, theme.h2_color);
        } else if let Some(rest) = line.strip_prefix("## ") {
            out.push(rest, Font::Medium, theme.h2_color);
        } else if let Some(rest) = line.strip_prefix("# ") {
            out.push(rest, Font::Large, theme.h1_color);
        } else if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            out.push("  \u{2022} ", Font::Small, theme.dim);
            out.inline(rest);
        } else if let Some((number, rest)) = ordered_item(line) {
            out.push("  ", Font::Small, theme.color);
            out.push(number, Font::Small, theme.dim);
            out.push(rest, Font::Small, theme.color);
        } else {
            out.inline(line);
        }
    }
    out.spans
}

/// `"12. text"` → `("12. ", "text")`.
fn ordered_item(line: &str) -> Option<(&str, &str)> {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !line[digits..].starts_with(". ") {
        return None;
    }
    let split = digits + 2;
    if split >= line.len() {
        return None;
    }
    Some((&line[..split], &line[split..]))
}

struct SpanWriter<'t> {
    spans: Vec<Span>,
    theme: &'t MarkdownTheme,
}

impl SpanWriter<'_> {
    fn push(&mut self, text: &str, font: Font, color: u32) {
        if !text.is_empty() {
            self.spans.push(Span::new(text, font, color));
        }
    }

    /// Inline `**bold**`, `*italic*` and `` `code` ``. Unclosed markers are
    /// kept literally.
    fn inline(&mut self, text: &str) {
        let theme = *self.theme;
        let mut plain = String::new();
        let mut rest = text;
        while let Some(c) = rest.chars().next() {
            let (marker, color) = match c {
                '*' if rest.starts_with("**") => ("**", theme.accent),
                '*' => ("*", theme.dim),
                '`' => ("`", theme.code),
                _ => {
                    plain.push(c);
                    rest = &rest[c.len_utf8()..];
                    continue;
                }
            };
            self.push(&plain, Font::Small, theme.color);
            plain.clear();
            let body = &rest[marker.len()..];
            match body.find(marker) {
                Some(end) => {
                    self.push(&body[..end], Font::Small, color);
                    rest = &body[end + marker.len()..];
                }
                None => {
                    plain.push_str(marker);
                    rest = body;
                }
            }
        }
        self.push(&plain, Font::Small, theme.color);
    }
}

/// Re-renders a span group from markdown whenever its template changes.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
    pub theme: MarkdownTheme,
}

impl MarkdownRenderer {
    pub fn new(theme: MarkdownTheme) -> Self {
        Self { theme }
    }
}

impl TextRenderer for MarkdownRenderer {
    fn render(&self, backend: &mut dyn Backend, widget: WidgetId, text: &str) {
        backend.set_spans(widget, render_markdown(text, &self.theme));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(spans: &[Span]) -> Vec<&str> {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_headings() {
        let t = MarkdownTheme::default();
        let spans = render_markdown("# Title\n## Sub\n### Small", &t);
        assert_eq!(
            spans,
            vec![
                Span::new("Title", Font::Large, t.h1_color),
                Span::new("\n", Font::Small, t.color),
                Span::new("Sub", Font::Medium, t.h2_color),
                Span::new("\n", Font::Small, t.color),
                Span::new("Small", Font::Small, t.h2_color),
            ]
        );
    }

    #[test]
    fn test_inline_markers() {
        let t = MarkdownTheme::default();
        let spans = render_markdown("a **b** *c* `d` e", &t);
        assert_eq!(texts(&spans), vec!["a ", "b", " ", "c", " ", "d", " e"]);
        assert_eq!(spans[1].color, t.accent);
        assert_eq!(spans[3].color, t.dim);
        assert_eq!(spans[5].color, t.code);
    }

    #[test]
    fn test_unclosed_marker_is_literal() {
        let spans = render_markdown("2 ** 3", &MarkdownTheme::default());
        assert_eq!(texts(&spans), vec!["2 ", "** 3"]);
    }

    #[test]
    fn test_lists() {
        let t = MarkdownTheme::default();
        let spans = render_markdown("- one\n3. three", &t);
        assert_eq!(texts(&spans), vec!["  \u{2022} ", "one", "\n", "  ", "3. ", "three"]);
        assert_eq!(spans[4].color, t.dim);
    }

    #[test]
    fn test_blank_line_starts_paragraph() {
        let spans = render_markdown("a\n\nb", &MarkdownTheme::default());
        assert_eq!(texts(&spans), vec!["a", "\n\n", "b"]);
    }

    #[test]
    fn test_empty_text_has_no_spans() {
        assert!(render_markdown("", &MarkdownTheme::default()).is_empty());
    }
}
