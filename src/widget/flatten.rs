//! Flattening of markup nested inside a `<button>`.
//!
//! A button owns exactly one text label, so nested markup is folded into a
//! single string before the button is built.

use crate::markup::ParsedElement;

/// Text and lifted label attributes of a button's content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatContent {
    pub text: String,
    /// `font` of a single nested label, `0` when unset.
    pub font: i32,
    /// `color` of a single nested label.
    pub color: String,
    /// `text-align` (or `align`) of a single nested label.
    pub text_align: String,
}

/// Fold a button's children into one label.
///
/// - no nested elements: the button's own text;
/// - exactly one nested `label`: its text plus `font`, `color` and
///   `text-align` (falling back to `align`);
/// - anything else: the raw content with every tag stripped, so text
///   between and inside nested elements stays in document order.
pub fn flatten_button(button: &ParsedElement) -> FlatContent {
    if button.children.is_empty() {
        return FlatContent {
            text: button.text.clone(),
            ..Default::default()
        };
    }

    let mut labels = Vec::new();
    collect_labels(button, &mut labels);
    if let [label] = labels.as_slice() {
        let text_align = match label.attr("text-align") {
            "" => label.attr("align"),
            v => v,
        };
        return FlatContent {
            text: label.text.clone(),
            font: label.attr_int("font", 0),
            color: label.attr("color").to_string(),
            text_align: text_align.to_string(),
        };
    }

    let text = if button.inner.is_empty() {
        // Trees built in code carry no source; fall back to the parsed text.
        let mut parts = Vec::new();
        collect_text(button, &mut parts);
        parts.join(" ")
    } else {
        strip_tags(&button.inner)
    };
    FlatContent {
        text,
        ..Default::default()
    }
}

/// Drop everything between `<` and `>`, then trim.
fn strip_tags(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for c in raw.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.trim().to_string()
}

fn collect_labels<'a>(el: &'a ParsedElement, out: &mut Vec<&'a ParsedElement>) {
    for child in &el.children {
        if child.tag == "label" {
            out.push(child);
        }
        collect_labels(child, out);
    }
}

fn collect_text<'a>(el: &'a ParsedElement, out: &mut Vec<&'a str>) {
    if !el.text.is_empty() {
        out.push(&el.text);
    }
    for child in &el.children {
        collect_text(child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::parse;
    use pretty_assertions::assert_eq;

    fn button(markup: &str) -> ParsedElement {
        parse(markup).children.remove(0)
    }

    #[test]
    fn test_plain_text() {
        let flat = flatten_button(&button("<button> Go {n} </button>"));
        assert_eq!(flat.text, "Go {n}");
        assert_eq!(flat.font, 0);
    }

    #[test]
    fn test_single_label_lifts_attributes() {
        let flat = flatten_button(&button(
            r##"<button><label font="48" color="#fff" align="center">7</label></button>"##,
        ));
        assert_eq!(
            flat,
            FlatContent {
                text: "7".into(),
                font: 48,
                color: "#fff".into(),
                text_align: "center".into(),
            }
        );
    }

    #[test]
    fn test_text_align_preferred_over_align() {
        let flat = flatten_button(&button(
            r#"<button><label text-align="right" align="center">x</label></button>"#,
        ));
        assert_eq!(flat.text_align, "right");
    }

    #[test]
    fn test_multiple_labels_concatenate() {
        let flat = flatten_button(&button(
            "<button><label>{h}</label><label>:</label><label>{m}</label></button>",
        ));
        assert_eq!(flat.text, "{h}:{m}");
        assert!(flat.color.is_empty());
    }

    #[test]
    fn test_text_between_labels_keeps_document_order() {
        let flat = flatten_button(&button(
            "<button><label>{h}</label>:<label>{m}</label></button>",
        ));
        assert_eq!(flat.text, "{h}:{m}");

        let flat = flatten_button(&button(
            "<button>\n  <label>{h}</label> h <label>{m}</label> m\n</button>",
        ));
        assert_eq!(flat.text, "{h} h {m} m");
    }

    #[test]
    fn test_built_tree_falls_back_to_parsed_text() {
        let el = ParsedElement::new("button")
            .with_text("a")
            .with_child(ParsedElement::new("b").with_text("b"))
            .with_child(ParsedElement::new("i").with_text("c"));
        assert_eq!(flatten_button(&el).text, "a b c");
    }

    #[test]
    fn test_non_label_markup_is_stripped() {
        let flat = flatten_button(&button("<button>Hi <b>there</b></button>"));
        assert_eq!(flat.text, "Hi there");
    }
}
