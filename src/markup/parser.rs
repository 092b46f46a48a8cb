//! Recursive descent markup parser.
//!
//! Turns HTML-like text into a tree of [`ParsedElement`]s in a single forward
//! scan. The parser never fails: malformed input (a missing closing tag, a
//! stray `<`, an unterminated comment) truncates the affected subtree and the
//! partially built tree is returned as-is.

use std::collections::BTreeMap;
use std::ops::ControlFlow;

use crate::geometry::{leading_float, leading_int};

/// Tags whose content is captured verbatim instead of being parsed.
const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Tags whose raw inner source is kept alongside the parsed children.
const RAW_INNER_TAGS: &[&str] = &["button"];

// ---------------------------------------------------------------------------
// ParsedElement
// ---------------------------------------------------------------------------

/// One element of the parsed markup tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedElement {
    /// Lowercased tag name. The synthetic document root is `"root"`.
    pub tag: String,
    /// Attributes with lowercased names. Later duplicates overwrite earlier ones.
    pub attrs: BTreeMap<String, String>,
    /// Trimmed text segments concatenated in order, or the verbatim body of
    /// `script`/`style`.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<ParsedElement>,
    /// Unparsed source between the start tag and its close tag. Only kept
    /// for tags that need text interleaved with children (`button`).
    pub inner: String,
}

impl ParsedElement {
    /// Create an element with the given tag and nothing else.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Add an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Set the text (builder).
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: ParsedElement) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the attribute is present at all.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute value, or `""` when absent.
    pub fn attr(&self, name: &str) -> &str {
        self.attrs.get(name).map_or("", String::as_str)
    }

    /// Attribute value, or `default` when absent.
    pub fn attr_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.attrs.get(name).map_or(default, String::as_str)
    }

    /// Integer attribute (leading digits), or `default` when absent or empty.
    pub fn attr_int(&self, name: &str, default: i32) -> i32 {
        match self.attrs.get(name) {
            Some(v) if !v.is_empty() => leading_int(v),
            _ => default,
        }
    }

    /// Float attribute, or `default` when absent or empty.
    pub fn attr_float(&self, name: &str, default: f32) -> f32 {
        match self.attrs.get(name) {
            Some(v) if !v.is_empty() => leading_float(v).0.unwrap_or(0.0),
            _ => default,
        }
    }

    /// Boolean attribute: true when the value starts with `t`, `T`, `1`, `y`
    /// or `Y`; `default` when absent or empty.
    pub fn attr_bool(&self, name: &str, default: bool) -> bool {
        match self.attrs.get(name).and_then(|v| v.bytes().next()) {
            Some(c) => matches!(c, b't' | b'T' | b'1' | b'y' | b'Y'),
            None => default,
        }
    }

    /// First direct child with the given tag.
    pub fn find(&self, tag: &str) -> Option<&ParsedElement> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// All direct children with the given tag.
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a ParsedElement> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Depth-first search for the first descendant with the given tag.
    pub fn find_descendant(&self, tag: &str) -> Option<&ParsedElement> {
        for child in &self.children {
            if child.tag == tag {
                return Some(child);
            }
            if let Some(found) = child.find_descendant(tag) {
                return Some(found);
            }
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.tag.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Parse a whole document. The returned root has tag `"root"` and holds the
/// top-level elements as children.
pub fn parse(input: &str) -> ParsedElement {
    let mut root = ParsedElement::new("root");
    for_each(input, |el| {
        root.children.push(el);
        ControlFlow::Continue(())
    });
    root
}

/// Visit each top-level element in order without keeping earlier siblings
/// alive. The visitor may stop the scan by returning `ControlFlow::Break`.
pub fn for_each<F>(input: &str, mut visit: F)
where
    F: FnMut(ParsedElement) -> ControlFlow<()>,
{
    let mut cursor = Cursor::new(input);
    loop {
        cursor.skip_ws();
        if cursor.eof() {
            break;
        }
        if cursor.peek() != Some(b'<') {
            cursor.advance(1);
            continue;
        }
        if cursor.skip_comment_or_declaration() {
            continue;
        }
        // Stray closing tag at the top level ends the document.
        if cursor.rest().starts_with("</") {
            break;
        }
        let element = parse_element(&mut cursor);
        if element.is_empty() {
            continue;
        }
        if visit(element).is_break() {
            break;
        }
    }
}

/// Find the first element with `tag` at any depth, stopping the scan as soon
/// as the enclosing top-level element has been parsed.
pub fn find_section(input: &str, tag: &str) -> Option<ParsedElement> {
    let mut found = None;
    for_each(input, |el| {
        if el.tag == tag {
            found = Some(el);
        } else if let Some(inner) = el.find_descendant(tag) {
            found = Some(inner.clone());
        }
        if found.is_some() {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    found
}

/// Raw source text between `<tag ...>` and the next `</tag>`, without parsing.
/// Returns `""` when either end is missing.
pub fn extract_section<'a>(input: &'a str, tag: &str) -> &'a str {
    let open = format!("<{tag}");
    let Some(start) = input.find(&open) else {
        return "";
    };
    let Some(gt) = input[start..].find('>') else {
        return "";
    };
    let content_start = start + gt + 1;
    let close = format!("</{tag}>");
    match input[content_start..].find(&close) {
        Some(len) => &input[content_start..content_start + len],
        None => "",
    }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// Byte cursor over the source. Every stop character is ASCII, so slicing at
/// cursor positions always lands on UTF-8 boundaries.
struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn eof(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.src.len());
        while !self.src.is_char_boundary(self.pos) {
            self.pos += 1;
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    /// Skip `<!-- ... -->`, `<!DOCTYPE ...>` or `<? ... ?>` at the cursor.
    fn skip_comment_or_declaration(&mut self) -> bool {
        let rest = self.rest();
        if rest.starts_with("<!--") {
            match rest[4..].find("-->") {
                Some(end) => self.advance(4 + end + 3),
                None => self.pos = self.src.len(),
            }
            true
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            match rest.find('>') {
                Some(end) => self.advance(end + 1),
                None => self.pos = self.src.len(),
            }
            true
        } else {
            false
        }
    }

    /// Consume a run of name characters (`[A-Za-z0-9_:-]`), lowercased.
    fn name(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.pos += 1;
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    /// Consume up to (not including) the next `<`, trimmed.
    fn text(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find('<').unwrap_or(rest.len());
        self.pos += len;
        rest[..len].trim()
    }
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, b'-' | b'_' | b':')
}

// ---------------------------------------------------------------------------
// Grammar
// ---------------------------------------------------------------------------

/// Parse one element starting at `<`. Returns an element with an empty tag
/// when no tag name follows the `<`.
fn parse_element(cursor: &mut Cursor<'_>) -> ParsedElement {
    let mut element = ParsedElement::default();
    if cursor.peek() != Some(b'<') {
        return element;
    }
    cursor.advance(1);
    cursor.skip_ws();
    element.tag = cursor.name();
    if element.tag.is_empty() {
        return element;
    }

    parse_attrs(cursor, &mut element.attrs);
    cursor.skip_ws();

    if cursor.peek() == Some(b'/') {
        cursor.advance(1);
        if cursor.peek() == Some(b'>') {
            cursor.advance(1);
        }
        return element;
    }
    if cursor.peek() == Some(b'>') {
        cursor.advance(1);
    }

    if RAW_TEXT_TAGS.contains(&element.tag.as_str()) {
        element.text = raw_text_until_close(cursor, &element.tag);
        return element;
    }

    let content_start = cursor.pos;
    let mut content_end = None;
    while !cursor.eof() {
        cursor.skip_ws();
        if cursor.eof() {
            break;
        }
        if cursor.peek() == Some(b'<') {
            if cursor.skip_comment_or_declaration() {
                continue;
            }
            if cursor.rest().starts_with("</") {
                content_end = Some(cursor.pos);
                match cursor.rest().find('>') {
                    Some(end) => cursor.advance(end + 1),
                    None => cursor.pos = cursor.src.len(),
                }
                break;
            }
            let child = parse_element(cursor);
            if !child.is_empty() {
                element.children.push(child);
            }
        } else {
            let text = cursor.text();
            element.text.push_str(text);
        }
    }

    if RAW_INNER_TAGS.contains(&element.tag.as_str()) {
        let end = content_end.unwrap_or(cursor.src.len());
        element.inner = cursor.src[content_start..end].to_string();
    }
    element
}

fn parse_attrs(cursor: &mut Cursor<'_>, attrs: &mut BTreeMap<String, String>) {
    while !cursor.eof() {
        cursor.skip_ws();
        match cursor.peek() {
            None | Some(b'>') | Some(b'/') => break,
            _ => {}
        }
        let name = cursor.name();
        if name.is_empty() {
            // Not a name character; step over it.
            cursor.advance(1);
            continue;
        }
        cursor.skip_ws();
        if cursor.peek() == Some(b'=') {
            cursor.advance(1);
            cursor.skip_ws();
            let value = attr_value(cursor);
            attrs.insert(name, value);
        } else {
            attrs.insert(name, "true".to_string());
        }
    }
}

fn attr_value(cursor: &mut Cursor<'_>) -> String {
    match cursor.peek() {
        Some(quote @ (b'"' | b'\'')) => {
            cursor.advance(1);
            let rest = cursor.rest();
            let len = rest.find(quote as char).unwrap_or(rest.len());
            let value = rest[..len].to_string();
            cursor.advance(len);
            if cursor.peek() == Some(quote) {
                cursor.advance(1);
            }
            value
        }
        _ => {
            let rest = cursor.rest();
            let len = rest
                .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
                .unwrap_or(rest.len());
            cursor.advance(len);
            rest[..len].to_string()
        }
    }
}

/// Capture raw text up to `</tag>`. Without a closing tag the rest of the
/// input is taken.
fn raw_text_until_close(cursor: &mut Cursor<'_>, tag: &str) -> String {
    let close = format!("</{tag}>");
    let rest = cursor.rest();
    match rest.find(&close) {
        Some(len) => {
            cursor.advance(len + close.len());
            rest[..len].to_string()
        }
        None => {
            cursor.pos = cursor.src.len();
            rest.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_tree() {
        let root = parse("<app><ui><page id=\"main\"><label>Hi</label></page></ui></app>");
        assert_eq!(root.tag, "root");
        assert_eq!(root.children.len(), 1);
        let page = root.children[0].find("ui").and_then(|ui| ui.find("page")).unwrap();
        assert_eq!(page.attr("id"), "main");
        assert_eq!(page.children[0].tag, "label");
        assert_eq!(page.children[0].text, "Hi");
    }

    #[test]
    fn test_names_are_lowercased() {
        let root = parse("<LABEL ID=\"x\" Class='big'>T</LABEL>");
        let label = &root.children[0];
        assert_eq!(label.tag, "label");
        assert_eq!(label.attr("id"), "x");
        assert_eq!(label.attr("class"), "big");
    }

    #[test]
    fn test_attribute_value_forms() {
        let root = parse("<input a=\"double\" b='single' c=bare d e = spaced/>");
        let el = &root.children[0];
        assert_eq!(el.attr("a"), "double");
        assert_eq!(el.attr("b"), "single");
        assert_eq!(el.attr("c"), "bare");
        assert_eq!(el.attr("d"), "true");
        assert_eq!(el.attr("e"), "spaced");
        assert!(el.children.is_empty());
    }

    #[test]
    fn test_unquoted_value_stops_at_slash_and_gt() {
        let root = parse("<switch bind=on/><slider max=10>");
        assert_eq!(root.children[0].attr("bind"), "on");
        assert_eq!(root.children[1].attr("max"), "10");
    }

    #[test]
    fn test_comments_are_skipped() {
        let root = parse("<!-- top --><page><!-- inner --><label>A</label></page>");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn test_doctype_is_skipped() {
        let root = parse("<!DOCTYPE html>\n<app version=\"1\"></app>");
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].attr("version"), "1");
    }

    #[test]
    fn test_script_and_style_are_raw() {
        let root = parse("<script>if a < b then x() end</script><style>.a { color: red; }</style>");
        assert_eq!(root.children[0].text, "if a < b then x() end");
        assert!(root.children[0].children.is_empty());
        assert_eq!(root.children[1].text, ".a { color: red; }");
    }

    #[test]
    fn test_text_segments_are_trimmed_and_joined() {
        let root = parse("<label>\n  Hello  <b/>  World \n</label>");
        assert_eq!(root.children[0].text, "HelloWorld");
        assert_eq!(root.children[0].children.len(), 1);
    }

    #[test]
    fn test_missing_close_truncates() {
        let root = parse("<page id=\"p\"><label>one");
        let page = &root.children[0];
        assert_eq!(page.attr("id"), "p");
        assert_eq!(page.children[0].text, "one");
    }

    #[test]
    fn test_unterminated_script_takes_rest() {
        let root = parse("<script>print(1)");
        assert_eq!(root.children[0].text, "print(1)");
    }

    #[test]
    fn test_stray_close_at_top_level_stops() {
        let root = parse("<a/></oops><b/>");
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_utf8_text() {
        let root = parse("<label>Température °C</label>");
        assert_eq!(root.children[0].text, "Température °C");
    }

    #[test]
    fn test_attr_helpers() {
        let el = ParsedElement::new("x")
            .with_attr("n", "42px")
            .with_attr("f", "1.5")
            .with_attr("b", "Yes")
            .with_attr("e", "");
        assert_eq!(el.attr_int("n", 0), 42);
        assert_eq!(el.attr_int("missing", 7), 7);
        assert_eq!(el.attr_int("e", 7), 7);
        assert_eq!(el.attr_float("f", 0.0), 1.5);
        assert!(el.attr_bool("b", false));
        assert!(el.attr_bool("missing", true));
        assert_eq!(el.attr_or("missing", "dflt"), "dflt");
    }

    #[test]
    fn test_find_all_direct_children_only() {
        let root = parse("<ui><page id=\"a\"/><page id=\"b\"/><group><page id=\"c\"/></group></ui>");
        let ui = &root.children[0];
        let ids: Vec<_> = ui.find_all("page").map(|p| p.attr("id")).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_find_section_recursive() {
        let src = "<app><state><int name=\"n\" default=\"3\"/></state><ui/></app>";
        let state = find_section(src, "state").unwrap();
        assert_eq!(state.children[0].attr("name"), "n");
        assert!(find_section(src, "missing").is_none());
    }

    #[test]
    fn test_for_each_can_stop_early() {
        let mut seen = Vec::new();
        for_each("<a/><b/><c/>", |el| {
            seen.push(el.tag.clone());
            if el.tag == "b" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_extract_section() {
        let src = "<app><style>\n.x{color:red}\n</style></app>";
        assert_eq!(extract_section(src, "style"), "\n.x{color:red}\n");
        assert_eq!(extract_section(src, "script"), "");
        assert_eq!(extract_section("<style>open", "style"), "");
    }

    #[test]
    fn test_button_keeps_raw_inner_source() {
        let root = parse("<page><button id=\"t\"><label>{h}</label>:<label>{m}</label></button></page>");
        let button = &root.children[0].children[0];
        assert_eq!(button.inner, "<label>{h}</label>:<label>{m}</label>");
        assert_eq!(button.text, ":");
        assert_eq!(button.children.len(), 2);
        // Other tags do not keep it.
        assert_eq!(root.children[0].inner, "");

        let open = parse("<button>a <b>b</b>");
        assert_eq!(open.children[0].inner, "a <b>b</b>");
    }
}
