//! Snapshot rendering helpers.
//!
//! Render markup headlessly and turn the resulting widget tree into the
//! indented outline produced by [`HeadlessBackend::dump`], suitable for
//! `insta` snapshots and plain assertions.

use crate::app::Engine;
use crate::backend::Backend;
use crate::dom::HeadlessBackend;

/// Render `markup` on a fresh `width` × `height` headless engine and return
/// the outline of the whole screen.
///
/// # Examples
///
/// ```ignore
/// use markup_ui::testing::render_to_string;
///
/// let out = render_to_string(r#"<label x="10" y="5">Hi</label>"#, 100, 50);
/// assert!(out.contains(r#"Label 10,5"#));
/// ```
pub fn render_to_string(markup: &str, width: i32, height: i32) -> String {
    let mut engine = Engine::new_headless(width, height);
    engine.render(markup);
    tree_to_string(&engine)
}

/// Outline of the screen of an existing headless engine.
pub fn tree_to_string(engine: &Engine<HeadlessBackend>) -> String {
    let backend = engine.backend();
    backend.dump(backend.screen())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_markup_is_bare_screen() {
        assert_eq!(render_to_string("", 100, 50), "Screen 0,0 100x50\n");
    }

    #[test]
    fn outline_nests_children() {
        let out = render_to_string(r#"<page id="p"><label x="10" y="5">Hi</label></page>"#, 100, 50);
        insta::assert_snapshot!(out, @r#"
        Screen 0,0 100x50
          Page 0,0 100x50
            Label 10,5 0x0 "Hi"
        "#);
    }

    #[test]
    fn hidden_pages_are_marked() {
        let out = render_to_string(r#"<page id="a"/><page id="b"/>"#, 100, 50);
        assert_eq!(
            out,
            "Screen 0,0 100x50\n  Page 0,0 100x50\n  Page 0,0 100x50 hidden\n"
        );
    }
}
