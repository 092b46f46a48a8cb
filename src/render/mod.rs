//! Rendering: markup text → native widget tree.
//!
//! [`Engine::render`] runs in passes:
//!
//! 1. head sections (`<state>`, `<style>`, `<script>`, ...);
//! 2. groups, each a tile view with one tile per `<page>`;
//! 3. standalone pages;
//! 4. the widgets inside every tile and page;
//! 5. z-order, then the initial page is shown.
//!
//! Markup with neither pages nor groups is built straight onto the screen.

pub mod builder;
pub mod head;

use tracing::{debug, info, warn};

use crate::app::Engine;
use crate::backend::{Backend, WidgetId};
use crate::css::color::parse_attr_color;
use crate::css::properties::OPA_COVER;
use crate::css::StyleProp;
use crate::event::{EventKind, Listener};
use crate::markup::{parse, ParsedElement};
use crate::navigation::{apply_z_order, Indicator, Orientation};
use crate::widget::{Element, WidgetKind};

pub use builder::CommonAttrs;
pub use head::{parse_head, AppMeta, ConfigHints, DisplayBuffer, HeadData, Script, Timer};

/// A container whose children are built in the widget pass.
struct Content<'a> {
    element: &'a ParsedElement,
    parent: WidgetId,
}

/// Collect `<group>` and standalone `<page>` elements in document order.
/// Neither is searched for further groups or pages.
fn collect_layout<'a>(
    el: &'a ParsedElement,
    groups: &mut Vec<&'a ParsedElement>,
    pages: &mut Vec<&'a ParsedElement>,
) {
    for child in &el.children {
        match child.tag.as_str() {
            "group" => groups.push(child),
            "page" => pages.push(child),
            _ => collect_layout(child, groups, pages),
        }
    }
}

fn apply_page_background<B: Backend + ?Sized>(backend: &mut B, widget: WidgetId, page: &ParsedElement) {
    let bg = page.attr("bgcolor");
    if !bg.is_empty() {
        backend.set_style(widget, StyleProp::BgColor(parse_attr_color(bg)));
        backend.set_style(widget, StyleProp::BgOpacity(OPA_COVER));
    }
}

impl<B: Backend> Engine<B> {
    /// Render `markup` and return the number of registered elements.
    ///
    /// Rendering adds to whatever is already on screen; call
    /// [`clear`](Engine::clear) first to replace a previous render.
    pub fn render(&mut self, markup: &str) -> usize {
        let doc = parse(markup);
        let app = doc.find("app").unwrap_or(&doc);

        self.stylesheet.clear();
        let icon_dir = self.config.system_icon_dir.clone();
        self.head = parse_head(app, &mut self.store, &mut self.stylesheet, &icon_dir);

        let mut groups = Vec::new();
        let mut pages = Vec::new();
        collect_layout(&doc, &mut groups, &mut pages);

        let mut contents: Vec<Content<'_>> = Vec::new();
        for group in groups {
            self.render_group(group, &mut contents);
        }
        self.render_pages(&pages, &mut contents);

        if self.navigator.pages.is_empty() && self.navigator.groups.is_empty() {
            let root = app.find("ui").unwrap_or(app);
            let screen = self.backend.screen();
            contents.push(Content {
                element: root,
                parent: screen,
            });
        }

        debug!(containers = contents.len(), "building widgets");
        for content in &contents {
            self.build_children(content.element, content.parent);
        }

        apply_z_order(&mut self.backend, &self.elements);
        if !self.pending_z.is_empty() {
            debug!(count = self.pending_z.len(), "unclaimed z-index dropped");
            self.pending_z.clear();
        }
        self.show_initial_page();

        info!(
            elements = self.elements.len(),
            groups = self.navigator.groups.len(),
            pages = self.navigator.pages.len(),
            "render done"
        );
        self.elements.len()
    }

    fn render_group<'a>(&mut self, group: &'a ParsedElement, contents: &mut Vec<Content<'a>>) {
        let id = group.attr("id");
        if id.is_empty() {
            warn!("group without id skipped");
            return;
        }
        let screen = self.config.screen;
        let max_pages = self.config.max_pages_per_group;
        let gi = self.navigator.add_group(
            &mut self.backend,
            id,
            group.attr("default"),
            Orientation::from_keyword(group.attr("orientation")),
            Indicator::from_keyword(group.attr("indicator")),
            screen,
        );

        let mut added = 0;
        for page in group.find_all("page") {
            let page_id = page.attr("id");
            if page_id.is_empty() {
                warn!(group = id, "page without id skipped");
                continue;
            }
            if added >= max_pages {
                warn!(group = id, page = page_id, max_pages, "too many pages in group");
                continue;
            }
            let Some(tile) = self.navigator.add_tile(&mut self.backend, gi, page_id, screen) else {
                continue;
            };
            added += 1;
            apply_page_background(&mut self.backend, tile, page);
            self.elements
                .push(Element::new(format!("{id}/{page_id}"), WidgetKind::Page, tile));
            contents.push(Content {
                element: page,
                parent: tile,
            });
            debug!(group = id, page = page_id, "tile");
        }

        self.navigator.finalize_group(&mut self.backend, gi);
        if let Some(grp) = self.navigator.groups.get(gi) {
            let tile_view = grp.tile_view;
            self.router
                .on(tile_view, EventKind::ValueChanged, Listener::TileView(gi));
            self.elements.push(Element::new(id, WidgetKind::Page, tile_view));
        }
        debug!(group = id, pages = added, "group");
    }

    fn render_pages<'a>(&mut self, pages: &[&'a ParsedElement], contents: &mut Vec<Content<'a>>) {
        let screen = self.config.screen;
        let max_pages = self.config.max_pages;
        for page in pages {
            let id = page.attr("id");
            if id.is_empty() {
                warn!("page without id skipped");
                continue;
            }
            if self.navigator.pages.len() >= max_pages {
                warn!(page = id, max_pages, "too many pages");
                break;
            }
            let widget = self.navigator.add_page(&mut self.backend, id, screen);
            apply_page_background(&mut self.backend, widget, page);
            self.elements.push(Element::new(id, WidgetKind::Page, widget));
            contents.push(Content {
                element: page,
                parent: widget,
            });
            debug!(page = id, "page");
        }
    }

    /// Show the `<ui default>` page when it resolves, otherwise the first
    /// group, otherwise the first standalone page.
    fn show_initial_page(&mut self) {
        let default = self.head.default_page.clone();
        if !default.is_empty() && self.show_page(&default).is_ok() {
            return;
        }
        let first = self
            .navigator
            .groups
            .first()
            .map(|g| g.id.clone())
            .or_else(|| self.navigator.pages.first().map(|p| p.id.clone()));
        if let Some(target) = first {
            if let Err(err) = self.show_page(&target) {
                warn!(%err, "initial page");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::app::Engine;
    use crate::backend::{Backend, NativeKind};
    use crate::dom::HeadlessBackend;
    use pretty_assertions::assert_eq;

    fn engine() -> Engine<HeadlessBackend> {
        Engine::new_headless(480, 320)
    }

    const APP: &str = r##"
        <app version="1.0">
          <state><int name="count" default="2"/></state>
          <style>.big { font-size: 48; }</style>
          <ui default="/settings">
            <page id="main"><label id="title" class="big">Count {count}</label></page>
            <page id="settings" bgcolor="#202020"><switch id="wifi"/></page>
          </ui>
          <script>on = 1</script>
        </app>"##;

    #[test]
    fn render_counts_elements_and_pages() {
        let mut e = engine();
        assert_eq!(e.render(APP), 4);
        assert!(e.has_page("main"));
        assert!(e.has_page("settings"));
        assert!(!e.has_page("title"));
        assert_eq!(e.backend().text(e.get("title").unwrap()), "Count 2");
        assert_eq!(e.app_version(), "1.0");
        assert_eq!(e.script_code(), "on = 1");
    }

    #[test]
    fn default_page_shown_first() {
        let mut e = engine();
        e.render(APP);
        assert_eq!(e.current_page_id(), "settings");
        let main = e.get("main").unwrap();
        let settings = e.get("settings").unwrap();
        assert!(e.backend().is_hidden(main));
        assert!(!e.backend().is_hidden(settings));
        assert_eq!(e.backend().style(settings).bg_color, Some(0x202020));
    }

    #[test]
    fn widgets_land_inside_their_page() {
        let mut e = engine();
        e.render(APP);
        let title = e.get("title").unwrap();
        assert_eq!(e.backend().parent(title), e.get("main"));
    }

    #[test]
    fn groups_register_tiles_and_group() {
        let mut e = engine();
        let n = e.render(
            r#"<ui><group id="g" indicator="dots">
                 <page id="a"><label id="la">A</label></page>
                 <page id="b"/>
               </group></ui>"#,
        );
        assert_eq!(n, 4);
        assert!(e.has_page("g/a"));
        assert!(e.has_page("g/b"));
        assert!(e.has_page("g"));
        assert_eq!(e.current_page_id(), "a");
        let tile = e.get("g/a").unwrap();
        assert_eq!(e.backend().kind(tile), Some(NativeKind::Tile));
        assert_eq!(e.backend().parent(e.get("la").unwrap()), Some(tile));
    }

    #[test]
    fn group_page_cap() {
        let mut e = engine();
        e.render(
            r#"<group id="g">
                 <page id="p1"/><page id="p2"/><page id="p3"/>
                 <page id="p4"/><page id="p5"/>
               </group>"#,
        );
        assert_eq!(e.navigator().group("g").unwrap().page_ids.len(), 4);
        assert!(!e.has_page("g/p5"));
    }

    #[test]
    fn pages_without_id_are_skipped() {
        let mut e = engine();
        e.render(r#"<page><label id="lost">x</label></page><page id="p"/>"#);
        assert!(e.get("lost").is_none());
        assert!(e.has_page("p"));
    }

    #[test]
    fn pageless_markup_builds_on_screen() {
        let mut e = engine();
        e.render(r#"<label id="x">hi</label>"#);
        let x = e.get("x").unwrap();
        assert_eq!(e.backend().parent(x), Some(e.backend().screen()));
    }

    #[test]
    fn render_after_clear_is_identical() {
        let mut e = engine();
        let markup = r#"<page id="p"><label>{a}</label><button onclick="f">go</button></page>"#;
        let first = e.render(markup);
        let ids: Vec<String> = e.elements().ids().map(String::from).collect();
        e.clear();
        assert_eq!(e.render(markup), first);
        let again: Vec<String> = e.elements().ids().map(String::from).collect();
        assert_eq!(again, ids);
    }
}
