//! Widget kinds and the element registry.
//!
//! Every rendered widget that needs to be found again (by id, by a binding
//! update, or by an event) is recorded as an [`Element`] in the [`Elements`]
//! arena. Elements are addressed by [`ElementIndex`], which stays valid until
//! the next `clear()` because the arena only ever grows in between.

pub mod canvas;
pub mod flatten;
pub mod markdown;

use std::fmt;

use crate::backend::{Backend, WidgetId};
use crate::reactive::extract_bind_var;

pub use canvas::{CanvasBuffer, DEFAULT_CANVAS_SIZE};
pub use flatten::{flatten_button, FlatContent};
pub use markdown::{render_markdown, MarkdownRenderer, MarkdownTheme};

// ---------------------------------------------------------------------------
// WidgetKind
// ---------------------------------------------------------------------------

/// Kinds of element the builder knows how to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Label,
    Button,
    Switch,
    Slider,
    /// Text area; `<input>` and `<textarea>` both map here.
    Input,
    Canvas,
    Image,
    Markdown,
    Tabs,
    /// Page, tile or group container. Never produced by [`WidgetKind::from_tag`].
    Page,
}

impl WidgetKind {
    /// Select the kind for a widget tag. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let kind = match tag {
            "label" => WidgetKind::Label,
            "button" => WidgetKind::Button,
            "switch" => WidgetKind::Switch,
            "slider" => WidgetKind::Slider,
            "input" | "textarea" => WidgetKind::Input,
            "canvas" => WidgetKind::Canvas,
            "image" => WidgetKind::Image,
            "markdown" => WidgetKind::Markdown,
            "tabs" => WidgetKind::Tabs,
            _ => return None,
        };
        Some(kind)
    }

    /// Tag name used for CSS tag selectors.
    pub fn tag(self) -> &'static str {
        match self {
            WidgetKind::Label => "label",
            WidgetKind::Button => "button",
            WidgetKind::Switch => "switch",
            WidgetKind::Slider => "slider",
            WidgetKind::Input => "input",
            WidgetKind::Canvas => "canvas",
            WidgetKind::Image => "image",
            WidgetKind::Markdown => "markdown",
            WidgetKind::Tabs => "tabs",
            WidgetKind::Page => "page",
        }
    }

    /// Prefix of generated ids for elements that need one but declare none.
    pub fn id_prefix(self) -> &'static str {
        match self {
            WidgetKind::Label => "_lbl",
            WidgetKind::Button => "_btn",
            WidgetKind::Switch => "_sw",
            WidgetKind::Slider => "_sl",
            WidgetKind::Input => "_inp",
            WidgetKind::Canvas => "_canvas",
            WidgetKind::Image => "_img",
            WidgetKind::Markdown => "_md",
            WidgetKind::Tabs => "_tabs",
            WidgetKind::Page => "_page",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// TextRenderer
// ---------------------------------------------------------------------------

/// Custom text update for widgets that are not plain labels.
///
/// When an element carries a renderer, binding updates hand it the rendered
/// template instead of setting the widget text directly.
pub trait TextRenderer: fmt::Debug {
    fn render(&self, backend: &mut dyn Backend, widget: WidgetId, text: &str);
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// Stable position of an element in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementIndex(usize);

impl ElementIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Names of host functions attached to an element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Actions {
    pub onclick: String,
    pub onhold: String,
    pub onchange: String,
    /// Navigation target followed after `onclick`.
    pub href: String,
    /// Canvas: called on press and drag with `_touchX`/`_touchY` set.
    pub ondraw: String,
    /// Canvas: called on tap with local coordinates.
    pub ontap: String,
}

/// A registered widget and everything needed to keep it in sync.
#[derive(Debug)]
pub struct Element {
    pub id: String,
    pub kind: WidgetKind,
    /// Widget whose text or value is updated (a button's inner label).
    pub obj: WidgetId,
    /// Outer widget when `obj` is nested (the button itself).
    pub parent_obj: Option<WidgetId>,
    /// Text template containing at least one `{var}`.
    pub template: Option<String>,
    /// Class list template containing at least one `{var}`.
    pub class_template: Option<String>,
    /// Variable names (braces stripped) of the single-property bindings.
    pub visible_bind: Option<String>,
    pub bgcolor_bind: Option<String>,
    pub color_bind: Option<String>,
    /// Variable mirrored by a switch, slider or input.
    pub bind: Option<String>,
    pub z_index: i32,
    pub actions: Actions,
    pub renderer: Option<Box<dyn TextRenderer>>,
    pub canvas: Option<CanvasBuffer>,
    /// Tick of the last throttled slider update.
    pub last_update_ms: Option<u64>,
}

impl Element {
    pub fn new(id: impl Into<String>, kind: WidgetKind, obj: WidgetId) -> Self {
        Self {
            id: id.into(),
            kind,
            obj,
            parent_obj: None,
            template: None,
            class_template: None,
            visible_bind: None,
            bgcolor_bind: None,
            color_bind: None,
            bind: None,
            z_index: 0,
            actions: Actions::default(),
            renderer: None,
            canvas: None,
            last_update_ms: None,
        }
    }

    /// Set the outer widget (builder).
    pub fn with_parent_obj(mut self, parent: WidgetId) -> Self {
        self.parent_obj = Some(parent);
        self
    }

    /// Set the text template; ignored unless it contains a placeholder.
    pub fn with_template(mut self, template: &str) -> Self {
        self.template = non_static(template);
        self
    }

    /// Set the class template; ignored unless it contains a placeholder.
    pub fn with_class_template(mut self, template: &str) -> Self {
        self.class_template = non_static(template);
        self
    }

    /// Set the two-way bound variable (builder).
    pub fn with_bind(mut self, name: &str) -> Self {
        self.bind = (!name.is_empty()).then(|| name.to_string());
        self
    }

    /// Bind visibility to the variable named by `binding` (`"{var}"` or `"var"`).
    pub fn with_visible_bind(mut self, binding: &str) -> Self {
        self.visible_bind = bind_name(binding);
        self
    }

    /// Bind the background color (builder).
    pub fn with_bgcolor_bind(mut self, binding: &str) -> Self {
        self.bgcolor_bind = bind_name(binding);
        self
    }

    /// Bind the text color (builder).
    pub fn with_color_bind(mut self, binding: &str) -> Self {
        self.color_bind = bind_name(binding);
        self
    }

    /// Set the host actions (builder).
    pub fn with_actions(mut self, actions: Actions) -> Self {
        self.actions = actions;
        self
    }

    /// Set the z-index (builder).
    pub fn with_z_index(mut self, z: i32) -> Self {
        self.z_index = z;
        self
    }

    /// Widget that position, visibility, background and z-order apply to.
    pub fn target(&self) -> WidgetId {
        self.parent_obj.unwrap_or(self.obj)
    }

    pub fn is_page(&self) -> bool {
        self.kind == WidgetKind::Page
    }
}

fn non_static(template: &str) -> Option<String> {
    template.contains('{').then(|| template.to_string())
}

fn bind_name(binding: &str) -> Option<String> {
    let name = extract_bind_var(binding);
    (!name.is_empty()).then(|| name.to_string())
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// Append-only arena of elements for one render generation.
#[derive(Debug, Default)]
pub struct Elements {
    items: Vec<Element>,
}

impl Elements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an element and return its index.
    pub fn push(&mut self, element: Element) -> ElementIndex {
        self.items.push(element);
        ElementIndex(self.items.len() - 1)
    }

    pub fn get(&self, index: ElementIndex) -> Option<&Element> {
        self.items.get(index.0)
    }

    pub fn get_mut(&mut self, index: ElementIndex) -> Option<&mut Element> {
        self.items.get_mut(index.0)
    }

    /// First element registered under `id`.
    pub fn find(&self, id: &str) -> Option<ElementIndex> {
        self.items.iter().position(|e| e.id == id).map(ElementIndex)
    }

    /// First element whose `obj` or outer widget is `widget`.
    pub fn find_widget(&self, widget: WidgetId) -> Option<ElementIndex> {
        self.items
            .iter()
            .position(|e| e.obj == widget || e.parent_obj == Some(widget))
            .map(ElementIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.items.iter_mut()
    }

    /// Ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|e| e.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every element, and with them every canvas buffer.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeKind;
    use crate::dom::HeadlessBackend;

    #[test]
    fn test_from_tag() {
        assert_eq!(WidgetKind::from_tag("label"), Some(WidgetKind::Label));
        assert_eq!(WidgetKind::from_tag("textarea"), Some(WidgetKind::Input));
        assert_eq!(WidgetKind::from_tag("page"), None);
        assert_eq!(WidgetKind::from_tag("div"), None);
        assert_eq!(WidgetKind::Input.tag(), "input");
        assert_eq!(WidgetKind::Canvas.id_prefix(), "_canvas");
    }

    #[test]
    fn test_static_templates_are_not_stored() {
        let mut be = HeadlessBackend::new(10, 10);
        let w = be.create(NativeKind::Label, None);
        let el = Element::new("a", WidgetKind::Label, w)
            .with_template("plain")
            .with_class_template("{cls}");
        assert!(el.template.is_none());
        assert_eq!(el.class_template.as_deref(), Some("{cls}"));
    }

    #[test]
    fn test_bind_names_are_extracted() {
        let mut be = HeadlessBackend::new(10, 10);
        let w = be.create(NativeKind::Label, None);
        let el = Element::new("a", WidgetKind::Label, w)
            .with_visible_bind("{show}")
            .with_bgcolor_bind("bg")
            .with_color_bind("");
        assert_eq!(el.visible_bind.as_deref(), Some("show"));
        assert_eq!(el.bgcolor_bind.as_deref(), Some("bg"));
        assert!(el.color_bind.is_none());
    }

    #[test]
    fn test_target_prefers_parent() {
        let mut be = HeadlessBackend::new(10, 10);
        let btn = be.create(NativeKind::Button, None);
        let lbl = be.create(NativeKind::Label, Some(btn));
        let el = Element::new("b", WidgetKind::Button, lbl).with_parent_obj(btn);
        assert_eq!(el.target(), btn);
    }

    #[test]
    fn test_registry_lookup() {
        let mut be = HeadlessBackend::new(10, 10);
        let a = be.create(NativeKind::Label, None);
        let btn = be.create(NativeKind::Button, None);
        let lbl = be.create(NativeKind::Label, Some(btn));
        let mut els = Elements::new();
        let ia = els.push(Element::new("a", WidgetKind::Label, a));
        let ib = els.push(Element::new("b", WidgetKind::Button, lbl).with_parent_obj(btn));
        assert_eq!(els.find("b"), Some(ib));
        assert_eq!(els.find_widget(a), Some(ia));
        assert_eq!(els.find_widget(btn), Some(ib));
        assert_eq!(els.ids().collect::<Vec<_>>(), vec!["a", "b"]);
        els.clear();
        assert!(els.is_empty());
    }
}
