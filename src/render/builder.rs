//! Widget builders: one per [`WidgetKind`].
//!
//! Every builder follows the same order: read attributes, create the native
//! widget with its static visuals, run the CSS cascade with the rendered
//! class list, then `apply_inline_overrides` so inline attributes
//! beat every cascade level. Registration and listeners come last.

use tracing::{debug, warn};

use crate::app::Engine;
use crate::backend::{Backend, NativeKind, Setting, WidgetId};
use crate::css::color::parse_attr_color;
use crate::css::properties::{apply_text_valign, OPA_COVER};
use crate::css::{Font, LongMode, Side, StyleProp, TextAlign};
use crate::event::{EventKind, Listener};
use crate::geometry::{leading_int, parse_coord, split_align_pair, Align, Offset};
use crate::markup::{decode_entities, ParsedElement};
use crate::reactive::{extract_bind_var, is_dynamic, parse_bool, render_template};
use crate::widget::{
    flatten_button, Actions, CanvasBuffer, Element, ElementIndex, MarkdownRenderer, MarkdownTheme,
    TextRenderer, WidgetKind, DEFAULT_CANVAS_SIZE,
};

const SLIDER_WIDTH: i32 = 150;
const SLIDER_MIN: i32 = 0;
const SLIDER_MAX: i32 = 100;
const INPUT_WIDTH: i32 = 150;
const INPUT_HEIGHT: i32 = 40;
const ICON_SIZE: i32 = 24;
const TAB_BAR_HEIGHT: i32 = 32;

// ---------------------------------------------------------------------------
// CommonAttrs
// ---------------------------------------------------------------------------

/// Attributes every widget understands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommonAttrs {
    pub id: String,
    pub class: String,
    pub visible: String,
    pub z_index: i32,
}

impl CommonAttrs {
    pub fn from_element(el: &ParsedElement) -> Self {
        Self {
            id: el.attr("id").to_string(),
            class: el.attr("class").to_string(),
            visible: el.attr("visible").to_string(),
            z_index: el.attr_int("z-index", 0),
        }
    }

    pub fn dynamic_class(&self) -> bool {
        is_dynamic(&self.class)
    }

    pub fn dynamic_visible(&self) -> bool {
        is_dynamic(&self.visible)
    }

    /// Raw `visible` binding, or `""` when visibility is static.
    fn visible_bind(&self) -> &str {
        if self.dynamic_visible() {
            &self.visible
        } else {
            ""
        }
    }

    /// `visible="false"` (or anything but `true`/`1`) written without a
    /// placeholder.
    fn statically_hidden(&self) -> bool {
        !self.visible.is_empty() && !self.dynamic_visible() && !parse_bool(&self.visible)
    }
}

/// Whether an inline attribute is a `{var}` binding.
fn bound(value: &str) -> bool {
    is_dynamic(value)
}

/// Inline attributes resolved to concrete values. Applied after the cascade
/// by `apply_inline_overrides`; `None` leaves the cascade result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct InlineOverrides {
    x: Option<i32>,
    y: Option<i32>,
    w: Option<i32>,
    h: Option<i32>,
    color: Option<u32>,
    bgcolor: Option<u32>,
    font: Option<i32>,
    radius: Option<i32>,
}

impl<B: Backend> Engine<B> {
    // ── Registration ─────────────────────────────────────────────────

    /// Give the element a generated id when it has none and something
    /// (`needed`, a class binding or a visibility binding) requires one.
    pub(crate) fn ensure_id(&mut self, attrs: &mut CommonAttrs, kind: WidgetKind, needed: bool) {
        if attrs.id.is_empty() && (needed || attrs.dynamic_class() || attrs.dynamic_visible()) {
            attrs.id = format!("{}{}", kind.id_prefix(), self.auto_id);
            self.auto_id += 1;
        }
    }

    /// Record an element. Elements without an id are not recorded.
    ///
    /// A visibility binding that is currently false hides the element, and a
    /// `z-index` deferred by the cascade for its widget is claimed here.
    pub(crate) fn register(&mut self, mut element: Element) -> Option<ElementIndex> {
        if element.id.is_empty() {
            return None;
        }
        if let Some(var) = element.visible_bind.as_deref() {
            if !parse_bool(&self.store.get_as_string(var)) {
                self.backend.set_hidden(element.target(), true);
            }
        }
        let claimed = self
            .pending_z
            .remove(&element.obj)
            .or_else(|| element.parent_obj.and_then(|p| self.pending_z.remove(&p)));
        if let Some(z) = claimed {
            element.z_index = z;
        }
        debug!(id = %element.id, kind = %element.kind, "register");
        Some(self.elements.push(element))
    }

    /// Record a cascade `z-index` for `widget`: directly on its element when
    /// already registered, otherwise until registration claims it.
    pub(crate) fn defer_z_index(&mut self, widget: WidgetId, z: i32) {
        match self.elements.find_widget(widget) {
            Some(index) => {
                if let Some(e) = self.elements.get_mut(index) {
                    e.z_index = z;
                }
            }
            None => {
                self.pending_z.insert(widget, z);
            }
        }
    }

    /// Run the cascade on `widget` using the rendered class list.
    fn apply_css(&mut self, widget: WidgetId, kind: WidgetKind, attrs: &CommonAttrs) {
        let classes = if attrs.dynamic_class() {
            render_template(&attrs.class, &self.store)
        } else {
            attrs.class.clone()
        };
        let screen = self.config.screen;
        let z = self.stylesheet.apply_matching(
            &mut self.backend,
            widget,
            kind.tag(),
            &attrs.id,
            &classes,
            screen,
        );
        if let Some(z) = z {
            self.defer_z_index(widget, z);
        }
    }

    fn hide_if_static_hidden(&mut self, target: WidgetId, attrs: &CommonAttrs) {
        if attrs.statically_hidden() {
            self.backend.set_hidden(target, true);
        }
    }

    /// Re-apply inline attributes over the cascade. Colors and font go to
    /// `text`, everything else to `widget`; geometry wins per axis.
    fn apply_inline_overrides(&mut self, widget: WidgetId, text: WidgetId, inline: &InlineOverrides) {
        let be = &mut self.backend;
        if let Some(bg) = inline.bgcolor {
            be.set_style(widget, StyleProp::BgColor(bg));
            be.set_style(widget, StyleProp::BgOpacity(OPA_COVER));
        }
        if let Some(radius) = inline.radius {
            be.set_style(widget, StyleProp::Radius(radius));
        }
        if let Some(color) = inline.color {
            be.set_style(text, StyleProp::TextColor(color));
        }
        if let Some(font) = inline.font {
            be.set_style(text, StyleProp::Font(Font::nearest(font)));
        }
        if inline.x.is_some() || inline.y.is_some() {
            let r = be.rect(widget);
            be.set_pos(widget, inline.x.unwrap_or(r.x), inline.y.unwrap_or(r.y));
        }
        if inline.w.is_some() || inline.h.is_some() {
            let r = be.rect(widget);
            be.set_size(widget, inline.w.unwrap_or(r.width), inline.h.unwrap_or(r.height));
        }
    }

    // ── Attribute helpers ────────────────────────────────────────────

    fn coord_x(&self, el: &ParsedElement, name: &str, default: i32) -> i32 {
        match el.has_attr(name) {
            true => parse_coord(el.attr(name), self.config.screen.width),
            false => default,
        }
    }

    fn coord_y(&self, el: &ParsedElement, name: &str, default: i32) -> i32 {
        match el.has_attr(name) {
            true => parse_coord(el.attr(name), self.config.screen.height),
            false => default,
        }
    }

    /// Inline `x`, `y`, `w` and `h`, each present only when written.
    fn inline_geometry(&self, el: &ParsedElement) -> InlineOverrides {
        InlineOverrides {
            x: el.has_attr("x").then(|| self.coord_x(el, "x", 0)),
            y: el.has_attr("y").then(|| self.coord_y(el, "y", 0)),
            w: el.has_attr("w").then(|| self.coord_x(el, "w", 0)),
            h: el.has_attr("h").then(|| self.coord_y(el, "h", 0)),
            ..InlineOverrides::default()
        }
    }

    /// Inline color, reading `{var}` bindings from the store. Empty values
    /// give `None`.
    fn inline_color(&self, value: &str) -> Option<u32> {
        let value = if bound(value) {
            self.store.get_as_string(extract_bind_var(value))
        } else {
            value.to_string()
        };
        (!value.is_empty()).then(|| parse_attr_color(&value))
    }

    /// Set the non-zero dimensions; a zero keeps the current one.
    fn set_partial_size(&mut self, widget: WidgetId, w: i32, h: i32) {
        let current = self.backend.rect(widget);
        let w = if w != 0 { w } else { current.width };
        let h = if h != 0 { h } else { current.height };
        self.backend.set_size(widget, w, h);
    }

    /// Position a label-like widget from `x`, `y`, `align` and `valign`.
    /// Explicit coordinates win per axis over the alignment grid.
    fn place(&mut self, widget: WidgetId, el: &ParsedElement) {
        let align = el.attr("align");
        let valign = el.attr("valign");
        let (has_x, has_y) = (el.has_attr("x"), el.has_attr("y"));
        let x = self.coord_x(el, "x", 0);
        let y = self.coord_y(el, "y", 0);
        let use_align = !align.is_empty() || !valign.is_empty();
        let (h, mut v) = split_align_pair(align);
        if !valign.is_empty() {
            v = valign.to_string();
        }

        let be = &mut self.backend;
        match (use_align, has_x, has_y) {
            (true, false, false) => be.align(widget, Align::from_keywords(&h, &v), Offset::default()),
            (true, false, true) => {
                let grid = match h.as_str() {
                    "center" => Align::TopMid,
                    "right" => Align::TopRight,
                    _ => Align::TopLeft,
                };
                be.align(widget, grid, Offset::new(0, y));
            }
            (true, true, false) => match v.as_str() {
                "center" => be.align(widget, Align::LeftMid, Offset::new(x, 0)),
                "bottom" => be.align(widget, Align::BottomLeft, Offset::new(x, 0)),
                _ => be.set_pos(widget, x, 0),
            },
            _ if has_x || has_y => be.set_pos(widget, x, y),
            _ => {}
        }
    }

    /// Image and icon paths: absolute paths (`/x`, `A:x`) are kept; relative
    /// ones resolve to `<app_path>/resources/` when the app path is known.
    pub fn resolve_resource_path(&self, src: &str) -> String {
        let absolute = src.starts_with('/') || src.as_bytes().get(1) == Some(&b':');
        if src.is_empty() || absolute || self.config.app_path.is_empty() {
            return src.to_string();
        }
        format!("{}/resources/{src}", self.config.app_path)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Build every widget among the direct children of `el` inside `parent`.
    /// Nested pages and stray `<tab>` tags are skipped; unknown tags are
    /// ignored with their content.
    pub(crate) fn build_children(&mut self, el: &ParsedElement, parent: WidgetId) {
        for child in &el.children {
            if child.tag == "page" || child.tag == "tab" {
                continue;
            }
            match WidgetKind::from_tag(&child.tag) {
                Some(kind) => self.build_widget(kind, child, parent),
                None => debug!(tag = %child.tag, "unknown tag skipped"),
            }
        }
    }

    pub(crate) fn build_widget(&mut self, kind: WidgetKind, el: &ParsedElement, parent: WidgetId) {
        match kind {
            WidgetKind::Label => self.build_label(el, parent),
            WidgetKind::Button => self.build_button(el, parent),
            WidgetKind::Switch => self.build_switch(el, parent),
            WidgetKind::Slider => self.build_slider(el, parent),
            WidgetKind::Input => self.build_input(el, parent),
            WidgetKind::Canvas => self.build_canvas(el, parent),
            WidgetKind::Image => self.build_image(el, parent),
            WidgetKind::Markdown => self.build_markdown(el, parent),
            WidgetKind::Tabs => self.build_tabs(el, parent),
            WidgetKind::Page => {}
        }
    }

    // ── Label ────────────────────────────────────────────────────────

    fn build_label(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let text = el.text.as_str();
        let color = el.attr("color");
        let bgcolor = el.attr("bgcolor");
        let (dyn_color, dyn_bg) = (bound(color), bound(bgcolor));
        self.ensure_id(&mut attrs, WidgetKind::Label, is_dynamic(text) || dyn_color || dyn_bg);

        let font = el.attr_int("font", 0);
        let radius = el.attr_int("radius", 0);
        let rendered = render_template(text, &self.store);

        let lbl = self.backend.create(NativeKind::Label, Some(parent));
        self.backend.set_text(lbl, &rendered);
        self.apply_css(lbl, WidgetKind::Label, &attrs);
        let inline = InlineOverrides {
            color: self.inline_color(color),
            bgcolor: self.inline_color(bgcolor),
            font: (font > 0).then_some(font),
            radius: (radius > 0).then_some(radius),
            ..InlineOverrides::default()
        };
        self.apply_inline_overrides(lbl, lbl, &inline);

        self.place(lbl, el);
        let w = self.coord_x(el, "w", 0);
        let h = self.coord_y(el, "h", 0);
        if w != 0 || h != 0 {
            self.set_partial_size(lbl, w, h);
            if w != 0 {
                let mode = LongMode::from_overflow(el.attr("overflow"));
                self.backend.configure(lbl, Setting::LongMode(mode));
            }
        }

        let text_align = el.attr("text-align");
        let text_valign = el.attr("text-valign");
        let (h_align, mut v_align) = split_align_pair(text_align);
        if !text_valign.is_empty() {
            v_align = text_valign.to_string();
        }
        if h_align != "left" {
            self.backend
                .set_style(lbl, StyleProp::TextAlign(TextAlign::from_keyword(&h_align)));
        }
        if el.has_attr("h") && h > 0 {
            let explicit = !text_valign.is_empty() || text_align.contains(' ');
            let valign = if explicit { v_align.as_str() } else { "center" };
            apply_text_valign(&mut self.backend, lbl, valign, h);
        }

        self.hide_if_static_hidden(lbl, &attrs);
        self.register(
            Element::new(attrs.id.as_str(), WidgetKind::Label, lbl)
                .with_template(text)
                .with_class_template(&attrs.class)
                .with_visible_bind(attrs.visible_bind())
                .with_bgcolor_bind(if dyn_bg { bgcolor } else { "" })
                .with_color_bind(if dyn_color { color } else { "" })
                .with_z_index(attrs.z_index),
        );
    }

    // ── Button ───────────────────────────────────────────────────────

    fn build_button(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let actions = Actions {
            href: el.attr("href").to_string(),
            onclick: el.attr("onclick").to_string(),
            onhold: el.attr("onhold").to_string(),
            ..Actions::default()
        };
        let flat = flatten_button(el);
        let text = flat.text.as_str();
        let dyn_text = is_dynamic(text);
        let color = match el.attr("color") {
            "" => flat.color.as_str(),
            c => c,
        };
        let bgcolor = el.attr("bgcolor");
        let (dyn_color, dyn_bg) = (bound(color), bound(bgcolor));
        let needs_id = dyn_text
            || !actions.href.is_empty()
            || !actions.onclick.is_empty()
            || !actions.onhold.is_empty()
            || dyn_color
            || dyn_bg;
        self.ensure_id(&mut attrs, WidgetKind::Button, needs_id);

        let font = match el.attr_int("font", 0) {
            0 => flat.font,
            f => f,
        };
        let radius = el.attr_int("radius", 0);

        let btn = self.backend.create(NativeKind::Button, Some(parent));
        let label = (!text.is_empty() || dyn_text).then(|| {
            let lbl = self.backend.create(NativeKind::Label, Some(btn));
            let rendered = if dyn_text {
                render_template(text, &self.store)
            } else {
                decode_entities(text)
            };
            self.backend.set_text(lbl, &rendered);
            self.backend.align(lbl, Align::Center, Offset::default());
            if !flat.text_align.is_empty() {
                let (h_align, _) = split_align_pair(&flat.text_align);
                self.backend
                    .set_style(lbl, StyleProp::TextAlign(TextAlign::from_keyword(&h_align)));
            }
            lbl
        });
        let icon = match el.attr("icon") {
            "" => None,
            src => {
                let size = el.attr_int("iconsize", ICON_SIZE);
                let img = self.backend.create(NativeKind::Image, Some(btn));
                let path = self.resolve_resource_path(src);
                self.backend.configure(img, Setting::ImageSource(path));
                self.backend.set_size(img, size, size);
                let grid = if label.is_some() { Align::LeftMid } else { Align::Center };
                self.backend.align(img, grid, Offset::default());
                Some(img)
            }
        };
        self.apply_css(btn, WidgetKind::Button, &attrs);

        let centered = el.attr("align") == "center";
        let geometry = self.inline_geometry(el);
        let inline = InlineOverrides {
            color: label.and_then(|_| self.inline_color(color)),
            bgcolor: self.inline_color(bgcolor),
            font: label.and((font > 0).then_some(font)),
            radius: (radius > 0).then_some(radius),
            x: if centered { None } else { geometry.x },
            ..geometry
        };
        self.apply_inline_overrides(btn, label.unwrap_or(btn), &inline);
        if centered {
            let y = self.coord_y(el, "y", 0);
            self.backend.align(btn, Align::TopMid, Offset::new(0, y));
        }

        self.hide_if_static_hidden(btn, &attrs);
        let obj = label.or(icon).unwrap_or(btn);
        let (clickable, holdable) = (
            !actions.href.is_empty() || !actions.onclick.is_empty(),
            !actions.onhold.is_empty(),
        );
        let element = Element::new(attrs.id.as_str(), WidgetKind::Button, obj)
            .with_parent_obj(btn)
            .with_template(if label.is_some() { text } else { "" })
            .with_class_template(&attrs.class)
            .with_visible_bind(attrs.visible_bind())
            .with_bgcolor_bind(if dyn_bg { bgcolor } else { "" })
            .with_color_bind(if dyn_color { color } else { "" })
            .with_actions(actions)
            .with_z_index(attrs.z_index);
        if let Some(index) = self.register(element) {
            if clickable {
                self.router.on(btn, EventKind::Clicked, Listener::Click(index));
            }
            if holdable {
                self.router.on(btn, EventKind::LongPressed, Listener::Click(index));
            }
        }
    }

    // ── Switch ───────────────────────────────────────────────────────

    fn build_switch(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let bind = el.attr("bind");
        let onchange = el.attr("onchange");
        self.ensure_id(&mut attrs, WidgetKind::Switch, !bind.is_empty() || !onchange.is_empty());

        let checked = !bind.is_empty() && parse_bool(&self.store.get_as_string(bind));
        let sw = self.backend.create(NativeKind::Switch, Some(parent));
        self.backend.set_checked(sw, checked);
        self.apply_css(sw, WidgetKind::Switch, &attrs);
        let inline = self.inline_geometry(el);
        self.apply_inline_overrides(sw, sw, &inline);
        self.hide_if_static_hidden(sw, &attrs);

        let element = Element::new(attrs.id.as_str(), WidgetKind::Switch, sw)
            .with_bind(bind)
            .with_class_template(&attrs.class)
            .with_visible_bind(attrs.visible_bind())
            .with_actions(Actions {
                onchange: onchange.to_string(),
                ..Actions::default()
            })
            .with_z_index(attrs.z_index);
        if let Some(index) = self.register(element) {
            self.router.on(sw, EventKind::ValueChanged, Listener::Switch(index));
        }
    }

    // ── Slider ───────────────────────────────────────────────────────

    fn build_slider(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let bind = el.attr("bind");
        let onchange = el.attr("onchange");
        self.ensure_id(&mut attrs, WidgetKind::Slider, !bind.is_empty() || !onchange.is_empty());

        let min = el.attr_int("min", SLIDER_MIN);
        let max = el.attr_int("max", SLIDER_MAX);
        let initial = match bind {
            "" => 0,
            var => leading_int(&self.store.get_as_string(var)),
        };

        let slider = self.backend.create(NativeKind::Slider, Some(parent));
        self.backend.set_range(slider, min, max);
        self.backend.set_value(slider, initial);
        self.set_partial_size(slider, SLIDER_WIDTH, 0);
        self.apply_css(slider, WidgetKind::Slider, &attrs);
        let inline = self.inline_geometry(el);
        self.apply_inline_overrides(slider, slider, &inline);
        self.hide_if_static_hidden(slider, &attrs);

        let element = Element::new(attrs.id.as_str(), WidgetKind::Slider, slider)
            .with_bind(bind)
            .with_class_template(&attrs.class)
            .with_visible_bind(attrs.visible_bind())
            .with_actions(Actions {
                onchange: onchange.to_string(),
                ..Actions::default()
            })
            .with_z_index(attrs.z_index);
        if let Some(index) = self.register(element) {
            self.router.on_all(
                slider,
                &[EventKind::ValueChanged, EventKind::Released],
                Listener::Slider(index),
            );
        }
    }

    // ── Input ────────────────────────────────────────────────────────

    fn build_input(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let bind = el.attr("bind");
        let onchange = el.attr("onchange");
        self.ensure_id(&mut attrs, WidgetKind::Input, !bind.is_empty() || !onchange.is_empty());

        let initial = match bind {
            "" => String::new(),
            var => self.store.get_as_string(var),
        };

        let ta = self.backend.create(NativeKind::TextArea, Some(parent));
        self.backend
            .configure(ta, Setting::Placeholder(el.attr("placeholder").to_string()));
        self.backend.set_text(ta, &initial);
        self.backend
            .configure(ta, Setting::Password(matches!(el.attr("password"), "true" | "1")));
        let multiline = matches!(el.attr("multiline"), "true" | "1");
        self.backend.configure(ta, Setting::OneLine(!multiline));

        self.backend.set_style(ta, StyleProp::BgOpacity(0));
        self.backend.set_size(ta, INPUT_WIDTH, INPUT_HEIGHT);
        self.apply_css(ta, WidgetKind::Input, &attrs);
        let inline = InlineOverrides {
            color: self.inline_color(el.attr("color")),
            bgcolor: self.inline_color(el.attr("bgcolor")),
            ..self.inline_geometry(el)
        };
        self.apply_inline_overrides(ta, ta, &inline);
        self.hide_if_static_hidden(ta, &attrs);

        let element = Element::new(attrs.id.as_str(), WidgetKind::Input, ta)
            .with_bind(bind)
            .with_class_template(&attrs.class)
            .with_visible_bind(attrs.visible_bind())
            .with_actions(Actions {
                onchange: onchange.to_string(),
                ..Actions::default()
            })
            .with_z_index(attrs.z_index);
        if let Some(index) = self.register(element) {
            self.router.on_all(
                ta,
                &[EventKind::ValueChanged, EventKind::Focused, EventKind::Defocused],
                Listener::Input(index),
            );
        }
    }

    // ── Image ────────────────────────────────────────────────────────

    fn build_image(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let onclick = el.attr("onclick");

        let img = self.backend.create(NativeKind::Image, Some(parent));
        let path = self.resolve_resource_path(el.attr("src"));
        self.backend.configure(img, Setting::ImageSource(path));
        self.apply_css(img, WidgetKind::Image, &attrs);

        let geometry = self.inline_geometry(el);
        let sized = matches!((geometry.w, geometry.h), (Some(w), Some(h)) if w > 0 && h > 0);
        let centered = el.attr("align") == "center";
        let inline = InlineOverrides {
            x: if centered { None } else { geometry.x },
            y: if centered { None } else { geometry.y },
            w: geometry.w.filter(|_| sized),
            h: geometry.h.filter(|_| sized),
            ..InlineOverrides::default()
        };
        self.apply_inline_overrides(img, img, &inline);
        if centered {
            let y = self.coord_y(el, "y", 0);
            self.backend.align(img, Align::TopMid, Offset::new(0, y));
        }
        self.hide_if_static_hidden(img, &attrs);

        if !onclick.is_empty() {
            self.backend.configure(img, Setting::Clickable(true));
            self.ensure_id(&mut attrs, WidgetKind::Image, true);
            let element = Element::new(attrs.id.as_str(), WidgetKind::Image, img)
                .with_class_template(&attrs.class)
                .with_visible_bind(attrs.visible_bind())
                .with_actions(Actions {
                    onclick: onclick.to_string(),
                    ..Actions::default()
                })
                .with_z_index(attrs.z_index);
            if let Some(index) = self.register(element) {
                self.router.on(img, EventKind::Clicked, Listener::Click(index));
            }
        } else if !attrs.id.is_empty() || attrs.dynamic_visible() || attrs.dynamic_class() {
            self.ensure_id(&mut attrs, WidgetKind::Image, false);
            self.register(
                Element::new(attrs.id.as_str(), WidgetKind::Image, img)
                    .with_class_template(&attrs.class)
                    .with_visible_bind(attrs.visible_bind())
                    .with_z_index(attrs.z_index),
            );
        }
    }

    // ── Canvas ───────────────────────────────────────────────────────

    fn build_canvas(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let actions = Actions {
            ondraw: el.attr("ondraw").to_string(),
            ontap: el.attr("ontap").to_string(),
            onhold: el.attr("onhold").to_string(),
            ..Actions::default()
        };
        let x = self.coord_x(el, "x", 0);
        let y = self.coord_y(el, "y", 0);
        let w = self.coord_x(el, "w", DEFAULT_CANVAS_SIZE);
        let h = self.coord_y(el, "h", DEFAULT_CANVAS_SIZE);
        let background = match el.attr("bgcolor") {
            "" => 0xFFFFFF,
            bg => parse_attr_color(bg),
        };
        self.ensure_id(&mut attrs, WidgetKind::Canvas, true);

        let canvas = self.backend.create(NativeKind::Canvas, Some(parent));
        self.backend.set_pos(canvas, x, y);
        self.backend.set_size(canvas, w, h);
        let buffer = match CanvasBuffer::try_new(w, h, background, self.config.max_canvas_bytes) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!(id = %attrs.id, %err, "canvas skipped");
                self.backend.delete(canvas);
                return;
            }
        };
        self.backend.invalidate(canvas, buffer.as_bytes());
        self.hide_if_static_hidden(canvas, &attrs);

        let interactive =
            !actions.ondraw.is_empty() || !actions.ontap.is_empty() || !actions.onhold.is_empty();
        let mut element = Element::new(attrs.id.as_str(), WidgetKind::Canvas, canvas)
            .with_visible_bind(attrs.visible_bind())
            .with_actions(actions)
            .with_z_index(attrs.z_index);
        element.canvas = Some(buffer);
        if let Some(index) = self.register(element) {
            if interactive {
                self.backend.configure(canvas, Setting::Clickable(true));
                self.router.on_all(
                    canvas,
                    &[
                        EventKind::Pressed,
                        EventKind::Pressing,
                        EventKind::Clicked,
                        EventKind::LongPressed,
                    ],
                    Listener::Canvas(index),
                );
            }
        }
    }

    // ── Markdown ─────────────────────────────────────────────────────

    fn build_markdown(&mut self, el: &ParsedElement, parent: WidgetId) {
        let mut attrs = CommonAttrs::from_element(el);
        let text = el.text.as_str();
        let dyn_text = is_dynamic(text);
        self.ensure_id(&mut attrs, WidgetKind::Markdown, dyn_text);
        let rendered = if dyn_text {
            render_template(text, &self.store)
        } else {
            decode_entities(text)
        };

        let mut theme = MarkdownTheme::default();
        for (name, slot) in [
            ("color", &mut theme.color),
            ("h1color", &mut theme.h1_color),
            ("h2color", &mut theme.h2_color),
            ("accent", &mut theme.accent),
            ("codecolor", &mut theme.code),
        ] {
            let value = el.attr(name);
            if !value.is_empty() {
                *slot = parse_attr_color(value);
            }
        }

        let spans = self.backend.create(NativeKind::SpanGroup, Some(parent));
        self.apply_css(spans, WidgetKind::Markdown, &attrs);
        let geometry = self.inline_geometry(el);
        let inline = InlineOverrides {
            bgcolor: self.inline_color(el.attr("bgcolor")),
            w: geometry.w,
            h: geometry.h,
            ..InlineOverrides::default()
        };
        self.apply_inline_overrides(spans, spans, &inline);
        self.place(spans, el);

        let renderer = MarkdownRenderer::new(theme);
        renderer.render(&mut self.backend, spans, &rendered);
        self.hide_if_static_hidden(spans, &attrs);

        let mut element = Element::new(attrs.id.as_str(), WidgetKind::Markdown, spans)
            .with_class_template(&attrs.class)
            .with_visible_bind(attrs.visible_bind())
            .with_z_index(attrs.z_index);
        if dyn_text {
            element = element.with_template(text);
            element.renderer = Some(Box::new(renderer));
        }
        self.register(element);
    }

    // ── Tabs ─────────────────────────────────────────────────────────

    fn build_tabs(&mut self, el: &ParsedElement, parent: WidgetId) {
        let attrs = CommonAttrs::from_element(el);
        let x = self.coord_x(el, "x", 0);
        let y = self.coord_y(el, "y", 0);
        let w = self.coord_x(el, "w", 0);
        let h = self.coord_y(el, "h", 0);
        let bar = el.attr_int("barh", TAB_BAR_HEIGHT);

        let tv = self.backend.create(NativeKind::TabView, Some(parent));
        self.backend.configure(tv, Setting::TabBarHeight(bar));
        if x != 0 || y != 0 {
            self.backend.set_pos(tv, x, y);
        }
        if w > 0 || h > 0 {
            self.set_partial_size(tv, w.max(0), h.max(0));
        }
        let background = match el.attr("bgcolor") {
            "" => 0x000000,
            bg => parse_attr_color(bg),
        };
        self.backend.set_style(tv, StyleProp::BgColor(background));
        self.backend.set_style(tv, StyleProp::BgOpacity(OPA_COVER));
        let color = el.attr("color");
        if !color.is_empty() {
            self.backend
                .set_style(tv, StyleProp::TextColor(parse_attr_color(color)));
        }

        for tab in el.find_all("tab") {
            let title = match tab.attr("title") {
                "" => "Tab",
                t => t,
            };
            let page = self.backend.create(NativeKind::Tab, Some(tv));
            self.backend.set_text(page, title);
            self.backend.set_style(page, StyleProp::BgOpacity(0));
            self.backend.set_style(page, StyleProp::BorderWidth(0));
            for side in [Side::Top, Side::Right, Side::Bottom, Side::Left] {
                self.backend.set_style(page, StyleProp::Padding(side, 0));
            }
            self.build_children(tab, page);
            debug!(title, "tab");
        }
        self.hide_if_static_hidden(tv, &attrs);

        self.register(
            Element::new(attrs.id.as_str(), WidgetKind::Tabs, tv)
                .with_visible_bind(attrs.visible_bind())
                .with_z_index(attrs.z_index),
        );
        debug!(id = %attrs.id, bar, "tabs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HeadlessBackend;
    use crate::markup::parse;
    use crate::reactive::VarType;

    fn engine() -> Engine<HeadlessBackend> {
        Engine::new_headless(480, 320)
    }

    /// Build the widgets of `markup` directly on the screen.
    fn build(e: &mut Engine<HeadlessBackend>, markup: &str) {
        let doc = parse(markup);
        let screen = e.backend.screen();
        e.build_children(&doc, screen);
    }

    fn widget(e: &Engine<HeadlessBackend>, id: &str) -> WidgetId {
        e.get(id).unwrap()
    }

    // ── Common attributes ────────────────────────────────────────────

    #[test]
    fn generated_ids_count_up() {
        let mut e = engine();
        build(&mut e, r#"<label>{a}</label><label class="{c}">x</label><label>plain</label>"#);
        let ids: Vec<&str> = e.elements.ids().collect();
        assert_eq!(ids, vec!["_lbl0", "_lbl1"]);
    }

    #[test]
    fn visible_binding_hides_when_false() {
        let mut e = engine();
        e.store.define_str("show", VarType::Bool, "false");
        build(&mut e, r#"<label id="l" visible="{show}">x</label><label id="m" visible="false">y</label>"#);
        assert!(e.backend.is_hidden(widget(&e, "l")));
        assert!(e.backend.is_hidden(widget(&e, "m")));
    }

    #[test]
    fn css_z_index_claimed_at_registration() {
        let mut e = engine();
        e.stylesheet.parse("#top { z-index: 5; }");
        build(&mut e, r#"<label id="top">x</label>"#);
        let idx = e.elements.find("top").unwrap();
        assert_eq!(e.elements.get(idx).unwrap().z_index, 5);
        assert!(e.pending_z.is_empty());
    }

    #[test]
    fn resource_paths() {
        let mut e = engine();
        assert_eq!(e.resolve_resource_path("a.png"), "a.png");
        e.set_app_path("/apps/demo");
        assert_eq!(e.resolve_resource_path("a.png"), "/apps/demo/resources/a.png");
        assert_eq!(e.resolve_resource_path("/abs.png"), "/abs.png");
        assert_eq!(e.resolve_resource_path("A:x.png"), "A:x.png");
        assert_eq!(e.resolve_resource_path(""), "");
    }

    // ── Label ────────────────────────────────────────────────────────

    #[test]
    fn label_renders_template_and_position() {
        let mut e = engine();
        e.store.define_str("n", VarType::Int, "3");
        build(&mut e, r#"<label id="l" x="10%" y="20">n={n} &amp;</label>"#);
        let l = widget(&e, "l");
        assert_eq!(e.backend.text(l), "n=3 &");
        let r = e.backend.rect(l);
        assert_eq!((r.x, r.y), (48, 20));
    }

    #[test]
    fn label_align_grid_and_partial_axis() {
        let mut e = engine();
        build(
            &mut e,
            r#"<label id="a" align="center" valign="bottom" w="100" h="20">a</label>
               <label id="b" align="right" y="30" w="50" h="10">b</label>"#,
        );
        let a = e.backend.rect(widget(&e, "a"));
        assert_eq!((a.x, a.y), (190, 300));
        let b = e.backend.rect(widget(&e, "b"));
        assert_eq!((b.x, b.y), (430, 30));
    }

    #[test]
    fn label_inline_color_beats_css() {
        let mut e = engine();
        e.stylesheet.parse("#l { color: red; font-size: 48; }");
        build(&mut e, r##"<label id="l" color="#00ff00">x</label>"##);
        let style = e.backend.style(widget(&e, "l"));
        assert_eq!(style.text_color, Some(0x00FF00));
        assert_eq!(style.font, Some(Font::Large));
    }

    #[test]
    fn label_height_centers_text_vertically() {
        let mut e = engine();
        build(&mut e, r#"<label id="l" h="58">x</label>"#);
        let style = e.backend.style(widget(&e, "l"));
        // (58 - 18) / 2
        assert_eq!(style.pad_top, Some(20));
    }

    // ── Button ───────────────────────────────────────────────────────

    #[test]
    fn button_gets_label_child_and_listeners() {
        let mut e = engine();
        build(&mut e, r#"<button onclick="go" onhold="hold">OK</button>"#);
        let idx = e.elements.find("_btn0").unwrap();
        let el = e.elements.get(idx).unwrap();
        let btn = el.parent_obj.unwrap();
        assert_eq!(e.backend.kind(el.obj), Some(NativeKind::Label));
        assert_eq!(e.backend.text(el.obj), "OK");
        assert!(e.router.has_listener(btn, EventKind::Clicked));
        assert!(e.router.has_listener(btn, EventKind::LongPressed));
    }

    #[test]
    fn button_lifts_nested_label() {
        let mut e = engine();
        build(&mut e, r##"<button id="b"><label font="40" color="#ff0000">7</label></button>"##);
        let lbl = widget(&e, "b");
        let style = e.backend.style(lbl);
        assert_eq!(e.backend.text(lbl), "7");
        assert_eq!(style.font, Some(Font::Large));
        assert_eq!(style.text_color, Some(0xFF0000));
    }

    #[test]
    fn button_inline_geometry_beats_css_per_axis() {
        let mut e = engine();
        e.stylesheet.parse(".p { left: 100; top: 50; width: 200; height: 60; }");
        build(&mut e, r#"<button id="b" class="p" x="10" w="50">Go</button>"#);
        let idx = e.elements.find("b").unwrap();
        let btn = e.elements.get(idx).unwrap().parent_obj.unwrap();
        let r = e.backend.rect(btn);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 50, 50, 60));
    }

    #[test]
    fn button_inline_colors_and_radius_beat_css() {
        let mut e = engine();
        e.stylesheet
            .parse("button { background: #0000ff; color: #0000ff; border-radius: 2; font-size: 16; }");
        build(
            &mut e,
            r##"<button id="b" bgcolor="#00ff00" color="#ff0000" radius="9" font="48">Go</button>"##,
        );
        let idx = e.elements.find("b").unwrap();
        let el = e.elements.get(idx).unwrap();
        let btn = el.parent_obj.unwrap();
        assert_eq!(e.backend.style(btn).bg_color, Some(0x00FF00));
        assert_eq!(e.backend.style(btn).radius, Some(9));
        assert_eq!(e.backend.style(el.obj).text_color, Some(0xFF0000));
        assert_eq!(e.backend.style(el.obj).font, Some(Font::Large));
    }

    #[test]
    fn button_icon_resolves_path() {
        let mut e = engine();
        e.set_app_path("/apps/x");
        build(&mut e, r#"<button id="b" icon="i.png"></button>"#);
        let img = widget(&e, "b");
        let node = e.backend.get(img).unwrap();
        assert_eq!(node.kind, NativeKind::Image);
        assert_eq!(node.image_source, "/apps/x/resources/i.png");
        assert_eq!(node.rect.size(), crate::geometry::Size::new(24, 24));
    }

    // ── Value widgets ────────────────────────────────────────────────

    #[test]
    fn switch_and_slider_take_initial_values() {
        let mut e = engine();
        e.store.define_str("on", VarType::Bool, "true");
        e.store.define_str("level", VarType::Int, "40");
        build(&mut e, r#"<switch bind="on"/><slider bind="level" max="50"/>"#);
        let sw = widget(&e, "_sw0");
        let sl = widget(&e, "_sl1");
        assert!(e.backend.is_checked(sw));
        assert_eq!(e.backend.value(sl), 40);
        assert_eq!(e.backend.rect(sl).width, 150);
        assert!(e.router.has_listener(sl, EventKind::Released));
    }

    #[test]
    fn value_widgets_take_inline_position_over_css() {
        let mut e = engine();
        e.stylesheet
            .parse("switch { left: 300; top: 30; } slider { left: 300; width: 80; }");
        build(&mut e, r#"<switch id="s" x="5"/><slider id="v" y="7"/>"#);
        let s = e.backend.rect(widget(&e, "s"));
        assert_eq!((s.x, s.y), (5, 30));
        let v = e.backend.rect(widget(&e, "v"));
        assert_eq!((v.x, v.y, v.width), (300, 7, 80));
    }

    #[test]
    fn input_inline_attributes_beat_css() {
        let mut e = engine();
        e.stylesheet
            .parse("input { color: #ff0000; background: #0000ff; width: 300; left: 40; }");
        build(
            &mut e,
            r##"<input id="i" color="#00ff00" bgcolor="#00ffff" w="90"/><input id="j"/>"##,
        );
        let i = e.backend.get(widget(&e, "i")).unwrap();
        assert_eq!(i.style.text_color, Some(0x00FF00));
        assert_eq!(i.style.bg_color, Some(0x00FFFF));
        assert_eq!((i.rect.x, i.rect.width, i.rect.height), (40, 90, 40));

        // Without inline attributes the cascade beats the static defaults.
        let j = e.backend.get(widget(&e, "j")).unwrap();
        assert_eq!(j.style.text_color, Some(0xFF0000));
        assert_eq!(j.style.bg_opacity, Some(OPA_COVER));
        assert_eq!(j.rect.width, 300);
    }

    #[test]
    fn input_configuration() {
        let mut e = engine();
        e.store.define_str("name", VarType::String, "Ada");
        build(&mut e, r#"<input bind="name" placeholder="Name" password="true"/>"#);
        let ta = widget(&e, "_inp0");
        let node = e.backend.get(ta).unwrap();
        assert_eq!(node.text, "Ada");
        assert_eq!(node.placeholder, "Name");
        assert!(node.password);
        assert!(node.one_line);
        assert_eq!(node.style.bg_opacity, Some(0));
        assert_eq!((node.rect.width, node.rect.height), (150, 40));
    }

    // ── Canvas ───────────────────────────────────────────────────────

    #[test]
    fn canvas_allocates_buffer() {
        let mut e = engine();
        build(&mut e, r#"<canvas id="c" w="10" h="5" ondraw="draw"/>"#);
        let buf = e.canvas("c").unwrap();
        assert_eq!((buf.width(), buf.height()), (10, 5));
        assert_eq!(buf.pixel_at(0, 0), Some(0xFFFF_FFFF));
        assert!(e.router.has_listener(widget(&e, "c"), EventKind::Pressing));
    }

    #[test]
    fn oversized_canvas_is_skipped() {
        let mut e = Engine::new(
            HeadlessBackend::new(480, 320),
            crate::app::EngineConfig::default().with_max_canvas_bytes(64),
        );
        build(&mut e, r#"<canvas id="c" w="100" h="100"/><label id="after">x</label>"#);
        assert!(e.get("c").is_none());
        assert!(e.backend.find_kind(NativeKind::Canvas).is_none());
        assert!(e.get("after").is_some());
    }

    // ── Markdown and tabs ────────────────────────────────────────────

    #[test]
    fn markdown_renders_spans_and_rerenders() {
        let mut e = engine();
        e.store.define_str("title", VarType::String, "One");
        build(&mut e, "<markdown># {title}</markdown>");
        let md = widget(&e, "_md0");
        assert_eq!(e.backend.text(md), "One");
        e.update_bindings("title", "Two");
        assert_eq!(e.backend.text(md), "Two");
        assert_eq!(e.backend.get(md).unwrap().spans[0].font, Font::Large);
    }

    #[test]
    fn tabs_build_children_per_tab() {
        let mut e = engine();
        build(
            &mut e,
            r#"<tabs id="t" barh="40"><tab title="A"><label id="in_a">a</label></tab><tab><label>b</label></tab></tabs>"#,
        );
        let tv = widget(&e, "t");
        let tabs = e.backend.children(tv).to_vec();
        assert_eq!(tabs.len(), 2);
        assert_eq!(e.backend.text(tabs[0]), "A");
        assert_eq!(e.backend.text(tabs[1]), "Tab");
        assert_eq!(e.backend.parent(widget(&e, "in_a")), Some(tabs[0]));
        assert_eq!(e.backend.get(tv).unwrap().tab_bar_height, 40);
    }
}
