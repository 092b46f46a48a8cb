//! Pushing variable changes into widgets.
//!
//! A change to variable `name` visits every registered element and updates
//! whatever depends on it: rendered text, the class list (which re-runs the
//! cascade), the mirrored value of a switch/slider/input, and the
//! single-property visibility and color bindings.
//!
//! While the update runs, `Engine::updating` is set so that value-changed
//! events the toolkit raises in response are ignored instead of being fed
//! back into the store.

use tracing::trace;

use crate::app::Engine;
use crate::backend::Backend;
use crate::css::color::{parse_attr_color, parse_css_color};
use crate::css::properties::OPA_COVER;
use crate::css::StyleProp;
use crate::geometry::leading_int;
use crate::reactive::{parse_bool, render_template, template_has_var};
use crate::widget::WidgetKind;

impl<B: Backend> Engine<B> {
    /// Write `value` to variable `name` (silently) and refresh every widget
    /// that depends on it.
    pub fn update_bindings(&mut self, name: &str, value: &str) {
        self.store.set_from_string(name, value, false);
        self.refresh_bindings(name, value);
    }

    /// Set a variable from the host, notifying the change callback, and
    /// refresh dependent widgets when the value actually changed.
    pub fn set_state(&mut self, name: &str, value: &str) {
        if self.store.set_from_string(name, value, true) {
            let canonical = self.store.get_as_string(name);
            self.refresh_bindings(name, &canonical);
        }
    }

    /// Set a variable without notifying and without touching widgets.
    pub fn set_state_silent(&mut self, name: &str, value: &str) {
        self.store.set_from_string(name, value, false);
    }

    /// Push every bound variable into its switch, slider or input.
    pub fn sync_widget_values(&mut self) {
        self.updating = true;
        let Self {
            elements,
            backend,
            store,
            ..
        } = self;
        for e in elements.iter() {
            let Some(bind) = e.bind.as_deref() else {
                continue;
            };
            match e.kind {
                WidgetKind::Switch => backend.set_checked(e.obj, store.get_bool(bind)),
                WidgetKind::Slider => backend.set_value(e.obj, store.get_int(bind)),
                WidgetKind::Input => backend.set_text(e.obj, &store.get_as_string(bind)),
                _ => {}
            }
        }
        self.updating = false;
    }

    /// Update every widget that depends on `name`, whose new value is `value`.
    pub(crate) fn refresh_bindings(&mut self, name: &str, value: &str) {
        self.updating = true;
        let screen = self.config.screen;
        let Self {
            elements,
            backend,
            store,
            stylesheet,
            ..
        } = self;

        for e in elements.iter() {
            if let Some(template) = e.template.as_deref().filter(|t| template_has_var(t, name)) {
                let text = render_template(template, store);
                match &e.renderer {
                    Some(renderer) => renderer.render(backend, e.obj, &text),
                    None => {
                        let target = match backend.child_count(e.obj) {
                            0 => e.obj,
                            _ => backend.child(e.obj, 0).unwrap_or(e.obj),
                        };
                        if backend.text(target) != text {
                            backend.set_text(target, &text);
                        }
                    }
                }
                trace!(id = %e.id, var = name, "text refreshed");
            }

            if let Some(class_tpl) = e
                .class_template
                .as_deref()
                .filter(|t| template_has_var(t, name))
            {
                let classes = render_template(class_tpl, store);
                let target = e.target();
                let rect = backend.rect(target);
                backend.remove_all_styles(target);
                stylesheet.apply_matching(backend, target, e.kind.tag(), &e.id, &classes, screen);
                backend.set_pos(target, rect.x, rect.y);
                backend.set_size(target, rect.width, rect.height);
                if e.parent_obj.is_some() {
                    if let Some(color) = stylesheet.resolve(e.kind.tag(), &e.id, &classes, "color") {
                        backend.set_style(e.obj, StyleProp::TextColor(parse_css_color(color)));
                    }
                }
                trace!(id = %e.id, classes = %classes, "classes refreshed");
            }

            if e.bind.as_deref() == Some(name) {
                match e.kind {
                    WidgetKind::Switch => {
                        let checked = parse_bool(value);
                        if backend.is_checked(e.obj) != checked {
                            backend.set_checked(e.obj, checked);
                        }
                    }
                    WidgetKind::Slider => {
                        let v = leading_int(value);
                        if backend.value(e.obj) != v {
                            backend.set_value(e.obj, v);
                        }
                    }
                    WidgetKind::Input => {
                        if backend.text(e.obj) != value {
                            backend.set_text(e.obj, value);
                        }
                    }
                    _ => {}
                }
            }

            if e.visible_bind.as_deref() == Some(name) {
                backend.set_hidden(e.target(), !parse_bool(value));
            }
            if e.bgcolor_bind.as_deref() == Some(name) {
                let target = e.target();
                backend.set_style(target, StyleProp::BgColor(parse_attr_color(value)));
                backend.set_style(target, StyleProp::BgOpacity(OPA_COVER));
            }
            if e.color_bind.as_deref() == Some(name) {
                backend.set_style(e.obj, StyleProp::TextColor(parse_attr_color(value)));
            }
        }

        self.updating = false;
    }
}

#[cfg(test)]
mod tests {
    use crate::app::Engine;
    use crate::backend::{Backend, NativeKind};
    use crate::dom::HeadlessBackend;
    use crate::reactive::VarType;
    use crate::widget::{Element, WidgetKind};

    fn engine() -> Engine<HeadlessBackend> {
        Engine::new_headless(480, 320)
    }

    #[test]
    fn template_text_follows_store() {
        let mut e = engine();
        let w = e.backend.create(NativeKind::Label, None);
        e.elements
            .push(Element::new("l", WidgetKind::Label, w).with_template("n={n}"));
        e.update_bindings("n", "5");
        assert_eq!(e.backend.text(w), "n=5");
        assert_eq!(e.get_state_string("n"), "5");
        assert!(!e.updating);
    }

    #[test]
    fn button_template_targets_label_child() {
        let mut e = engine();
        let btn = e.backend.create(NativeKind::Button, None);
        let lbl = e.backend.create(NativeKind::Label, Some(btn));
        e.elements.push(
            Element::new("b", WidgetKind::Button, btn).with_template("{t}"),
        );
        e.update_bindings("t", "go");
        assert_eq!(e.backend.text(lbl), "go");
        assert_eq!(e.backend.text(btn), "");
    }

    #[test]
    fn bound_widgets_mirror_value() {
        let mut e = engine();
        let sw = e.backend.create(NativeKind::Switch, None);
        let sl = e.backend.create(NativeKind::Slider, None);
        let ta = e.backend.create(NativeKind::TextArea, None);
        e.elements.push(Element::new("s", WidgetKind::Switch, sw).with_bind("on"));
        e.elements.push(Element::new("v", WidgetKind::Slider, sl).with_bind("level"));
        e.elements.push(Element::new("i", WidgetKind::Input, ta).with_bind("name"));
        e.update_bindings("on", "1");
        e.update_bindings("level", "42");
        e.update_bindings("name", "Ada");
        assert!(e.backend.is_checked(sw));
        assert_eq!(e.backend.value(sl), 42);
        assert_eq!(e.backend.text(ta), "Ada");
    }

    #[test]
    fn single_property_binds() {
        let mut e = engine();
        let w = e.backend.create(NativeKind::Label, None);
        e.elements.push(
            Element::new("l", WidgetKind::Label, w)
                .with_visible_bind("{show}")
                .with_bgcolor_bind("{bg}")
                .with_color_bind("{fg}"),
        );
        e.update_bindings("show", "false");
        e.update_bindings("bg", "#ff0000");
        e.update_bindings("fg", "#0000ff");
        assert!(e.backend.is_hidden(w));
        let style = e.backend.style(w);
        assert_eq!(style.bg_color, Some(0xFF0000));
        assert_eq!(style.bg_opacity, Some(255));
        assert_eq!(style.text_color, Some(0x0000FF));
    }

    #[test]
    fn class_template_recascades_and_keeps_geometry() {
        let mut e = engine();
        e.stylesheet.parse(".on { color: #00ff00; } .off { color: #ff0000; }");
        let w = e.backend.create(NativeKind::Label, None);
        e.backend.set_pos(w, 10, 20);
        e.backend.set_size(w, 30, 40);
        e.elements.push(
            Element::new("l", WidgetKind::Label, w).with_class_template("{mode}"),
        );
        e.update_bindings("mode", "on");
        assert_eq!(e.backend.style(w).text_color, Some(0x00FF00));
        e.update_bindings("mode", "off");
        assert_eq!(e.backend.style(w).text_color, Some(0xFF0000));
        let r = e.backend.rect(w);
        assert_eq!((r.x, r.y, r.width, r.height), (10, 20, 30, 40));
    }

    #[test]
    fn set_state_refreshes_with_canonical_value() {
        let mut e = engine();
        e.store.define_str("ratio", VarType::Float, "0");
        let w = e.backend.create(NativeKind::Label, None);
        e.elements
            .push(Element::new("l", WidgetKind::Label, w).with_template("{ratio}"));
        e.set_state("ratio", "0.5");
        assert_eq!(e.backend.text(w), "0.50");
    }

    #[test]
    fn set_state_silent_leaves_widgets() {
        let mut e = engine();
        let w = e.backend.create(NativeKind::Label, None);
        e.backend.set_text(w, "old");
        e.elements
            .push(Element::new("l", WidgetKind::Label, w).with_template("{x}"));
        e.set_state_silent("x", "new");
        assert_eq!(e.backend.text(w), "old");
        assert_eq!(e.get_state_string("x"), "new");
    }

    #[test]
    fn sync_pushes_store_into_widgets() {
        let mut e = engine();
        e.store.define_str("level", VarType::Int, "7");
        let sl = e.backend.create(NativeKind::Slider, None);
        e.elements.push(Element::new("v", WidgetKind::Slider, sl).with_bind("level"));
        e.sync_widget_values();
        assert_eq!(e.backend.value(sl), 7);
    }
}
