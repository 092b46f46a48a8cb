//! Engine struct: configuration, owned render state, public API.
//!
//! [`Engine`] owns the backend, the variable store, the stylesheet, the
//! element registry, navigation and event routing. Rendering, binding
//! updates and navigation live in their own modules as further `impl` blocks;
//! this file holds construction, element access and event dispatch.
//! The `new_headless` constructor allows testing without a real toolkit.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::backend::{Backend, NativeKind, WidgetId};
use crate::css::color::parse_attr_color;
use crate::css::properties::OPA_COVER;
use crate::css::{Stylesheet, StyleProp};
use crate::dom::HeadlessBackend;
use crate::error::UiError;
use crate::event::{Envelope, EventKind, EventRouter, Host, Listener, NullHost};
use crate::geometry::{leading_int, parse_coord, Size};
use crate::navigation::Navigator;
use crate::reactive::{parse_bool, Store, VarType};
use crate::render::head::{AppMeta, ConfigHints, HeadData, Timer};
use crate::widget::{ElementIndex, Elements};

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Configuration for the engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Screen size in pixels; percentages resolve against it.
    pub screen: Size,
    /// Directory of the running app; relative image paths resolve to
    /// `<app_path>/resources/`.
    pub app_path: String,
    /// Minimum interval between slider updates while dragging.
    pub slider_throttle_ms: u64,
    /// Standalone pages beyond this count are skipped.
    pub max_pages: usize,
    /// Pages per group beyond this count are skipped.
    pub max_pages_per_group: usize,
    /// Upper bound for one canvas pixel buffer.
    pub max_canvas_bytes: usize,
    /// Where `icon="system:name"` points.
    pub system_icon_dir: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            screen: Size::new(480, 320),
            app_path: String::new(),
            slider_throttle_ms: 100,
            max_pages: 16,
            max_pages_per_group: 4,
            max_canvas_bytes: 4 * 1024 * 1024,
            system_icon_dir: "/system/resources/icons".into(),
        }
    }
}

impl EngineConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the screen size (builder).
    pub fn with_screen(mut self, width: i32, height: i32) -> Self {
        self.screen = Size::new(width, height);
        self
    }

    /// Set the app directory (builder).
    pub fn with_app_path(mut self, path: impl Into<String>) -> Self {
        self.app_path = path.into();
        self
    }

    /// Set the slider throttle interval (builder).
    pub fn with_slider_throttle_ms(mut self, ms: u64) -> Self {
        self.slider_throttle_ms = ms;
        self
    }

    /// Set the standalone page limit (builder).
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    /// Set the per-group page limit (builder).
    pub fn with_max_pages_per_group(mut self, max: usize) -> Self {
        self.max_pages_per_group = max;
        self
    }

    /// Set the canvas buffer limit (builder).
    pub fn with_max_canvas_bytes(mut self, bytes: usize) -> Self {
        self.max_canvas_bytes = bytes;
        self
    }

    /// Set the system icon directory (builder).
    pub fn with_system_icon_dir(mut self, dir: impl Into<String>) -> Self {
        self.system_icon_dir = dir.into();
        self
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The markup engine.
///
/// All render state is owned here; nothing is global. The engine is
/// single-threaded: the toolkit reports events by calling
/// [`dispatch`](Engine::dispatch) (or [`post`](Engine::post) followed by
/// [`process_events`](Engine::process_events)) from the UI thread.
pub struct Engine<B: Backend> {
    pub(crate) backend: B,
    pub(crate) config: EngineConfig,
    pub(crate) host: Box<dyn Host>,
    pub(crate) store: Store,
    pub(crate) stylesheet: Stylesheet,
    pub(crate) elements: Elements,
    pub(crate) router: EventRouter,
    pub(crate) navigator: Navigator,
    pub(crate) head: HeadData,
    /// CSS `z-index` values for widgets not registered yet.
    pub(crate) pending_z: HashMap<WidgetId, i32>,
    /// Counter behind generated element ids.
    pub(crate) auto_id: usize,
    /// Set while bindings are pushed into widgets.
    pub(crate) updating: bool,
    pub(crate) focused_input: Option<WidgetId>,
}

impl<B: Backend> std::fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("elements", &self.elements.len())
            .field("store", &self.store)
            .field("navigator", &self.navigator)
            .finish_non_exhaustive()
    }
}

impl Engine<HeadlessBackend> {
    /// Create an engine over an in-memory toolkit of the given size.
    pub fn new_headless(width: i32, height: i32) -> Self {
        Self::new(
            HeadlessBackend::new(width, height),
            EngineConfig::default().with_screen(width, height),
        )
    }
}

impl<B: Backend> Engine<B> {
    /// Create an engine that drives `backend`.
    pub fn new(backend: B, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            host: Box::new(NullHost),
            store: Store::new(),
            stylesheet: Stylesheet::new(),
            elements: Elements::new(),
            router: EventRouter::new(),
            navigator: Navigator::new(),
            head: HeadData::default(),
            pending_z: HashMap::new(),
            auto_id: 0,
            updating: false,
            focused_input: None,
        }
    }

    /// Set the scripting host (builder).
    pub fn with_host(mut self, host: impl Host + 'static) -> Self {
        self.host = Box::new(host);
        self
    }

    /// Replace the scripting host.
    pub fn set_host(&mut self, host: impl Host + 'static) {
        self.host = Box::new(host);
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Direct store access. Writes made here do not reach widgets; use
    /// [`set_state`](Engine::set_state) for that.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    pub fn stylesheet(&self) -> &Stylesheet {
        &self.stylesheet
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// Set the app directory used for relative resources.
    pub fn set_app_path(&mut self, path: impl Into<String>) {
        self.config.app_path = path.into();
        info!(path = %self.config.app_path, "app path set");
    }

    pub fn app_path(&self) -> &str {
        &self.config.app_path
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Remove every widget and forget everything built by the last render.
    ///
    /// Elements, deferred z-indices, pages, groups, keyboards, listeners and
    /// the default page are dropped, and generated ids start from zero
    /// again. Variables, timers, script and app metadata survive.
    pub fn clear(&mut self) {
        let screen = self.backend.screen();
        debug!(children = self.backend.child_count(screen), "clear");
        self.backend.clean(screen);
        self.elements.clear();
        self.pending_z.clear();
        self.navigator.clear();
        self.router.clear();
        self.head.default_page.clear();
        self.auto_id = 0;
        self.updating = false;
        self.focused_input = None;
    }

    /// Reset the engine for a new app: [`clear`](Engine::clear) plus
    /// timers, script, app metadata, styles and every variable.
    pub fn init(&mut self) {
        self.clear();
        self.head = HeadData::default();
        self.stylesheet.clear();
        self.store.clear();
        info!("engine initialised");
    }

    // ── Head data ────────────────────────────────────────────────────

    pub fn app_meta(&self) -> &AppMeta {
        &self.head.meta
    }

    pub fn app_version(&self) -> &str {
        &self.head.meta.version
    }

    pub fn app_os_requirement(&self) -> &str {
        &self.head.meta.os
    }

    pub fn app_icon(&self) -> &str {
        &self.head.meta.icon
    }

    pub fn app_readonly(&self) -> bool {
        self.head.meta.readonly
    }

    pub fn config_hints(&self) -> &ConfigHints {
        &self.head.config
    }

    pub fn script_code(&self) -> &str {
        &self.head.script.code
    }

    pub fn script_language(&self) -> &str {
        &self.head.script.language
    }

    pub fn default_page(&self) -> &str {
        &self.head.default_page
    }

    pub fn timer_count(&self) -> usize {
        self.head.timers.len()
    }

    pub fn timer_at(&self, index: usize) -> Option<&Timer> {
        self.head.timers.get(index)
    }

    // ── State ────────────────────────────────────────────────────────

    pub fn state_count(&self) -> usize {
        self.store.count()
    }

    pub fn state_name_at(&self, index: usize) -> &str {
        self.store.name_at(index)
    }

    pub fn state_type_at(&self, index: usize) -> VarType {
        self.store.type_at(index)
    }

    pub fn state_default_at(&self, index: usize) -> String {
        self.store.default_at(index)
    }

    pub fn get_state_string(&self, name: &str) -> String {
        self.store.get_as_string(name)
    }

    pub fn get_state_int(&self, name: &str) -> i32 {
        self.store.get_int(name)
    }

    pub fn get_state_bool(&self, name: &str) -> bool {
        self.store.get_bool(name)
    }

    pub fn get_state_float(&self, name: &str) -> f32 {
        self.store.get_float(name)
    }

    // ── Element access ───────────────────────────────────────────────

    /// Widget whose text or value an element controls.
    pub fn get(&self, id: &str) -> Option<WidgetId> {
        self.elements.find(id).and_then(|i| self.elements.get(i)).map(|e| e.obj)
    }

    /// Whether a page, tile (`group/page`) or group is registered under `id`.
    pub fn has_page(&self, id: &str) -> bool {
        self.elements
            .find(id)
            .and_then(|i| self.elements.get(i))
            .is_some_and(|e| e.is_page())
    }

    fn lookup(&self, id: &str) -> Result<ElementIndex, UiError> {
        self.elements.find(id).ok_or_else(|| {
            warn!(id, "widget not found");
            UiError::UnknownWidget(id.to_string())
        })
    }

    /// Set the text of a widget; widgets with children (buttons) get the
    /// text on their first child.
    pub fn set_text(&mut self, id: &str, text: &str) -> Result<(), UiError> {
        let obj = self.get(id).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        let target = match self.backend.child_count(obj) {
            0 => obj,
            _ => self.backend.child(obj, 0).unwrap_or(obj),
        };
        self.backend.set_text(target, text);
        Ok(())
    }

    pub fn set_switch(&mut self, id: &str, checked: bool) -> Result<(), UiError> {
        let obj = self.get(id).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        self.backend.set_checked(obj, checked);
        Ok(())
    }

    pub fn set_slider(&mut self, id: &str, value: i32) -> Result<(), UiError> {
        let obj = self.get(id).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        self.backend.set_value(obj, value);
        Ok(())
    }

    pub fn set_input(&mut self, id: &str, text: &str) -> Result<(), UiError> {
        let obj = self.get(id).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        self.backend.set_text(obj, text);
        Ok(())
    }

    /// Call the element's `onclick` on the host as if it had been clicked.
    /// Navigation targets are not followed.
    pub fn trigger_click(&mut self, id: &str) -> Result<(), UiError> {
        let onclick = self
            .elements
            .iter()
            .find(|e| e.id == id && !e.actions.onclick.is_empty())
            .map(|e| e.actions.onclick.clone())
            .ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        self.host.call(&onclick);
        Ok(())
    }

    /// Call a host function by name.
    pub fn call_function(&mut self, name: &str) -> Result<(), UiError> {
        if name.is_empty() {
            return Err(UiError::UnknownWidget(String::new()));
        }
        self.host.call(name);
        Ok(())
    }

    /// Focus a text area and show its page keyboard.
    pub fn focus_input(&mut self, id: &str) -> Result<(), UiError> {
        let index = self.lookup(id)?;
        let obj = self.elements.get(index).map(|e| e.obj).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        if self.backend.kind(obj) != Some(NativeKind::TextArea) {
            warn!(id, "focus_input: not an input");
            return Err(UiError::UnknownWidget(id.to_string()));
        }
        if !self.show_keyboard_for(obj) {
            warn!(id, "focus_input: no page for widget");
            return Err(UiError::UnknownPage(id.to_string()));
        }
        self.backend.set_focused(obj, true);
        Ok(())
    }

    /// Text area focused by the last [`focus_input`](Engine::focus_input)
    /// or focus event.
    pub fn focused_input(&self) -> Option<WidgetId> {
        self.focused_input
    }

    /// Set one attribute of a widget: `text color bgcolor visible x y w h
    /// z-index`. Position, size, visibility, background and z-order apply
    /// to the outer widget (the button, not its label).
    pub fn set_widget_attr(&mut self, id: &str, attr: &str, value: &str) -> Result<(), UiError> {
        let index = self.lookup(id)?;
        let Some(element) = self.elements.get(index) else {
            return Err(UiError::UnknownWidget(id.to_string()));
        };
        let (obj, target) = (element.obj, element.target());
        let screen = self.config.screen;
        let be = &mut self.backend;
        match attr {
            "bgcolor" => {
                be.set_style(target, StyleProp::BgColor(parse_attr_color(value)));
                be.set_style(target, StyleProp::BgOpacity(OPA_COVER));
            }
            "color" => be.set_style(obj, StyleProp::TextColor(parse_attr_color(value))),
            "text" => be.set_text(obj, value),
            "visible" => be.set_hidden(target, !parse_bool(value)),
            "x" => {
                let r = be.rect(target);
                be.set_pos(target, parse_coord(value, screen.width), r.y);
            }
            "y" => {
                let r = be.rect(target);
                be.set_pos(target, r.x, parse_coord(value, screen.height));
            }
            "w" => {
                let r = be.rect(target);
                be.set_size(target, parse_coord(value, screen.width), r.height);
            }
            "h" => {
                let r = be.rect(target);
                be.set_size(target, r.width, parse_coord(value, screen.height));
            }
            "z-index" => match leading_int(value) {
                z if z > 0 => be.move_foreground(target),
                z if z < 0 => be.move_to_index(target, 0),
                _ => {}
            },
            _ => {
                warn!(id, attr, "set_widget_attr: unknown attribute");
                return Err(UiError::UnknownAttribute {
                    id: id.to_string(),
                    attr: attr.to_string(),
                });
            }
        }
        debug!(id, attr, value, "set_widget_attr");
        Ok(())
    }

    /// Read one attribute of a widget: `text visible x y w h z-index`.
    /// `z-index` reports the position among siblings.
    pub fn get_widget_attr(&self, id: &str, attr: &str) -> Result<String, UiError> {
        let index = self.lookup(id)?;
        let Some(element) = self.elements.get(index) else {
            return Err(UiError::UnknownWidget(id.to_string()));
        };
        let (obj, target) = (element.obj, element.target());
        let be = &self.backend;
        let value = match attr {
            "text" => be.text(obj),
            "visible" => (!be.is_hidden(target)).to_string(),
            "x" => be.rect(target).x.to_string(),
            "y" => be.rect(target).y.to_string(),
            "w" => be.rect(target).width.to_string(),
            "h" => be.rect(target).height.to_string(),
            "z-index" => be.index(target).to_string(),
            _ => {
                warn!(id, attr, "get_widget_attr: unsupported attribute");
                return Err(UiError::UnknownAttribute {
                    id: id.to_string(),
                    attr: attr.to_string(),
                });
            }
        };
        Ok(value)
    }

    /// Center of a widget in screen coordinates.
    pub fn widget_center(&self, id: &str) -> Result<(i32, i32), UiError> {
        let obj = self.get(id).ok_or_else(|| UiError::UnknownWidget(id.to_string()))?;
        let r = self.backend.screen_rect(obj);
        Ok((r.x + r.width / 2, r.y + r.height / 2))
    }

    // ── Canvas ───────────────────────────────────────────────────────

    /// Run `draw` on the pixel buffer of canvas `id` and push the result to
    /// the toolkit.
    fn with_canvas(
        &mut self,
        id: &str,
        draw: impl FnOnce(&mut crate::widget::CanvasBuffer),
    ) -> Result<(), UiError> {
        let Self {
            elements, backend, ..
        } = self;
        let element = elements
            .iter_mut()
            .find(|e| e.id == id && e.canvas.is_some())
            .ok_or_else(|| UiError::UnknownCanvas(id.to_string()))?;
        let obj = element.obj;
        if let Some(buffer) = element.canvas.as_mut() {
            draw(buffer);
            backend.invalidate(obj, buffer.as_bytes());
        }
        Ok(())
    }

    pub fn canvas_clear(&mut self, id: &str, rgb: u32) -> Result<(), UiError> {
        self.with_canvas(id, |c| c.clear(rgb))
    }

    pub fn canvas_rect(&mut self, id: &str, x: i32, y: i32, w: i32, h: i32, rgb: u32) -> Result<(), UiError> {
        self.with_canvas(id, |c| c.fill_rect(x, y, w, h, rgb))
    }

    pub fn canvas_pixel(&mut self, id: &str, x: i32, y: i32, rgb: u32) -> Result<(), UiError> {
        self.with_canvas(id, |c| c.set_pixel(x, y, rgb))
    }

    pub fn canvas_circle(&mut self, id: &str, cx: i32, cy: i32, r: i32, rgb: u32) -> Result<(), UiError> {
        self.with_canvas(id, |c| c.fill_circle(cx, cy, r, rgb))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn canvas_line(
        &mut self,
        id: &str,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        rgb: u32,
        thickness: i32,
    ) -> Result<(), UiError> {
        self.with_canvas(id, |c| c.draw_line(x1, y1, x2, y2, rgb, thickness))
    }

    /// Push the canvas pixels again without drawing.
    pub fn canvas_refresh(&mut self, id: &str) -> Result<(), UiError> {
        self.with_canvas(id, |_| {})
    }

    /// Pixel buffer of canvas `id`.
    pub fn canvas(&self, id: &str) -> Option<&crate::widget::CanvasBuffer> {
        self.elements
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.canvas.as_ref())
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Queue an event reported by the toolkit.
    pub fn post(&mut self, widget: WidgetId, kind: EventKind) {
        self.router.push(Envelope::new(widget, kind));
    }

    /// Handle every queued event in order. Returns how many were handled.
    pub fn process_events(&mut self) -> usize {
        let envelopes = self.router.drain();
        let count = envelopes.len();
        for envelope in envelopes {
            self.dispatch(envelope.widget, envelope.kind);
        }
        count
    }

    /// Handle one event now.
    pub fn dispatch(&mut self, widget: WidgetId, kind: EventKind) {
        for listener in self.router.listeners(widget, kind) {
            self.handle(widget, kind, listener);
        }
    }

    fn handle(&mut self, widget: WidgetId, kind: EventKind, listener: Listener) {
        match listener {
            Listener::Click(index) => self.on_click(index, kind),
            Listener::Switch(index) => self.on_switch(index),
            Listener::Slider(index) => self.on_slider(index, kind),
            Listener::Input(index) => self.on_input(index, kind),
            Listener::Canvas(index) => self.on_canvas(index, kind),
            Listener::Keyboard => self.on_keyboard(widget, kind),
            Listener::TileView(group) => {
                let Self {
                    navigator, backend, ..
                } = self;
                navigator.tile_changed(backend, group);
            }
        }
    }

    fn on_click(&mut self, index: ElementIndex, kind: EventKind) {
        let Some(element) = self.elements.get(index) else {
            return;
        };
        let actions = element.actions.clone();
        debug!(id = %element.id, %kind, "click");
        match kind {
            EventKind::LongPressed => {
                if !actions.onhold.is_empty() {
                    self.host.hold(&actions.onhold);
                }
            }
            EventKind::Clicked => {
                if !actions.onclick.is_empty() {
                    self.host.call(&actions.onclick);
                }
                if !actions.href.is_empty() {
                    // Misses are already logged by navigate.
                    let _ = self.navigate(&actions.href);
                }
            }
            _ => {}
        }
    }

    fn on_switch(&mut self, index: ElementIndex) {
        if self.updating {
            return;
        }
        let Some(element) = self.elements.get(index) else {
            return;
        };
        let (obj, bind, onchange) = (element.obj, element.bind.clone(), element.actions.onchange.clone());
        let value = if self.backend.is_checked(obj) { "true" } else { "false" };
        if let Some(bind) = bind {
            self.update_bindings(&bind, value);
            self.host.state_changed(&bind, value);
        }
        if !onchange.is_empty() {
            self.host.call(&onchange);
        }
        info!(id = %self.elements.get(index).map_or("", |e| e.id.as_str()), value, "switch");
    }

    fn on_slider(&mut self, index: ElementIndex, kind: EventKind) {
        if self.updating {
            return;
        }
        let now = self.backend.tick_ms();
        let throttle = self.config.slider_throttle_ms;
        let Some(element) = self.elements.get_mut(index) else {
            return;
        };
        let value = self.backend.value(element.obj).to_string();
        let bind = element.bind.clone();
        match kind {
            EventKind::ValueChanged => {
                if element
                    .last_update_ms
                    .is_some_and(|last| now.saturating_sub(last) < throttle)
                {
                    return;
                }
                element.last_update_ms = Some(now);
                if let Some(bind) = bind {
                    self.update_bindings(&bind, &value);
                }
            }
            EventKind::Released => {
                let onchange = element.actions.onchange.clone();
                info!(id = %element.id, value = %value, "slider released");
                if let Some(bind) = bind {
                    self.update_bindings(&bind, &value);
                    self.host.state_changed(&bind, &value);
                }
                if !onchange.is_empty() {
                    self.host.call(&onchange);
                }
            }
            _ => {}
        }
    }

    fn on_input(&mut self, index: ElementIndex, kind: EventKind) {
        let Some(element) = self.elements.get(index) else {
            return;
        };
        let (obj, bind, onchange) = (element.obj, element.bind.clone(), element.actions.onchange.clone());
        match kind {
            EventKind::ValueChanged => {
                if self.updating {
                    return;
                }
                if let Some(bind) = bind {
                    let text = self.backend.text(obj);
                    self.update_bindings(&bind, &text);
                }
            }
            EventKind::Focused => {
                if !self.show_keyboard_for(obj) {
                    warn!("input focused outside any page");
                }
            }
            EventKind::Defocused => {
                self.hide_keyboard_for(obj);
                let text = self.backend.text(obj);
                if let Some(bind) = bind {
                    self.host.state_changed(&bind, &text);
                }
                if !onchange.is_empty() {
                    self.host.call(&onchange);
                }
            }
            _ => {}
        }
    }

    fn on_canvas(&mut self, index: ElementIndex, kind: EventKind) {
        if kind == EventKind::Pressed {
            self.store.set_from_string("lastX", "-1", false);
            self.store.set_from_string("lastY", "-1", false);
        }
        let Some(element) = self.elements.get(index) else {
            return;
        };
        let Some(buffer) = element.canvas.as_ref() else {
            return;
        };
        let origin = self.backend.screen_rect(element.obj);
        let pointer = self.backend.pointer();
        let (x, y) = (pointer.x - origin.x, pointer.y - origin.y);
        if !buffer.contains(x, y) {
            return;
        }
        let actions = element.actions.clone();
        match kind {
            EventKind::Clicked if !actions.ontap.is_empty() => self.host.tap(&actions.ontap, x, y),
            EventKind::LongPressed if !actions.onhold.is_empty() => {
                self.host.hold_at(&actions.onhold, x, y)
            }
            EventKind::Pressed | EventKind::Pressing if !actions.ondraw.is_empty() => {
                self.store.set_from_string("_touchX", &x.to_string(), false);
                self.store.set_from_string("_touchY", &y.to_string(), false);
                self.host.call(&actions.ondraw);
            }
            _ => {}
        }
    }

    fn on_keyboard(&mut self, keyboard: WidgetId, kind: EventKind) {
        if !matches!(kind, EventKind::Ready | EventKind::Cancel) {
            return;
        }
        self.backend.set_hidden(keyboard, true);
        if let Some(input) = self.focused_input.take() {
            self.backend.set_focused(input, false);
        }
    }

    /// Show (creating on first use) the keyboard of the page holding `input`.
    fn show_keyboard_for(&mut self, input: WidgetId) -> bool {
        let Self {
            navigator,
            backend,
            router,
            ..
        } = self;
        let Some(page) = navigator.page_containing(backend, input) else {
            return false;
        };
        let keyboard = navigator.keyboard(backend, page, |kb| {
            router.on_all(kb, &[EventKind::Ready, EventKind::Cancel], Listener::Keyboard);
        });
        backend.configure(keyboard, crate::backend::Setting::KeyboardTarget(Some(input)));
        backend.set_hidden(keyboard, false);
        self.focused_input = Some(input);
        true
    }

    fn hide_keyboard_for(&mut self, input: WidgetId) {
        if let Some(page) = self.navigator.page_containing(&self.backend, input) {
            if let Some(keyboard) = self.navigator.existing_keyboard(page) {
                self.backend.set_hidden(keyboard, true);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine<HeadlessBackend> {
        Engine::new_headless(480, 320)
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn headless_engine_is_empty() {
        let e = engine();
        assert!(e.elements().is_empty());
        assert_eq!(e.state_count(), 0);
        assert_eq!(e.config().screen, Size::new(480, 320));
        assert_eq!(e.app_version(), "0.0");
        assert_eq!(e.script_language(), "lua");
    }

    // ── EngineConfig builder ─────────────────────────────────────────

    #[test]
    fn engine_config_defaults() {
        let c = EngineConfig::default();
        assert_eq!(c.screen, Size::new(480, 320));
        assert_eq!(c.slider_throttle_ms, 100);
        assert_eq!(c.max_pages, 16);
        assert_eq!(c.max_pages_per_group, 4);
        assert!(c.app_path.is_empty());
    }

    #[test]
    fn engine_config_builder() {
        let c = EngineConfig::new()
            .with_screen(800, 480)
            .with_app_path("/apps/demo")
            .with_slider_throttle_ms(50)
            .with_max_pages(2)
            .with_max_pages_per_group(3)
            .with_max_canvas_bytes(1024)
            .with_system_icon_dir("/icons");
        assert_eq!(c.screen, Size::new(800, 480));
        assert_eq!(c.app_path, "/apps/demo");
        assert_eq!(c.slider_throttle_ms, 50);
        assert_eq!(c.max_pages, 2);
        assert_eq!(c.max_pages_per_group, 3);
        assert_eq!(c.max_canvas_bytes, 1024);
        assert_eq!(c.system_icon_dir, "/icons");
    }

    // ── Lookups ──────────────────────────────────────────────────────

    #[test]
    fn unknown_ids_are_errors() {
        let mut e = engine();
        assert_eq!(e.get("nope"), None);
        assert_eq!(
            e.set_text("nope", "x"),
            Err(UiError::UnknownWidget("nope".into()))
        );
        assert!(e.get_widget_attr("nope", "text").is_err());
        assert!(e.trigger_click("nope").is_err());
        assert_eq!(
            e.canvas_clear("nope", 0),
            Err(UiError::UnknownCanvas("nope".into()))
        );
        assert!(e.call_function("").is_err());
        assert!(e.call_function("f").is_ok());
    }

    // ── Events ───────────────────────────────────────────────────────

    #[test]
    fn post_and_process_drains_queue() {
        let mut e = engine();
        let w = e.backend_mut().create(NativeKind::Button, None);
        e.post(w, EventKind::Clicked);
        e.post(w, EventKind::Released);
        assert_eq!(e.router().pending_count(), 2);
        assert_eq!(e.process_events(), 2);
        assert!(e.router().is_empty());
    }

    #[test]
    fn init_clears_state() {
        let mut e = engine();
        e.store_mut().set("x", "1", false);
        e.init();
        assert_eq!(e.state_count(), 0);
    }
}
