//! Pilot: programmatic interaction with a headless engine.
//!
//! The `Pilot` wraps an [`Engine`] over a [`HeadlessBackend`] and simulates
//! what the toolkit would report (clicks, toggles, drags, typing, swipes),
//! while a recording host captures every call the engine makes out to user
//! code.

use std::cell::RefCell;
use std::rc::Rc;

use crate::app::{Engine, EngineConfig};
use crate::backend::{Backend, WidgetId};
use crate::dom::HeadlessBackend;
use crate::error::UiError;
use crate::event::{EventKind, Host};
use crate::widget::Element;

// ---------------------------------------------------------------------------
// RecordingHost
// ---------------------------------------------------------------------------

/// One call made by the engine to the host, or one store notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Call(String),
    Hold(String),
    Tap { function: String, x: i32, y: i32 },
    HoldAt { function: String, x: i32, y: i32 },
    StateChanged { name: String, value: String },
    /// The store's change callback fired.
    Notified { name: String, value: String },
}

/// Host that appends every call to a shared log.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the call log.
    pub fn log(&self) -> Rc<RefCell<Vec<HostCall>>> {
        Rc::clone(&self.calls)
    }

    fn push(&self, call: HostCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl Host for RecordingHost {
    fn call(&mut self, function: &str) {
        self.push(HostCall::Call(function.to_string()));
    }

    fn hold(&mut self, function: &str) {
        self.push(HostCall::Hold(function.to_string()));
    }

    fn tap(&mut self, function: &str, x: i32, y: i32) {
        self.push(HostCall::Tap {
            function: function.to_string(),
            x,
            y,
        });
    }

    fn hold_at(&mut self, function: &str, x: i32, y: i32) {
        self.push(HostCall::HoldAt {
            function: function.to_string(),
            x,
            y,
        });
    }

    fn state_changed(&mut self, name: &str, value: &str) {
        self.push(HostCall::StateChanged {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless engine driver for testing.
///
/// # Examples
///
/// ```ignore
/// use markup_ui::testing::{HostCall, Pilot};
///
/// let mut pilot = Pilot::new(480, 320);
/// pilot.render(r#"<button id="b" onclick="go">Go</button>"#);
/// pilot.click("b").unwrap();
/// assert_eq!(pilot.calls(), vec![HostCall::Call("go".into())]);
/// ```
pub struct Pilot {
    engine: Engine<HeadlessBackend>,
    calls: Rc<RefCell<Vec<HostCall>>>,
}

impl Pilot {
    /// Create a headless engine with the given screen size.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_config(EngineConfig::default().with_screen(width, height))
    }

    /// Create a pilot from an [`EngineConfig`]; the backend matches its screen.
    pub fn with_config(config: EngineConfig) -> Self {
        let backend = HeadlessBackend::new(config.screen.width, config.screen.height);
        let host = RecordingHost::new();
        let calls = host.log();
        let mut engine = Engine::new(backend, config).with_host(host);
        let notified = Rc::clone(&calls);
        engine.store_mut().on_change(move |name, value| {
            notified.borrow_mut().push(HostCall::Notified {
                name: name.to_string(),
                value: value.to_string(),
            });
        });
        Self { engine, calls }
    }

    /// Render markup; returns the element count.
    pub fn render(&mut self, markup: &str) -> usize {
        self.engine.render(markup)
    }

    // ── Input simulation ─────────────────────────────────────────────

    /// Click the widget registered as `id`.
    pub fn click(&mut self, id: &str) -> Result<(), UiError> {
        let target = self.target(id)?;
        self.fire(target, EventKind::Clicked);
        Ok(())
    }

    /// Long-press the widget registered as `id`.
    pub fn long_press(&mut self, id: &str) -> Result<(), UiError> {
        let target = self.target(id)?;
        self.fire(target, EventKind::LongPressed);
        Ok(())
    }

    /// Flip a switch as if the user tapped it.
    pub fn toggle(&mut self, id: &str) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        let backend = self.engine.backend_mut();
        let checked = backend.is_checked(obj);
        backend.set_checked(obj, !checked);
        self.fire(obj, EventKind::ValueChanged);
        Ok(())
    }

    /// Drag a slider to `value` without releasing it.
    pub fn slide(&mut self, id: &str, value: i32) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.engine.backend_mut().set_value(obj, value);
        self.fire(obj, EventKind::ValueChanged);
        Ok(())
    }

    /// Release a slider at its current value.
    pub fn release(&mut self, id: &str) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.fire(obj, EventKind::Released);
        Ok(())
    }

    /// Replace the text of an input as if typed.
    pub fn type_text(&mut self, id: &str, text: &str) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.engine.backend_mut().set_text(obj, text);
        self.fire(obj, EventKind::ValueChanged);
        Ok(())
    }

    /// Focus an input.
    pub fn focus(&mut self, id: &str) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.engine.backend_mut().set_focused(obj, true);
        self.fire(obj, EventKind::Focused);
        Ok(())
    }

    /// Take focus away from an input.
    pub fn blur(&mut self, id: &str) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.engine.backend_mut().set_focused(obj, false);
        self.fire(obj, EventKind::Defocused);
        Ok(())
    }

    /// Report `kind` on widget `id` with the pointer at screen `(x, y)`.
    pub fn touch(&mut self, id: &str, x: i32, y: i32, kind: EventKind) -> Result<(), UiError> {
        let obj = self.obj(id)?;
        self.engine.backend_mut().set_pointer(x, y);
        self.fire(obj, kind);
        Ok(())
    }

    /// Swipe group `group` to its tile at `index`.
    pub fn swipe(&mut self, group: &str, index: usize) -> Result<(), UiError> {
        let (tile_view, tile) = {
            let grp = self
                .engine
                .navigator()
                .group(group)
                .ok_or_else(|| UiError::UnknownPage(group.to_string()))?;
            let tile = grp.tiles.get(index).copied().ok_or_else(|| UiError::UnknownGroupPage {
                group: group.to_string(),
                page: index.to_string(),
            })?;
            (grp.tile_view, tile)
        };
        self.engine.backend_mut().set_active_tile(tile_view, tile);
        self.fire(tile_view, EventKind::ValueChanged);
        Ok(())
    }

    /// Queue an event and process the whole queue.
    pub fn fire(&mut self, widget: WidgetId, kind: EventKind) {
        self.engine.post(widget, kind);
        self.engine.process_events();
    }

    /// Advance the backend clock.
    pub fn advance_ms(&mut self, ms: u64) {
        self.engine.backend_mut().advance_ms(ms);
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn engine(&self) -> &Engine<HeadlessBackend> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine<HeadlessBackend> {
        &mut self.engine
    }

    /// Copy of everything recorded so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    /// Recorded calls, emptying the log.
    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Text of the widget registered as `id` (empty when unknown).
    pub fn text(&self, id: &str) -> String {
        self.engine
            .get(id)
            .map(|w| self.engine.backend().text(w))
            .unwrap_or_default()
    }

    /// Whether `id` and all its ancestors are shown.
    pub fn is_visible(&self, id: &str) -> bool {
        self.engine
            .get(id)
            .is_some_and(|w| self.engine.backend().is_visible(w))
    }

    /// Outline of the whole widget tree.
    pub fn dump(&self) -> String {
        let backend = self.engine.backend();
        backend.dump(backend.screen())
    }

    fn element(&self, id: &str) -> Result<&Element, UiError> {
        let elements = self.engine.elements();
        elements
            .find(id)
            .and_then(|i| elements.get(i))
            .ok_or_else(|| UiError::UnknownWidget(id.to_string()))
    }

    fn obj(&self, id: &str) -> Result<WidgetId, UiError> {
        self.element(id).map(|e| e.obj)
    }

    fn target(&self, id: &str) -> Result<WidgetId, UiError> {
        self.element(id).map(|e| e.target())
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeKind;
    use pretty_assertions::assert_eq;

    fn call(f: &str) -> HostCall {
        HostCall::Call(f.to_string())
    }

    fn changed(name: &str, value: &str) -> HostCall {
        HostCall::StateChanged {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_creates_headless_engine() {
        let pilot = Pilot::new(320, 240);
        assert_eq!(pilot.engine().config().screen.width, 320);
        assert!(pilot.calls().is_empty());
        assert_eq!(pilot.dump(), "Screen 0,0 320x240\n");
    }

    // ── Buttons ──────────────────────────────────────────────────────

    #[test]
    fn click_calls_onclick_then_follows_href() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(
            r#"<page id="a"><button id="b" onclick="go" href="/c">Go</button></page>
               <page id="c"/>"#,
        );
        pilot.click("b").unwrap();
        assert_eq!(pilot.calls(), vec![call("go")]);
        assert_eq!(pilot.engine().current_page_id(), "c");
    }

    #[test]
    fn long_press_calls_onhold() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<button id="b" onhold="held">x</button>"#);
        pilot.long_press("b").unwrap();
        assert_eq!(pilot.calls(), vec![HostCall::Hold("held".into())]);
    }

    #[test]
    fn unknown_widget_is_error() {
        let mut pilot = Pilot::new(480, 320);
        assert_eq!(pilot.click("x"), Err(UiError::UnknownWidget("x".into())));
    }

    // ── Value widgets ────────────────────────────────────────────────

    #[test]
    fn toggle_pushes_bound_value() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(
            r#"<app><state><bool name="on" default="false"/></state>
               <ui><switch id="s" bind="on" onchange="changed"/><label id="l">{on}</label></ui></app>"#,
        );
        pilot.toggle("s").unwrap();
        assert!(pilot.engine().get_state_bool("on"));
        assert_eq!(pilot.text("l"), "true");
        assert_eq!(pilot.calls(), vec![changed("on", "true"), call("changed")]);
    }

    #[test]
    fn slider_throttles_then_flushes_on_release() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<slider id="s" bind="level"/><label id="l">{level}</label>"#);
        pilot.slide("s", 10).unwrap();
        assert_eq!(pilot.text("l"), "10");
        pilot.advance_ms(20);
        pilot.slide("s", 20).unwrap();
        assert_eq!(pilot.text("l"), "10");
        pilot.release("s").unwrap();
        assert_eq!(pilot.text("l"), "20");
        pilot.advance_ms(200);
        pilot.slide("s", 30).unwrap();
        assert_eq!(pilot.text("l"), "30");
    }

    #[test]
    fn typing_updates_store_and_blur_reports() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<page id="p"><input id="i" bind="name" onchange="saved"/></page>"#);
        pilot.focus("i").unwrap();
        let kb = pilot.engine().backend().find_kind(NativeKind::Keyboard).unwrap();
        assert!(!pilot.engine().backend().is_hidden(kb));
        pilot.type_text("i", "Ada").unwrap();
        assert_eq!(pilot.engine().get_state_string("name"), "Ada");
        pilot.blur("i").unwrap();
        assert!(pilot.engine().backend().is_hidden(kb));
        assert_eq!(pilot.calls(), vec![changed("name", "Ada"), call("saved")]);
    }

    // ── Canvas ───────────────────────────────────────────────────────

    #[test]
    fn canvas_touch_uses_local_coordinates() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<canvas id="c" x="100" y="50" w="50" h="50" ontap="tap" ondraw="draw"/>"#);
        pilot.touch("c", 110, 70, EventKind::Clicked).unwrap();
        pilot.touch("c", 300, 300, EventKind::Clicked).unwrap();
        pilot.touch("c", 120, 60, EventKind::Pressed).unwrap();
        assert_eq!(
            pilot.calls(),
            vec![
                HostCall::Tap {
                    function: "tap".into(),
                    x: 10,
                    y: 20
                },
                call("draw"),
            ]
        );
        assert_eq!(pilot.engine().get_state_int("_touchX"), 20);
        assert_eq!(pilot.engine().get_state_int("lastX"), -1);
    }

    // ── Groups ───────────────────────────────────────────────────────

    #[test]
    fn swipe_tracks_group_page() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<group id="g"><page id="a"/><page id="b"/></group>"#);
        pilot.swipe("g", 1).unwrap();
        assert_eq!(pilot.engine().current_page_id(), "b");
        assert!(pilot.swipe("g", 5).is_err());
    }

    #[test]
    fn take_calls_empties_log() {
        let mut pilot = Pilot::new(480, 320);
        pilot.render(r#"<button id="b" onclick="f">x</button>"#);
        pilot.click("b").unwrap();
        assert_eq!(pilot.take_calls().len(), 1);
        assert!(pilot.calls().is_empty());
    }
}
