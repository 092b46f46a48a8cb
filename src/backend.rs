//! The widget toolkit seen through a small creation/mutation API.
//!
//! The engine never draws anything itself. Everything it does to the screen
//! goes through [`Backend`], which a real toolkit binding implements on the
//! device and [`HeadlessBackend`](crate::dom::HeadlessBackend) implements in
//! memory for tests.

use crate::css::styles::{Font, LongMode, Style, StyleProp};
use crate::geometry::{Align, Offset, Rect};

slotmap::new_key_type! {
    /// Handle to a native widget. Non-owning: the backend owns the widget.
    pub struct WidgetId;
}

/// Native widget classes the engine asks the toolkit for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeKind {
    /// The root screen. Exactly one exists.
    Screen,
    /// Full-screen container for a standalone page.
    Page,
    /// Swipeable container hosting a group's tiles.
    TileView,
    /// One page inside a tile view.
    Tile,
    /// Row of dots showing a group's active tile.
    Indicator,
    /// One dot of an indicator.
    Dot,
    Label,
    Button,
    Switch,
    Slider,
    TextArea,
    Keyboard,
    Canvas,
    Image,
    /// Rich text made of styled spans.
    SpanGroup,
    TabView,
    Tab,
}

/// Non-style widget configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    LongMode(LongMode),
    Placeholder(String),
    Password(bool),
    OneLine(bool),
    ImageSource(String),
    Clickable(bool),
    /// Text area the keyboard types into.
    KeyboardTarget(Option<WidgetId>),
    TabBarHeight(i32),
    /// Scroll direction of a tile view.
    Vertical(bool),
    /// Show the native scrollbar (tile views).
    Scrollbar(bool),
}

/// One run of uniformly styled rich text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub font: Font,
    pub color: u32,
}

impl Span {
    pub fn new(text: impl Into<String>, font: Font, color: u32) -> Self {
        Self {
            text: text.into(),
            font,
            color,
        }
    }
}

/// Creation and mutation API of the widget toolkit.
///
/// Handles passed in are expected to be live; implementations ignore calls on
/// deleted widgets and return neutral values from queries.
pub trait Backend {
    // ── Tree ─────────────────────────────────────────────────────────

    /// The root screen widget.
    fn screen(&self) -> WidgetId;
    /// Create a widget as the last child of `parent` (the screen when `None`).
    fn create(&mut self, kind: NativeKind, parent: Option<WidgetId>) -> WidgetId;
    /// Delete a widget and its subtree.
    fn delete(&mut self, id: WidgetId);
    /// Delete every child of `id`.
    fn clean(&mut self, id: WidgetId);
    fn exists(&self, id: WidgetId) -> bool;
    fn kind(&self, id: WidgetId) -> Option<NativeKind>;
    fn parent(&self, id: WidgetId) -> Option<WidgetId>;
    fn child_count(&self, id: WidgetId) -> usize;
    fn child(&self, id: WidgetId, index: usize) -> Option<WidgetId>;
    /// Position of `id` among its siblings (0 is drawn first, i.e. deepest).
    fn index(&self, id: WidgetId) -> usize;
    fn move_to_index(&mut self, id: WidgetId, index: usize);
    /// Move to the end of the sibling list (drawn last, i.e. topmost).
    fn move_foreground(&mut self, id: WidgetId);

    // ── Geometry ─────────────────────────────────────────────────────

    fn set_pos(&mut self, id: WidgetId, x: i32, y: i32);
    fn set_size(&mut self, id: WidgetId, width: i32, height: i32);
    /// Place `id` on its parent's alignment grid, shifted by `offset`.
    fn align(&mut self, id: WidgetId, align: Align, offset: Offset);
    /// Position relative to the parent, and size.
    fn rect(&self, id: WidgetId) -> Rect;
    /// Position in screen coordinates, and size.
    fn screen_rect(&self, id: WidgetId) -> Rect;

    // ── Appearance ───────────────────────────────────────────────────

    fn set_hidden(&mut self, id: WidgetId, hidden: bool);
    fn is_hidden(&self, id: WidgetId) -> bool;
    fn set_style(&mut self, id: WidgetId, prop: StyleProp);
    fn style(&self, id: WidgetId) -> Style;
    fn remove_all_styles(&mut self, id: WidgetId);
    /// Line height in pixels of a font.
    fn line_height(&self, font: Font) -> i32;

    // ── Content ──────────────────────────────────────────────────────

    fn set_text(&mut self, id: WidgetId, text: &str);
    fn text(&self, id: WidgetId) -> String;
    fn set_checked(&mut self, id: WidgetId, checked: bool);
    fn is_checked(&self, id: WidgetId) -> bool;
    fn set_range(&mut self, id: WidgetId, min: i32, max: i32);
    fn set_value(&mut self, id: WidgetId, value: i32);
    fn value(&self, id: WidgetId) -> i32;
    fn configure(&mut self, id: WidgetId, setting: Setting);
    fn set_spans(&mut self, id: WidgetId, spans: Vec<Span>);
    /// Pixel content of a canvas changed; `pixels` is ARGB8888, row-major.
    fn invalidate(&mut self, id: WidgetId, pixels: &[u8]);

    // ── Interaction state ────────────────────────────────────────────

    fn set_active_tile(&mut self, tile_view: WidgetId, tile: WidgetId);
    fn active_tile(&self, tile_view: WidgetId) -> Option<WidgetId>;
    fn set_focused(&mut self, id: WidgetId, focused: bool);
    fn is_focused(&self, id: WidgetId) -> bool;
    /// Last pointer position in screen coordinates.
    fn pointer(&self) -> Offset;
    /// Monotonic milliseconds.
    fn tick_ms(&self) -> u64;
}
