//! Node data of the in-memory widget tree.

use crate::backend::{NativeKind, Span, WidgetId};
use crate::css::styles::{LongMode, Style};
use crate::geometry::Rect;

/// Everything the headless backend remembers about one widget.
#[derive(Debug, Clone)]
pub struct WidgetNode {
    pub kind: NativeKind,
    /// Position relative to the parent, and size.
    pub rect: Rect,
    pub hidden: bool,
    pub style: Style,
    pub text: String,
    pub checked: bool,
    pub value: i32,
    pub range: (i32, i32),
    pub placeholder: String,
    pub password: bool,
    pub one_line: bool,
    pub long_mode: LongMode,
    pub image_source: String,
    pub clickable: bool,
    pub focused: bool,
    pub keyboard_target: Option<WidgetId>,
    pub tab_bar_height: i32,
    pub vertical: bool,
    pub scrollbar: bool,
    pub spans: Vec<Span>,
    /// Active tile of a tile view.
    pub active_tile: Option<WidgetId>,
    /// How many times canvas pixels were pushed.
    pub invalidations: usize,
}

impl WidgetNode {
    /// Create a node of the given kind with toolkit defaults.
    pub fn new(kind: NativeKind) -> Self {
        Self {
            kind,
            rect: Rect::default(),
            hidden: false,
            style: Style::default(),
            text: String::new(),
            checked: false,
            value: 0,
            range: (0, 100),
            placeholder: String::new(),
            password: false,
            one_line: false,
            long_mode: LongMode::default(),
            image_source: String::new(),
            clickable: matches!(kind, NativeKind::Button | NativeKind::Switch | NativeKind::Slider),
            focused: false,
            keyboard_target: None,
            tab_bar_height: 0,
            vertical: false,
            scrollbar: true,
            spans: Vec::new(),
            active_tile: None,
            invalidations: 0,
        }
    }

    /// Set the rect (builder).
    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = rect;
        self
    }
}
