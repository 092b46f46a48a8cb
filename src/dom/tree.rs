//! In-memory widget tree implementing [`Backend`].
//!
//! Widgets live in a single `SlotMap`; parent/child links are kept in
//! secondary maps so removal is O(subtree size) and lookup is O(1). Child
//! order is draw order: index 0 is drawn first (deepest).

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::WidgetNode;
use crate::backend::{Backend, NativeKind, Setting, Span, WidgetId};
use crate::css::styles::{Font, Style, StyleProp};
use crate::geometry::{Align, Offset, Rect, Size};

/// Empty slice constant for returning when a widget has no children.
const EMPTY_CHILDREN: &[WidgetId] = &[];

/// Headless toolkit used by tests and tooling.
pub struct HeadlessBackend {
    nodes: SlotMap<WidgetId, WidgetNode>,
    children: SecondaryMap<WidgetId, Vec<WidgetId>>,
    parent: SecondaryMap<WidgetId, WidgetId>,
    /// Alignment to re-evaluate when a widget's size changes.
    aligned: SecondaryMap<WidgetId, (Align, Offset)>,
    screen: WidgetId,
    pointer: Offset,
    clock_ms: u64,
}

impl HeadlessBackend {
    /// Create a backend whose screen is `width × height` pixels.
    pub fn new(width: i32, height: i32) -> Self {
        let mut nodes = SlotMap::with_key();
        let screen = nodes.insert(
            WidgetNode::new(NativeKind::Screen).with_rect(Rect::new(0, 0, width, height)),
        );
        let mut children = SecondaryMap::new();
        children.insert(screen, Vec::new());
        Self {
            nodes,
            children,
            parent: SecondaryMap::new(),
            aligned: SecondaryMap::new(),
            screen,
            pointer: Offset::default(),
            clock_ms: 0,
        }
    }

    /// Immutable access to a widget's data.
    pub fn get(&self, id: WidgetId) -> Option<&WidgetNode> {
        self.nodes.get(id)
    }

    /// Children of a widget in draw order.
    pub fn children(&self, id: WidgetId) -> &[WidgetId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Number of live widgets, the screen included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Move the simulated pointer (screen coordinates).
    pub fn set_pointer(&mut self, x: i32, y: i32) {
        self.pointer = Offset::new(x, y);
    }

    /// Advance the simulated clock.
    pub fn advance_ms(&mut self, ms: u64) {
        self.clock_ms += ms;
    }

    /// Depth-first walk of `id`'s subtree (excluding `id`).
    pub fn descendants(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut out = Vec::new();
        let mut stack: Vec<WidgetId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// First widget of `kind` anywhere on screen, in depth-first order.
    pub fn find_kind(&self, kind: NativeKind) -> Option<WidgetId> {
        self.descendants(self.screen)
            .into_iter()
            .find(|&w| self.nodes.get(w).is_some_and(|n| n.kind == kind))
    }

    /// Whether `id` and every ancestor are shown.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        let mut current = Some(id);
        while let Some(w) = current {
            match self.nodes.get(w) {
                Some(node) if !node.hidden => current = self.parent.get(w).copied(),
                _ => return false,
            }
        }
        true
    }

    /// Indented outline of a subtree: kind, rect, text, and a `hidden`
    /// marker. Used for snapshot tests.
    pub fn dump(&self, id: WidgetId) -> String {
        let mut out = String::new();
        self.dump_into(id, 0, &mut out);
        out
    }

    fn dump_into(&self, id: WidgetId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        let r = node.rect;
        out.push_str(&"  ".repeat(depth));
        out.push_str(&format!("{:?} {},{} {}x{}", node.kind, r.x, r.y, r.width, r.height));
        if !node.text.is_empty() {
            out.push_str(&format!(" {:?}", node.text));
        }
        if node.hidden {
            out.push_str(" hidden");
        }
        out.push('\n');
        for &child in self.children(id) {
            self.dump_into(child, depth + 1, out);
        }
    }

    fn node_mut(&mut self, id: WidgetId) -> Option<&mut WidgetNode> {
        self.nodes.get_mut(id)
    }

    fn parent_size(&self, id: WidgetId) -> Size {
        let parent = self.parent.get(id).copied().unwrap_or(self.screen);
        self.nodes.get(parent).map(|n| n.rect.size()).unwrap_or_default()
    }

    fn place_aligned(&mut self, id: WidgetId) {
        let Some(&(align, offset)) = self.aligned.get(id) else {
            return;
        };
        let parent = self.parent_size(id);
        if let Some(node) = self.nodes.get_mut(id) {
            let pos = align.place(parent, node.rect.size(), offset);
            node.rect.x = pos.x;
            node.rect.y = pos.y;
        }
    }
}

impl Backend for HeadlessBackend {
    fn screen(&self) -> WidgetId {
        self.screen
    }

    fn create(&mut self, kind: NativeKind, parent: Option<WidgetId>) -> WidgetId {
        let parent = parent
            .filter(|p| self.nodes.contains_key(*p))
            .unwrap_or(self.screen);
        let id = self.nodes.insert(WidgetNode::new(kind));
        self.children.insert(id, Vec::new());
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        id
    }

    fn delete(&mut self, id: WidgetId) {
        if !self.nodes.contains_key(id) || id == self.screen {
            return;
        }
        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            self.aligned.remove(current);
            self.nodes.remove(current);
        }
    }

    fn clean(&mut self, id: WidgetId) {
        let kids: Vec<WidgetId> = self.children(id).to_vec();
        for child in kids {
            self.delete(child);
        }
    }

    fn exists(&self, id: WidgetId) -> bool {
        self.nodes.contains_key(id)
    }

    fn kind(&self, id: WidgetId) -> Option<NativeKind> {
        self.nodes.get(id).map(|n| n.kind)
    }

    fn parent(&self, id: WidgetId) -> Option<WidgetId> {
        self.parent.get(id).copied()
    }

    fn child_count(&self, id: WidgetId) -> usize {
        self.children(id).len()
    }

    fn child(&self, id: WidgetId, index: usize) -> Option<WidgetId> {
        self.children(id).get(index).copied()
    }

    fn index(&self, id: WidgetId) -> usize {
        self.parent
            .get(id)
            .and_then(|&p| self.children(p).iter().position(|&c| c == id))
            .unwrap_or(0)
    }

    fn move_to_index(&mut self, id: WidgetId, index: usize) {
        let Some(&parent) = self.parent.get(id) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&c| c != id);
            let at = index.min(siblings.len());
            siblings.insert(at, id);
        }
    }

    fn move_foreground(&mut self, id: WidgetId) {
        let Some(&parent) = self.parent.get(id) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.retain(|&c| c != id);
            siblings.push(id);
        }
    }

    fn set_pos(&mut self, id: WidgetId, x: i32, y: i32) {
        self.aligned.remove(id);
        if let Some(node) = self.node_mut(id) {
            node.rect.x = x;
            node.rect.y = y;
        }
    }

    fn set_size(&mut self, id: WidgetId, width: i32, height: i32) {
        if let Some(node) = self.node_mut(id) {
            node.rect.width = width;
            node.rect.height = height;
        }
        self.place_aligned(id);
    }

    fn align(&mut self, id: WidgetId, align: Align, offset: Offset) {
        if !self.nodes.contains_key(id) {
            return;
        }
        self.aligned.insert(id, (align, offset));
        self.place_aligned(id);
    }

    fn rect(&self, id: WidgetId) -> Rect {
        self.nodes.get(id).map(|n| n.rect).unwrap_or_default()
    }

    fn screen_rect(&self, id: WidgetId) -> Rect {
        let mut rect = self.rect(id);
        let mut current = self.parent.get(id).copied();
        while let Some(p) = current {
            let pr = self.rect(p);
            rect.x += pr.x;
            rect.y += pr.y;
            current = self.parent.get(p).copied();
        }
        rect
    }

    fn set_hidden(&mut self, id: WidgetId, hidden: bool) {
        if let Some(node) = self.node_mut(id) {
            node.hidden = hidden;
        }
    }

    fn is_hidden(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.hidden)
    }

    fn set_style(&mut self, id: WidgetId, prop: StyleProp) {
        if let Some(node) = self.node_mut(id) {
            node.style.apply(prop);
        }
    }

    fn style(&self, id: WidgetId) -> Style {
        self.nodes.get(id).map(|n| n.style.clone()).unwrap_or_default()
    }

    fn remove_all_styles(&mut self, id: WidgetId) {
        if let Some(node) = self.node_mut(id) {
            node.style = Style::default();
        }
    }

    fn line_height(&self, font: Font) -> i32 {
        match font {
            Font::Small => 18,
            Font::Medium => 37,
            Font::Large => 56,
            Font::XLarge => 84,
        }
    }

    fn set_text(&mut self, id: WidgetId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            node.text = text.to_string();
        }
    }

    fn text(&self, id: WidgetId) -> String {
        self.nodes.get(id).map(|n| n.text.clone()).unwrap_or_default()
    }

    fn set_checked(&mut self, id: WidgetId, checked: bool) {
        if let Some(node) = self.node_mut(id) {
            node.checked = checked;
        }
    }

    fn is_checked(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.checked)
    }

    fn set_range(&mut self, id: WidgetId, min: i32, max: i32) {
        if let Some(node) = self.node_mut(id) {
            node.range = (min, max);
            node.value = node.value.clamp(min, max.max(min));
        }
    }

    fn set_value(&mut self, id: WidgetId, value: i32) {
        if let Some(node) = self.node_mut(id) {
            let (min, max) = node.range;
            node.value = value.clamp(min, max.max(min));
        }
    }

    fn value(&self, id: WidgetId) -> i32 {
        self.nodes.get(id).map_or(0, |n| n.value)
    }

    fn configure(&mut self, id: WidgetId, setting: Setting) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        match setting {
            Setting::LongMode(m) => node.long_mode = m,
            Setting::Placeholder(p) => node.placeholder = p,
            Setting::Password(p) => node.password = p,
            Setting::OneLine(o) => node.one_line = o,
            Setting::ImageSource(s) => node.image_source = s,
            Setting::Clickable(c) => node.clickable = c,
            Setting::KeyboardTarget(t) => node.keyboard_target = t,
            Setting::TabBarHeight(h) => node.tab_bar_height = h,
            Setting::Vertical(v) => node.vertical = v,
            Setting::Scrollbar(s) => node.scrollbar = s,
        }
    }

    fn set_spans(&mut self, id: WidgetId, spans: Vec<Span>) {
        if let Some(node) = self.node_mut(id) {
            node.text = spans.iter().map(|s| s.text.as_str()).collect();
            node.spans = spans;
        }
    }

    fn invalidate(&mut self, id: WidgetId, _pixels: &[u8]) {
        if let Some(node) = self.node_mut(id) {
            node.invalidations += 1;
        }
    }

    fn set_active_tile(&mut self, tile_view: WidgetId, tile: WidgetId) {
        if let Some(node) = self.node_mut(tile_view) {
            node.active_tile = Some(tile);
        }
    }

    fn active_tile(&self, tile_view: WidgetId) -> Option<WidgetId> {
        self.nodes.get(tile_view).and_then(|n| n.active_tile)
    }

    fn set_focused(&mut self, id: WidgetId, focused: bool) {
        if let Some(node) = self.node_mut(id) {
            node.focused = focused;
        }
    }

    fn is_focused(&self, id: WidgetId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.focused)
    }

    fn pointer(&self) -> Offset {
        self.pointer
    }

    fn tick_ms(&self) -> u64 {
        self.clock_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> HeadlessBackend {
        HeadlessBackend::new(480, 320)
    }

    #[test]
    fn create_attaches_to_screen_by_default() {
        let mut be = backend();
        let a = be.create(NativeKind::Label, None);
        assert_eq!(be.parent(a), Some(be.screen()));
        assert_eq!(be.child_count(be.screen()), 1);
    }

    #[test]
    fn delete_removes_subtree() {
        let mut be = backend();
        let page = be.create(NativeKind::Page, None);
        let btn = be.create(NativeKind::Button, Some(page));
        let lbl = be.create(NativeKind::Label, Some(btn));
        be.delete(page);
        assert!(!be.exists(page));
        assert!(!be.exists(btn));
        assert!(!be.exists(lbl));
        assert_eq!(be.len(), 1);
    }

    #[test]
    fn clean_keeps_the_widget() {
        let mut be = backend();
        let screen = be.screen();
        be.create(NativeKind::Page, None);
        be.create(NativeKind::Page, None);
        be.clean(screen);
        assert!(be.exists(screen));
        assert_eq!(be.child_count(screen), 0);
    }

    #[test]
    fn reorder_children() {
        let mut be = backend();
        let a = be.create(NativeKind::Label, None);
        let b = be.create(NativeKind::Label, None);
        let c = be.create(NativeKind::Label, None);
        be.move_to_index(c, 0);
        assert_eq!(be.children(be.screen()), &[c, a, b]);
        be.move_foreground(c);
        assert_eq!(be.children(be.screen()), &[a, b, c]);
        assert_eq!(be.index(b), 1);
    }

    #[test]
    fn align_follows_size_changes() {
        let mut be = backend();
        let w = be.create(NativeKind::Label, None);
        be.align(w, Align::Center, Offset::default());
        be.set_size(w, 100, 20);
        assert_eq!(be.rect(w), Rect::new(190, 150, 100, 20));
        be.set_pos(w, 1, 2);
        be.set_size(w, 50, 20);
        assert_eq!(be.rect(w), Rect::new(1, 2, 50, 20));
    }

    #[test]
    fn screen_rect_accumulates_parents() {
        let mut be = backend();
        let page = be.create(NativeKind::Page, None);
        be.set_pos(page, 10, 20);
        let w = be.create(NativeKind::Canvas, Some(page));
        be.set_pos(w, 5, 5);
        be.set_size(w, 30, 30);
        assert_eq!(be.screen_rect(w), Rect::new(15, 25, 30, 30));
    }

    #[test]
    fn slider_value_clamped_to_range() {
        let mut be = backend();
        let s = be.create(NativeKind::Slider, None);
        be.set_range(s, 10, 20);
        be.set_value(s, 50);
        assert_eq!(be.value(s), 20);
        be.set_value(s, 0);
        assert_eq!(be.value(s), 10);
    }

    #[test]
    fn visibility_includes_ancestors() {
        let mut be = backend();
        let page = be.create(NativeKind::Page, None);
        let w = be.create(NativeKind::Label, Some(page));
        assert!(be.is_visible(w));
        be.set_hidden(page, true);
        assert!(!be.is_visible(w));
        assert!(!be.is_hidden(w));
    }

    #[test]
    fn spans_set_text() {
        let mut be = backend();
        let w = be.create(NativeKind::SpanGroup, None);
        be.set_spans(
            w,
            vec![Span::new("a", Font::Small, 0), Span::new("b", Font::Large, 1)],
        );
        assert_eq!(be.text(w), "ab");
    }

    #[test]
    fn dump_outline() {
        let mut be = backend();
        let page = be.create(NativeKind::Page, None);
        be.set_size(page, 480, 320);
        let lbl = be.create(NativeKind::Label, Some(page));
        be.set_text(lbl, "Hi");
        be.set_hidden(page, true);
        insta::assert_snapshot!(be.dump(be.screen()), @r###"
        Screen 0,0 480x320
          Page 0,0 480x320 hidden
            Label 0,0 0x0 "Hi"
        "###);
    }
}
