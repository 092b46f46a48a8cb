//! Page and page-group navigation, plus the post-render z-order pass.
//!
//! Standalone pages are full-screen containers of which at most one is shown.
//! A page group is a swipeable tile view holding up to a few pages, with an
//! optional row of indicator dots. [`Navigator`] owns the handles; the
//! [`Engine`] methods at the bottom resolve navigation targets.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::app::Engine;
use crate::backend::{Backend, NativeKind, WidgetId};
use crate::css::properties::OPA_COVER;
use crate::css::StyleProp;
use crate::error::UiError;
use crate::geometry::{Align, Offset, Size};
use crate::widget::Elements;

/// Dot diameter.
const DOT_SIZE: i32 = 8;
/// Space each dot takes along the indicator.
const DOT_CELL: i32 = 16;
/// Indicator thickness across the row of dots.
const DOT_THICKNESS: i32 = 12;
const DOT_MARGIN: i32 = 15;
const DOT_SPACING: i32 = 8;
const DOT_ACTIVE: u32 = 0xFFFFFF;
const DOT_INACTIVE: u32 = 0x666666;
/// Radius large enough to make any widget round.
const RADIUS_CIRCLE: i32 = 0x7FFF;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A standalone page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub widget: WidgetId,
}

/// Swipe direction of a page group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
}

impl Orientation {
    /// `vertical` and `v` are vertical; anything else is horizontal.
    pub fn from_keyword(s: &str) -> Self {
        match s {
            "vertical" | "v" => Orientation::Vertical,
            _ => Orientation::Horizontal,
        }
    }
}

/// How a page group shows its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Indicator {
    #[default]
    Scrollbar,
    Dots,
    None,
}

impl Indicator {
    pub fn from_keyword(s: &str) -> Self {
        match s {
            "dots" => Indicator::Dots,
            "none" => Indicator::None,
            _ => Indicator::Scrollbar,
        }
    }
}

/// A swipeable group of pages.
#[derive(Debug, Clone)]
pub struct PageGroup {
    pub id: String,
    /// Page shown when the group is the navigation target.
    pub default_page: String,
    pub orientation: Orientation,
    pub indicator: Indicator,
    pub page_ids: Vec<String>,
    pub tiles: Vec<WidgetId>,
    pub tile_view: WidgetId,
    /// Dot row, when the indicator is dots and there is more than one page.
    pub indicator_obj: Option<WidgetId>,
    /// Index of the active tile.
    pub current: usize,
}

impl PageGroup {
    pub fn page_index(&self, page: &str) -> Option<usize> {
        self.page_ids.iter().position(|p| p == page)
    }

    fn set_hidden<B: Backend + ?Sized>(&self, backend: &mut B, hidden: bool) {
        backend.set_hidden(self.tile_view, hidden);
        if let Some(ind) = self.indicator_obj {
            backend.set_hidden(ind, hidden);
        }
    }

    /// Color the dots so that only `active` is highlighted.
    fn update_indicator<B: Backend + ?Sized>(&self, backend: &mut B, active: usize) {
        let Some(ind) = self.indicator_obj else {
            return;
        };
        for i in 0..backend.child_count(ind) {
            if let Some(dot) = backend.child(ind, i) {
                let color = if i == active { DOT_ACTIVE } else { DOT_INACTIVE };
                backend.set_style(dot, StyleProp::BgColor(color));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Navigator
// ---------------------------------------------------------------------------

/// Pages, groups and page keyboards of the current render.
#[derive(Debug, Default)]
pub struct Navigator {
    pub pages: Vec<Page>,
    pub groups: Vec<PageGroup>,
    /// Shown standalone page, if a standalone page is the current target.
    pub current_page: Option<usize>,
    /// Shown group, if a group is the current target.
    pub current_group: Option<usize>,
    /// On-screen keyboard per page or tile container, created on first focus.
    keyboards: HashMap<WidgetId, WidgetId>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every page, group and keyboard. The widgets themselves are
    /// deleted with the screen contents.
    pub fn clear(&mut self) {
        self.pages.clear();
        self.groups.clear();
        self.current_page = None;
        self.current_group = None;
        self.keyboards.clear();
    }

    pub fn page_index(&self, id: &str) -> Option<usize> {
        self.pages.iter().position(|p| p.id == id)
    }

    pub fn group_index(&self, id: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.id == id)
    }

    pub fn group(&self, id: &str) -> Option<&PageGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    // ── Construction ─────────────────────────────────────────────────

    /// Create a full-screen container for a standalone page.
    pub fn add_page<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: &str,
        screen: Size,
    ) -> WidgetId {
        let page = backend.create(NativeKind::Page, None);
        backend.set_size(page, screen.width, screen.height);
        backend.set_pos(page, 0, 0);
        backend.set_style(page, StyleProp::BgOpacity(0));
        backend.set_style(page, StyleProp::BorderWidth(0));
        for side in [
            crate::css::Side::Top,
            crate::css::Side::Right,
            crate::css::Side::Bottom,
            crate::css::Side::Left,
        ] {
            backend.set_style(page, StyleProp::Padding(side, 0));
        }
        self.pages.push(Page {
            id: id.to_string(),
            widget: page,
        });
        page
    }

    /// Create the tile view of a new group and return the group index.
    pub fn add_group<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        id: &str,
        default_page: &str,
        orientation: Orientation,
        indicator: Indicator,
        screen: Size,
    ) -> usize {
        let tile_view = backend.create(NativeKind::TileView, None);
        backend.set_size(tile_view, screen.width, screen.height);
        backend.set_pos(tile_view, 0, 0);
        backend.set_style(tile_view, StyleProp::BgOpacity(0));
        backend.configure(
            tile_view,
            crate::backend::Setting::Vertical(orientation == Orientation::Vertical),
        );
        backend.configure(
            tile_view,
            crate::backend::Setting::Scrollbar(indicator == Indicator::Scrollbar),
        );
        self.groups.push(PageGroup {
            id: id.to_string(),
            default_page: default_page.to_string(),
            orientation,
            indicator,
            page_ids: Vec::new(),
            tiles: Vec::new(),
            tile_view,
            indicator_obj: None,
            current: 0,
        });
        self.groups.len() - 1
    }

    /// Append a tile for `page_id` to group `group`.
    pub fn add_tile<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        group: usize,
        page_id: &str,
        screen: Size,
    ) -> Option<WidgetId> {
        let grp = self.groups.get_mut(group)?;
        let slot = grp.tiles.len() as i32;
        let tile = backend.create(NativeKind::Tile, Some(grp.tile_view));
        backend.set_size(tile, screen.width, screen.height);
        match grp.orientation {
            Orientation::Horizontal => backend.set_pos(tile, slot * screen.width, 0),
            Orientation::Vertical => backend.set_pos(tile, 0, slot * screen.height),
        }
        backend.set_style(tile, StyleProp::BgOpacity(0));
        if grp.tiles.is_empty() {
            backend.set_active_tile(grp.tile_view, tile);
        }
        grp.page_ids.push(page_id.to_string());
        grp.tiles.push(tile);
        Some(tile)
    }

    /// Create the dot indicator of a group once all its tiles exist.
    pub fn finalize_group<B: Backend + ?Sized>(&mut self, backend: &mut B, group: usize) {
        let Some(grp) = self.groups.get_mut(group) else {
            return;
        };
        if grp.indicator != Indicator::Dots || grp.page_ids.len() <= 1 {
            return;
        }
        let count = grp.page_ids.len() as i32;
        let ind = backend.create(NativeKind::Indicator, None);
        backend.set_style(ind, StyleProp::BgOpacity(0));
        backend.set_style(ind, StyleProp::BorderWidth(0));
        let horizontal = grp.orientation == Orientation::Horizontal;
        if horizontal {
            backend.set_size(ind, count * DOT_CELL, DOT_THICKNESS);
            backend.align(ind, Align::BottomMid, Offset::new(0, -DOT_MARGIN));
        } else {
            backend.set_size(ind, DOT_THICKNESS, count * DOT_CELL);
            backend.align(ind, Align::RightMid, Offset::new(-DOT_SPACING, 0));
        }
        backend.move_foreground(ind);

        let inset = (DOT_CELL - DOT_SIZE) / 2;
        let across = (DOT_THICKNESS - DOT_SIZE) / 2;
        for i in 0..count {
            let dot = backend.create(NativeKind::Dot, Some(ind));
            backend.set_size(dot, DOT_SIZE, DOT_SIZE);
            let along = i * DOT_CELL + inset;
            if horizontal {
                backend.set_pos(dot, along, across);
            } else {
                backend.set_pos(dot, across, along);
            }
            backend.set_style(dot, StyleProp::Radius(RADIUS_CIRCLE));
            backend.set_style(dot, StyleProp::BorderWidth(0));
            backend.set_style(dot, StyleProp::BgOpacity(OPA_COVER));
            let color = if i == 0 { DOT_ACTIVE } else { DOT_INACTIVE };
            backend.set_style(dot, StyleProp::BgColor(color));
        }
        grp.indicator_obj = Some(ind);
        debug!(group = %grp.id, count, "dot indicator");
    }

    // ── Showing ──────────────────────────────────────────────────────

    /// Show `path` (`group/page`, a group id or a page id) and hide every
    /// other navigation target. Unknown targets change nothing.
    pub fn show<B: Backend + ?Sized>(&mut self, backend: &mut B, path: &str) -> Result<(), UiError> {
        let path = path.strip_prefix('/').unwrap_or(path);

        if let Some((group_id, page_id)) = path.split_once('/') {
            let Some(gi) = self.group_index(group_id) else {
                warn!(group = group_id, "group not found");
                return Err(UiError::UnknownPage(group_id.to_string()));
            };
            let Some(pi) = self.groups[gi].page_index(page_id) else {
                warn!(group = group_id, page = page_id, "page not found in group");
                return Err(UiError::UnknownGroupPage {
                    group: group_id.to_string(),
                    page: page_id.to_string(),
                });
            };
            for page in &self.pages {
                backend.set_hidden(page.widget, true);
            }
            for (i, grp) in self.groups.iter().enumerate() {
                grp.set_hidden(backend, i != gi);
            }
            self.hide_keyboards(backend);

            let grp = &mut self.groups[gi];
            backend.set_active_tile(grp.tile_view, grp.tiles[pi]);
            grp.current = pi;
            grp.update_indicator(backend, pi);
            self.current_group = Some(gi);
            self.current_page = None;
            info!(group = group_id, page = page_id, "navigate");
            return Ok(());
        }

        if let Some(grp) = self.group(path) {
            let page = if grp.default_page.is_empty() {
                grp.page_ids.first().cloned().unwrap_or_default()
            } else {
                grp.default_page.clone()
            };
            let target = format!("{}/{page}", grp.id);
            return self.show(backend, &target);
        }

        let Some(idx) = self.page_index(path) else {
            warn!(page = path, "page not found");
            return Err(UiError::UnknownPage(path.to_string()));
        };
        for grp in &self.groups {
            grp.set_hidden(backend, true);
        }
        self.hide_keyboards(backend);
        for (i, page) in self.pages.iter().enumerate() {
            backend.set_hidden(page.widget, i != idx);
        }
        self.current_group = None;
        self.current_page = Some(idx);
        info!(page = path, "navigate");
        Ok(())
    }

    /// Step `delta` standalone pages from the current one. Stepping past
    /// either end does nothing.
    pub fn step<B: Backend + ?Sized>(&mut self, backend: &mut B, delta: isize) -> Result<(), UiError> {
        let current = self.current_page.map_or(-1, |i| i as isize);
        let next = current + delta;
        if next < 0 || next >= self.pages.len() as isize {
            return Ok(());
        }
        let id = self.pages[next as usize].id.clone();
        self.show(backend, &id)
    }

    /// Track a swipe: record the group's active tile and recolor its dots.
    pub fn tile_changed<B: Backend + ?Sized>(&mut self, backend: &mut B, group: usize) {
        let Some(grp) = self.groups.get_mut(group) else {
            return;
        };
        let active = backend.active_tile(grp.tile_view);
        let index = grp
            .tiles
            .iter()
            .position(|&t| Some(t) == active)
            .unwrap_or(0);
        grp.current = index;
        grp.update_indicator(backend, index);
        info!(group = %grp.id, page = index, "swipe");
    }

    /// Id of the page on screen: the active page of the current group, else
    /// the current standalone page, else empty.
    pub fn current_page_id(&self) -> &str {
        if let Some(grp) = self.current_group.and_then(|g| self.groups.get(g)) {
            if let Some(id) = grp.page_ids.get(grp.current) {
                return id;
            }
        }
        self.current_page
            .and_then(|p| self.pages.get(p))
            .map_or("", |p| p.id.as_str())
    }

    // ── Keyboards ────────────────────────────────────────────────────

    /// Page or tile container that `widget` lives in.
    pub fn page_containing<B: Backend + ?Sized>(&self, backend: &B, widget: WidgetId) -> Option<WidgetId> {
        let mut current = backend.parent(widget);
        while let Some(w) = current {
            let is_page = self.pages.iter().any(|p| p.widget == w)
                || self.groups.iter().any(|g| g.tiles.contains(&w));
            if is_page {
                return Some(w);
            }
            current = backend.parent(w);
        }
        None
    }

    /// Keyboard of `page`, created hidden on first use. `on_create` runs once
    /// for a new keyboard so the caller can attach listeners.
    pub fn keyboard<B: Backend + ?Sized>(
        &mut self,
        backend: &mut B,
        page: WidgetId,
        on_create: impl FnOnce(WidgetId),
    ) -> WidgetId {
        if let Some(&kb) = self.keyboards.get(&page) {
            return kb;
        }
        let size = backend.rect(page).size();
        let kb = backend.create(NativeKind::Keyboard, Some(page));
        backend.set_size(kb, size.width, size.height * 40 / 100);
        backend.align(kb, Align::BottomMid, Offset::default());
        backend.set_hidden(kb, true);
        on_create(kb);
        self.keyboards.insert(page, kb);
        debug!("keyboard created");
        kb
    }

    pub fn existing_keyboard(&self, page: WidgetId) -> Option<WidgetId> {
        self.keyboards.get(&page).copied()
    }

    pub fn hide_keyboards<B: Backend + ?Sized>(&self, backend: &mut B) {
        for &kb in self.keyboards.values() {
            backend.set_hidden(kb, true);
        }
    }
}

// ---------------------------------------------------------------------------
// Z-order
// ---------------------------------------------------------------------------

/// Reorder siblings by element z-index.
///
/// Negative values move to the back, `-1` first so the most negative ends
/// deepest. Positive values move to the front in ascending order so the
/// largest ends on top. Zero keeps declaration order; pages are skipped.
pub fn apply_z_order<B: Backend + ?Sized>(backend: &mut B, elements: &Elements) {
    let mut negative: Vec<(i32, WidgetId)> = Vec::new();
    let mut positive: Vec<(i32, WidgetId)> = Vec::new();
    for e in elements.iter().filter(|e| !e.is_page()) {
        match e.z_index {
            z if z < 0 => negative.push((z, e.target())),
            z if z > 0 => positive.push((z, e.target())),
            _ => {}
        }
    }
    negative.sort_by(|a, b| b.0.cmp(&a.0));
    positive.sort_by_key(|&(z, _)| z);
    for &(_, w) in &negative {
        backend.move_to_index(w, 0);
    }
    for &(_, w) in &positive {
        backend.move_foreground(w);
    }
    if !negative.is_empty() || !positive.is_empty() {
        debug!(back = negative.len(), front = positive.len(), "z-order");
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

impl<B: Backend> Engine<B> {
    /// Show a page, a group, or a page inside a group (`group/page`).
    pub fn show_page(&mut self, path: &str) -> Result<(), UiError> {
        let Self {
            navigator, backend, ..
        } = self;
        navigator.show(backend, path)
    }

    /// Follow a link: `/next`, `/prev` and `/back` step through standalone
    /// pages; any other `/target` is shown with
    /// [`show_page`](Engine::show_page).
    pub fn navigate(&mut self, href: &str) -> Result<(), UiError> {
        let Some(target) = href.strip_prefix('/') else {
            warn!(href, "navigate: missing leading '/'");
            return Err(UiError::InvalidHref(href.to_string()));
        };
        info!(href, "navigate");
        let Self {
            navigator, backend, ..
        } = self;
        match target {
            "next" => navigator.step(backend, 1),
            "prev" | "back" => navigator.step(backend, -1),
            _ => navigator.show(backend, target),
        }
    }

    pub fn current_page_id(&self) -> &str {
        self.navigator.current_page_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HeadlessBackend;
    use crate::widget::{Element, WidgetKind};

    const SCREEN: Size = Size::new(480, 320);

    fn setup() -> (HeadlessBackend, Navigator) {
        let mut be = HeadlessBackend::new(SCREEN.width, SCREEN.height);
        let mut nav = Navigator::new();
        nav.add_page(&mut be, "home", SCREEN);
        nav.add_page(&mut be, "settings", SCREEN);
        let g = nav.add_group(&mut be, "g", "", Orientation::Horizontal, Indicator::Dots, SCREEN);
        nav.add_tile(&mut be, g, "a", SCREEN);
        nav.add_tile(&mut be, g, "b", SCREEN);
        nav.finalize_group(&mut be, g);
        (be, nav)
    }

    fn dot_colors(be: &HeadlessBackend, nav: &Navigator) -> Vec<u32> {
        let ind = nav.groups[0].indicator_obj.unwrap();
        be.children(ind)
            .iter()
            .map(|&d| be.style(d).bg_color.unwrap())
            .collect()
    }

    // ── Keywords ─────────────────────────────────────────────────────

    #[test]
    fn keyword_parsing() {
        assert_eq!(Orientation::from_keyword("v"), Orientation::Vertical);
        assert_eq!(Orientation::from_keyword("x"), Orientation::Horizontal);
        assert_eq!(Indicator::from_keyword("dots"), Indicator::Dots);
        assert_eq!(Indicator::from_keyword("none"), Indicator::None);
        assert_eq!(Indicator::from_keyword(""), Indicator::Scrollbar);
    }

    // ── Showing ──────────────────────────────────────────────────────

    #[test]
    fn show_standalone_page_hides_others() {
        let (mut be, mut nav) = setup();
        nav.show(&mut be, "/settings").unwrap();
        assert!(be.is_hidden(nav.pages[0].widget));
        assert!(!be.is_hidden(nav.pages[1].widget));
        assert!(be.is_hidden(nav.groups[0].tile_view));
        assert_eq!(nav.current_page_id(), "settings");
    }

    #[test]
    fn show_group_page_updates_dots() {
        let (mut be, mut nav) = setup();
        nav.show(&mut be, "g/b").unwrap();
        assert!(be.is_hidden(nav.pages[0].widget));
        assert!(!be.is_hidden(nav.groups[0].tile_view));
        assert_eq!(nav.groups[0].current, 1);
        assert_eq!(dot_colors(&be, &nav), vec![DOT_INACTIVE, DOT_ACTIVE]);
        assert_eq!(nav.current_page_id(), "b");
        assert_eq!(nav.current_page, None);
    }

    #[test]
    fn show_group_uses_first_page_without_default() {
        let (mut be, mut nav) = setup();
        nav.show(&mut be, "g").unwrap();
        assert_eq!(nav.current_page_id(), "a");
    }

    #[test]
    fn unknown_targets_change_nothing() {
        let (mut be, mut nav) = setup();
        nav.show(&mut be, "home").unwrap();
        assert_eq!(
            nav.show(&mut be, "nope"),
            Err(UiError::UnknownPage("nope".into()))
        );
        assert!(matches!(
            nav.show(&mut be, "g/zz"),
            Err(UiError::UnknownGroupPage { .. })
        ));
        assert_eq!(nav.current_page_id(), "home");
        assert!(!be.is_hidden(nav.pages[0].widget));
    }

    #[test]
    fn step_does_not_wrap() {
        let (mut be, mut nav) = setup();
        nav.show(&mut be, "home").unwrap();
        nav.step(&mut be, -1).unwrap();
        assert_eq!(nav.current_page_id(), "home");
        nav.step(&mut be, 1).unwrap();
        assert_eq!(nav.current_page_id(), "settings");
        nav.step(&mut be, 1).unwrap();
        assert_eq!(nav.current_page_id(), "settings");
    }

    #[test]
    fn tile_change_tracks_active_tile() {
        let (mut be, mut nav) = setup();
        let tile = nav.groups[0].tiles[1];
        be.set_active_tile(nav.groups[0].tile_view, tile);
        nav.tile_changed(&mut be, 0);
        assert_eq!(nav.groups[0].current, 1);
        assert_eq!(dot_colors(&be, &nav), vec![DOT_INACTIVE, DOT_ACTIVE]);
    }

    #[test]
    fn single_page_group_has_no_dots() {
        let mut be = HeadlessBackend::new(SCREEN.width, SCREEN.height);
        let mut nav = Navigator::new();
        let g = nav.add_group(&mut be, "g", "", Orientation::Vertical, Indicator::Dots, SCREEN);
        nav.add_tile(&mut be, g, "only", SCREEN);
        nav.finalize_group(&mut be, g);
        assert!(nav.groups[0].indicator_obj.is_none());
    }

    // ── Keyboards ────────────────────────────────────────────────────

    #[test]
    fn keyboard_created_once_per_page() {
        let (mut be, mut nav) = setup();
        let page = nav.pages[0].widget;
        let input = be.create(NativeKind::TextArea, Some(page));
        assert_eq!(nav.page_containing(&be, input), Some(page));
        let mut created = 0;
        let kb = nav.keyboard(&mut be, page, |_| created += 1);
        let again = nav.keyboard(&mut be, page, |_| created += 1);
        assert_eq!(kb, again);
        assert_eq!(created, 1);
        assert_eq!(be.rect(kb).size(), Size::new(480, 128));
        assert_eq!(be.rect(kb).y, 320 - 128);
    }

    // ── Z-order ──────────────────────────────────────────────────────

    #[test]
    fn z_order_sorts_siblings() {
        let mut be = HeadlessBackend::new(100, 100);
        let mut els = Elements::new();
        let mut ids = Vec::new();
        for (name, z) in [("a", 2), ("b", -1), ("c", 0), ("d", -2), ("e", 1)] {
            let w = be.create(NativeKind::Label, None);
            ids.push(w);
            els.push(Element::new(name, WidgetKind::Label, w).with_z_index(z));
        }
        apply_z_order(&mut be, &els);
        let order: Vec<usize> = be
            .children(be.screen())
            .iter()
            .map(|w| ids.iter().position(|i| i == w).unwrap())
            .collect();
        // d(-2) b(-1) c(0) e(1) a(2)
        assert_eq!(order, vec![3, 1, 2, 4, 0]);
    }
}
