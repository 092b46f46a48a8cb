//! Listener registry and event queue.
//!
//! [`EventRouter`] maps widgets to the listeners registered on them and keeps
//! a FIFO of [`Envelope`]s reported by the toolkit but not yet handled.

use std::collections::VecDeque;

use slotmap::SecondaryMap;

use super::{EventKind, Listener};
use crate::backend::WidgetId;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// One reported event waiting to be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope {
    pub widget: WidgetId,
    pub kind: EventKind,
}

impl Envelope {
    pub fn new(widget: WidgetId, kind: EventKind) -> Self {
        Self { widget, kind }
    }
}

// ---------------------------------------------------------------------------
// EventRouter
// ---------------------------------------------------------------------------

/// Listener registry plus pending-event queue.
#[derive(Debug, Default)]
pub struct EventRouter {
    listeners: SecondaryMap<WidgetId, Vec<(EventKind, Listener)>>,
    queue: VecDeque<Envelope>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `kind` events on `widget`.
    pub fn on(&mut self, widget: WidgetId, kind: EventKind, listener: Listener) {
        match self.listeners.get_mut(widget) {
            Some(list) => list.push((kind, listener)),
            None => {
                self.listeners.insert(widget, vec![(kind, listener)]);
            }
        }
    }

    /// Register `listener` for several kinds at once.
    pub fn on_all(&mut self, widget: WidgetId, kinds: &[EventKind], listener: Listener) {
        for &kind in kinds {
            self.on(widget, kind, listener);
        }
    }

    /// Listeners for `kind` on `widget`, in registration order.
    pub fn listeners(&self, widget: WidgetId, kind: EventKind) -> Vec<Listener> {
        self.listeners
            .get(widget)
            .map(|list| {
                list.iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, l)| *l)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether anything listens for `kind` on `widget`.
    pub fn has_listener(&self, widget: WidgetId, kind: EventKind) -> bool {
        self.listeners
            .get(widget)
            .is_some_and(|list| list.iter().any(|(k, _)| *k == kind))
    }

    /// Number of widgets with at least one listener.
    pub fn widget_count(&self) -> usize {
        self.listeners.len()
    }

    /// Enqueue an event for later handling.
    pub fn push(&mut self, envelope: Envelope) {
        self.queue.push_back(envelope);
    }

    /// Drain all pending events.
    pub fn drain(&mut self) -> Vec<Envelope> {
        self.queue.drain(..).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Forget every listener and pending event.
    pub fn clear(&mut self) {
        self.listeners.clear();
        self.queue.clear();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
