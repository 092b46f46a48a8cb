//! Event system: widget events, listeners, routing, host callbacks.
//!
//! The toolkit reports `(widget, EventKind)` pairs. The [`EventRouter`]
//! knows which [`Listener`] each widget was registered with and either hands
//! the pair straight to the engine or queues it as an [`Envelope`] for the
//! next `process_events` call. Listeners carry element indices rather than
//! references, so growing the element registry never invalidates them.

pub mod host;
pub mod router;

use std::fmt;

use crate::widget::ElementIndex;

pub use host::{Host, NullHost};
pub use router::{Envelope, EventRouter};

/// Events the toolkit can report for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Clicked,
    LongPressed,
    ValueChanged,
    Pressed,
    Pressing,
    Released,
    Focused,
    Defocused,
    /// Keyboard "enter".
    Ready,
    /// Keyboard "close".
    Cancel,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Clicked => "clicked",
            EventKind::LongPressed => "long-pressed",
            EventKind::ValueChanged => "value-changed",
            EventKind::Pressed => "pressed",
            EventKind::Pressing => "pressing",
            EventKind::Released => "released",
            EventKind::Focused => "focused",
            EventKind::Defocused => "defocused",
            EventKind::Ready => "ready",
            EventKind::Cancel => "cancel",
        };
        f.write_str(name)
    }
}

/// What should happen when a widget reports an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Listener {
    /// Button or clickable image: `onclick`, `href`, `onhold`.
    Click(ElementIndex),
    Switch(ElementIndex),
    Slider(ElementIndex),
    /// Text area: binding updates, focus and defocus.
    Input(ElementIndex),
    /// Canvas touch: `ondraw`, `ontap`, `onhold` with coordinates.
    Canvas(ElementIndex),
    /// On-screen keyboard: ready/cancel closes it.
    Keyboard,
    /// Tile view of the group at this position: active tile changed.
    TileView(usize),
}
