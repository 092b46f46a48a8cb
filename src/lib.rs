//! # markup-ui
//!
//! A declarative, HTML/CSS-like markup renderer for retained-mode widget
//! toolkits on small displays.
//!
//! markup-ui parses app documents (`<app>` with `<state>`, `<style>`,
//! `<script>` and `<ui>` sections), builds native widgets through a small
//! [`Backend`] trait, and keeps them synchronized with a typed variable store
//! through `{var}` templates and two-way bindings.
//!
//! ## Core Systems
//!
//! - **[`markup`]**: Forgiving recursive markup parser and entity decoding
//! - **[`css`]**: CSS-like tokenizer, parser, specificity and cascade
//! - **[`render`]**: Head sections, pages, groups and per-kind widget builders
//! - **[`reactive`]**: Typed variable store, templates, binding updates
//! - **[`navigation`]**: Pages, swipeable groups, keyboards, z-order
//! - **[`event`]**: Toolkit events, listeners, host callbacks
//! - **[`widget`]**: Element registry, canvas buffers, markdown spans
//! - **[`backend`]**: The toolkit abstraction
//! - **[`dom`]**: Slotmap-backed headless backend
//! - **[`app`]**: The [`Engine`] tying everything together
//! - **[`testing`]**: Pilot harness and snapshot helpers
//! - **[`geometry`]**: Offsets, sizes, rectangles, alignment, coordinates

// Foundation
pub mod error;
pub mod geometry;

// Core systems
pub mod css;
pub mod markup;
pub mod reactive;

// Toolkit
pub mod backend;
pub mod dom;

// Widgets and events
pub mod event;
pub mod widget;

// Rendering
pub mod navigation;
pub mod render;

// Engine
pub mod app;

// Test support
pub mod testing;

pub use app::{Engine, EngineConfig};
pub use backend::{Backend, NativeKind, WidgetId};
pub use dom::HeadlessBackend;
pub use error::UiError;
pub use event::{EventKind, Host, NullHost};
pub use reactive::{Store, Value, VarType};
