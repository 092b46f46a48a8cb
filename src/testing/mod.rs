//! Headless testing framework: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive an [`Engine`](crate::app::Engine) over the
//! headless backend and record what it calls on the host. Use
//! [`render_to_string`] to capture a rendered widget tree as text.

pub mod pilot;
pub mod snapshot;

pub use pilot::{HostCall, Pilot, RecordingHost};
pub use snapshot::{render_to_string, tree_to_string};
