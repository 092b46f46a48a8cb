//! Headless widget tree: a slotmap-backed [`Backend`](crate::backend::Backend)
//! used for tests and tooling.

pub mod node;
pub mod tree;

pub use node::WidgetNode;
pub use tree::HeadlessBackend;
