//! Error type for engine operations.
//!
//! Nothing in the pipeline is fatal: parse problems are recovered silently,
//! and every `Err` here describes a lookup miss or a single element that
//! could not be created. Callers that only care about success can treat an
//! `Err` as "no state change happened".

/// Errors returned by [`Engine`](crate::app::Engine) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    #[error("no widget with id `{0}`")]
    UnknownWidget(String),
    #[error("no canvas with id `{0}`")]
    UnknownCanvas(String),
    #[error("no page or group named `{0}`")]
    UnknownPage(String),
    #[error("group `{group}` has no page `{page}`")]
    UnknownGroupPage { group: String, page: String },
    #[error("unsupported attribute `{attr}` for widget `{id}`")]
    UnknownAttribute { id: String, attr: String },
    #[error("invalid navigation target `{0}`")]
    InvalidHref(String),
    #[error("canvas buffer of {requested} bytes could not be allocated")]
    CanvasAllocation { requested: usize },
}
