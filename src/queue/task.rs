use crate::listener::EventListener;

use std::sync::Arc;

/// A unit of work queued on an [`EventQueue`](super::EventQueue).
///
/// Constructed when the work is enqueued and consumed by the worker after
/// the thunk returns.
pub(crate) struct Task {
    /// Identifier supplied at enqueue time, used only for observability.
    pub(crate) id: String,

    /// Per-event lifecycle listener, if the queue listener asked for one.
    pub(crate) listener: Option<Arc<dyn EventListener>>,

    /// The work itself.
    pub(crate) thunk: Box<dyn FnOnce() + Send>,
}
