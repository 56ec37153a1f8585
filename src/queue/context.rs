use super::EventQueue;

use std::cell::RefCell;

thread_local! {
    /// Thread-local handle to the queue whose worker owns the current
    /// thread.
    ///
    /// Set on worker-thread entry and cleared on exit; `None` on every
    /// other thread. This is what lets promise chaining, publishing and
    /// subscribing find "the" queue without explicit parameter passing.
    static CURRENT_QUEUE: RefCell<Option<EventQueue>> = const { RefCell::new(None) };
}

/// Installs the current thread's queue handle for the duration of the
/// worker loop.
pub(crate) fn set_current(queue: Option<EventQueue>) {
    CURRENT_QUEUE.with(|current| *current.borrow_mut() = queue);
}

/// Returns the queue owning the current thread, or `None` on non-worker
/// threads.
pub(crate) fn current() -> Option<EventQueue> {
    CURRENT_QUEUE.with(|current| current.borrow().clone())
}
