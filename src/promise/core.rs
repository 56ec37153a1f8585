use super::control::PromiseControlBlock;
use crate::queue::EventQueue;

use std::sync::Arc;

/// A single-assignment handle to a value produced by some task.
///
/// Promises are freely cloneable; all clones observe the same resolution.
/// A promise carries no error: it either resolves with a value or, if
/// every handle is dropped first, silently abandons its continuations.
///
/// Chain follow-up work with [`then`](Self::then) (runs on the calling
/// worker's own queue) or [`then_on`](Self::then_on) (runs on an explicit
/// queue). Continuations registered before resolution fire during
/// [`Resolver::resolve`](super::Resolver::resolve); continuations
/// registered afterwards fire immediately. Either way each continuation
/// runs exactly once, as a task on its target queue.
pub struct Promise<T> {
    block: Arc<PromiseControlBlock<T>>,
}

impl<T> Clone for Promise<T> {
    fn clone(&self) -> Self {
        Self {
            block: Arc::clone(&self.block),
        }
    }
}

impl<T> Promise<T>
where
    T: Send + Clone + 'static,
{
    pub(crate) fn from_block(block: Arc<PromiseControlBlock<T>>) -> Self {
        Self { block }
    }

    /// Chains `f` onto the current thread's event queue.
    ///
    /// Equivalent to [`then_on`](Self::then_on) with
    /// [`EventQueue::current`]. To discard the input, take `|_|`; to
    /// produce nothing, return `()`.
    ///
    /// # Panics
    ///
    /// Panics when called from a thread that is not an event queue worker.
    pub fn then<Y, F>(&self, f: F) -> Promise<Y>
    where
        Y: Send + Clone + 'static,
        F: FnOnce(T) -> Y + Send + 'static,
    {
        let queue = EventQueue::current()
            .expect("Promise::then requires an event queue context; use then_on elsewhere");
        self.then_on(&queue, f)
    }

    /// Chains `f` onto `queue`, returning the promise of its result.
    ///
    /// When this promise resolves, a task computing `f(value)` is enqueued
    /// onto `queue` in a single atomic step; `queue` is held open across
    /// [`finish`](EventQueue::finish) until that task has been delivered.
    pub fn then_on<Y, F>(&self, queue: &EventQueue, f: F) -> Promise<Y>
    where
        Y: Send + Clone + 'static,
        F: FnOnce(T) -> Y + Send + 'static,
    {
        Promise::from_block(self.block.then(queue, "", f))
    }
}
