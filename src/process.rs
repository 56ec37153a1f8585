//! Application-level processes.
//!
//! A [`Process`] binds an identity to one [`EventQueue`] so application
//! state can live behind a single serialised queue. It adds no concurrency
//! semantics of its own; every method is a thin delegation to the queue.

use crate::promise::{Promise, Resolver};
use crate::queue::EventQueue;
use crate::schedule::Schedule;

use std::time::Duration;

/// One event queue wrapped up as an application-level actor.
///
/// Embed a `Process` in a struct, keep that struct's state private, and
/// expose methods that [`enqueue`](Self::enqueue) their work; the queue
/// then serialises all access to the state.
pub struct Process {
    queue: EventQueue,
}

impl Process {
    /// Creates a process over a fresh anonymous queue.
    pub fn new() -> Self {
        Self {
            queue: EventQueue::new(),
        }
    }

    /// Creates a process whose queue carries the given identifier.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            queue: EventQueue::with_id(id),
        }
    }

    /// The underlying queue.
    pub fn queue(&self) -> &EventQueue {
        &self.queue
    }

    /// Submits `f` to the process queue. See [`EventQueue::enqueue`].
    pub fn enqueue<T, F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + Clone + 'static,
    {
        self.queue.enqueue(f)
    }

    /// Submits `init` with the write side of a fresh promise. See
    /// [`EventQueue::enqueue_with_resolver`].
    pub fn enqueue_with_resolver<T, F>(&self, init: F) -> Promise<T>
    where
        F: FnOnce(Resolver<T>) + Send + 'static,
        T: Send + Clone + 'static,
    {
        self.queue.enqueue_with_resolver(init)
    }

    /// Creates a fresh `(promise, resolver)` pair. See
    /// [`EventQueue::create_resolver`].
    pub fn create_resolver<T>() -> (Promise<T>, Resolver<T>)
    where
        T: Send + Clone + 'static,
    {
        EventQueue::create_resolver()
    }

    /// Periodic execution on the process queue. See
    /// [`EventQueue::do_periodically`].
    pub fn do_periodically<F>(&self, f: F, interval: Duration) -> Schedule
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.queue.do_periodically(f, interval)
    }

    /// Periodic execution with an asynchronous body. See
    /// [`EventQueue::do_periodically_deferred`].
    pub fn do_periodically_deferred<F>(&self, f: F, interval: Duration) -> Schedule
    where
        F: FnMut() -> Promise<bool> + Send + 'static,
    {
        self.queue.do_periodically_deferred(f, interval)
    }

    /// Lets the process queue wind down. See [`EventQueue::finish`].
    pub fn finish(&self) {
        self.queue.finish();
    }

    /// Waits for the process queue's worker. See [`EventQueue::join`].
    pub fn join(&self) {
        self.queue.join();
    }
}

impl Default for Process {
    fn default() -> Self {
        Self::new()
    }
}
