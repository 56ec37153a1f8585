//! Helpers for threads outside the runtime.
//!
//! Worker threads must never block on each other, but ordinary threads
//! (a `main`, a test) often want to wait for a promise or a stream. The
//! helpers here bridge that gap by spinning up a short-lived private queue
//! and blocking the calling thread on it.
//!
//! Every function in this module panics if called from an event queue
//! worker; blocking a worker would stall its whole queue.

use crate::promise::Promise;
use crate::queue::EventQueue;
use crate::stream::{Publication, Subscription};

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// Blocks the calling thread until `promise` resolves and returns its
/// value.
///
/// If the promise is never resolved this never returns.
///
/// # Panics
///
/// Panics if called from an event queue worker.
pub fn get<T>(promise: Promise<T>) -> T
where
    T: Send + Clone + 'static,
{
    assert!(
        EventQueue::current().is_none(),
        "blocking::get must not be called from an event queue worker"
    );

    let queue = EventQueue::new();
    let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));

    let out = Arc::clone(&slot);
    queue.enqueue(move || {
        promise.then(move |value| {
            *out.lock() = Some(value);
        });
    });

    queue.finish();
    queue.join();

    let value = slot.lock().take();
    value.expect("promise resolved but no value was captured")
}

/// Blocks the calling thread until the promise produced by `f` resolves.
///
/// `f` itself runs on a short-lived private queue, so it may freely use
/// current-queue operations such as [`Promise::then`].
///
/// # Panics
///
/// Panics if called from an event queue worker.
pub fn get_with<T, F>(f: F) -> T
where
    F: FnOnce() -> Promise<T> + Send + 'static,
    T: Send + Clone + 'static,
{
    assert!(
        EventQueue::current().is_none(),
        "blocking::get_with must not be called from an event queue worker"
    );

    let queue = EventQueue::new();
    let slot: Arc<Mutex<Option<T>>> = Arc::new(Mutex::new(None));

    let out = Arc::clone(&slot);
    queue.enqueue(move || {
        f().then(move |value| {
            *out.lock() = Some(value);
        });
    });

    queue.finish();
    queue.join();

    let value = slot.lock().take();
    value.expect("promise resolved but no value was captured")
}

/// Subscribes to `publication` on a private queue and blocks the calling
/// thread until `listener` returns `false`, then unsubscribes and returns.
///
/// The listener runs on the private queue, one value at a time, in publish
/// order.
///
/// # Panics
///
/// Panics if called from an event queue worker.
pub fn subscribe_and_wait<T, F>(publication: Publication<T>, mut listener: F)
where
    F: FnMut(T) -> bool + Send + 'static,
    T: Send + Clone + 'static,
{
    assert!(
        EventQueue::current().is_none(),
        "blocking::subscribe_and_wait must not be called from an event queue worker"
    );

    let queue = EventQueue::new();
    let stopped = Arc::new((Mutex::new(false), Condvar::new()));
    let slot: Arc<Mutex<Option<Subscription<T>>>> = Arc::new(Mutex::new(None));

    let signal = Arc::clone(&stopped);
    let task_slot = Arc::clone(&slot);
    queue.enqueue(move || {
        let listener_slot = Arc::clone(&task_slot);
        let subscription = publication.subscribe(move |value| {
            if !listener(value) {
                if let Some(active) = listener_slot.lock().take() {
                    active.unsubscribe();
                }
                let (flag, cond) = &*signal;
                *flag.lock() = true;
                cond.notify_one();
            }
        });
        *task_slot.lock() = Some(subscription);
    });

    let (flag, cond) = &*stopped;
    let mut done = flag.lock();
    while !*done {
        cond.wait(&mut done);
    }
    drop(done);

    queue.finish();
    queue.join();
}
