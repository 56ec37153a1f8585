use super::builder::EventQueueBuilder;
use super::context;
use super::task::Task;
use crate::listener::EventQueueListener;
use crate::promise::{Promise, PromiseControlBlock, Resolver};
use crate::schedule::{Schedule, ScheduleCancelTrigger, ScheduleControlBlock};

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Mutable queue state, guarded by the queue mutex.
pub(crate) struct QueueState {
    /// Pending tasks in submission order.
    tasks: VecDeque<Task>,

    /// Cleared by [`EventQueue::finish`]. While `true`, the worker waits
    /// for more work instead of exiting when the FIFO drains.
    running: bool,

    /// Number of in-flight cross-queue handoffs targeting this queue.
    ///
    /// Each promise continuation registered against this queue holds one
    /// count from registration until its task has been enqueued, which
    /// keeps the worker alive across [`EventQueue::finish`].
    outstanding: usize,
}

/// State shared between every handle to one event queue and its worker.
pub(crate) struct QueueCore {
    /// Queue mutex; the only lock in the worker protocol.
    state: Mutex<QueueState>,

    /// Wakes the worker on new tasks, `finish`, and outstanding releases.
    cond: Condvar,

    /// Worker thread handle, consumed by the first `join`.
    worker: Mutex<Option<JoinHandle<()>>>,

    /// Queue-level lifecycle listener, if one was requested.
    listener: Option<Arc<dyn EventQueueListener>>,

    /// Identifier used for observability and as the worker thread name.
    id: String,
}

/// A single-consumer task queue with one dedicated worker thread.
///
/// `EventQueue` is a cheap cloneable handle; all clones refer to the same
/// worker. The queue is created running. Call [`finish`](Self::finish) to
/// let the worker exit once its backlog (and every outstanding handoff)
/// has drained, then [`join`](Self::join) to wait for it.
///
/// # Examples
///
/// ```rust,ignore
/// let queue = EventQueue::new();
/// let answer = queue.enqueue(|| 6 * 7);
/// answer.then_on(&queue, |n| assert_eq!(n, 42));
/// queue.finish();
/// queue.join();
/// ```
pub struct EventQueue {
    core: Arc<QueueCore>,
}

impl Clone for EventQueue {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl EventQueue {
    /// Creates a queue with an empty identifier and starts its worker.
    pub fn new() -> Self {
        EventQueueBuilder::new().build()
    }

    /// Creates a queue with the given identifier and starts its worker.
    pub fn with_id(id: impl Into<String>) -> Self {
        EventQueueBuilder::new().id(id).build()
    }

    /// Builds the shared core and spawns the worker thread.
    pub(crate) fn start(id: String, listener: Option<Arc<dyn EventQueueListener>>) -> Self {
        let core = Arc::new(QueueCore {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                running: true,
                outstanding: 0,
            }),
            cond: Condvar::new(),
            worker: Mutex::new(None),
            listener,
            id,
        });

        let queue = EventQueue { core };

        let worker_queue = queue.clone();
        let thread_name = if queue.core.id.is_empty() {
            "event-queue".to_owned()
        } else {
            queue.core.id.clone()
        };

        let handle = std::thread::Builder::new()
            .name(thread_name)
            .spawn(move || super::worker::run(worker_queue))
            .expect("failed to spawn event queue worker thread");

        *queue.core.worker.lock() = Some(handle);

        queue
    }

    /// Returns the queue owning the current thread, or `None` when called
    /// from a thread that is not an event queue worker.
    pub fn current() -> Option<EventQueue> {
        context::current()
    }

    /// Returns this queue's identifier.
    pub fn id(&self) -> &str {
        &self.core.id
    }

    /// Submits `f` and returns a promise for its result.
    ///
    /// The task runs after every task already in the queue. This never
    /// blocks on the worker.
    pub fn enqueue<T, F>(&self, f: F) -> Promise<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + Clone + 'static,
    {
        self.enqueue_with_id("", f)
    }

    /// Like [`enqueue`](Self::enqueue), with an identifier for
    /// observability. The identifier names both the queued event and the
    /// returned promise.
    pub fn enqueue_with_id<T, F>(&self, id: &str, f: F) -> Promise<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + Clone + 'static,
    {
        let block = Arc::new(PromiseControlBlock::new(id));
        let resolver = Resolver::from_block(Arc::clone(&block));
        self.add_task(id, Box::new(move || resolver.resolve(f())));
        Promise::from_block(block)
    }

    /// Creates a fresh `(promise, resolver)` pair over a new control block.
    ///
    /// The pair is not bound to any queue; the resolver may be invoked from
    /// anywhere.
    pub fn create_resolver<T>() -> (Promise<T>, Resolver<T>)
    where
        T: Send + Clone + 'static,
    {
        Self::create_resolver_with_id("")
    }

    /// Like [`create_resolver`](Self::create_resolver), with an identifier
    /// for observability.
    pub fn create_resolver_with_id<T>(id: &str) -> (Promise<T>, Resolver<T>)
    where
        T: Send + Clone + 'static,
    {
        let block = Arc::new(PromiseControlBlock::new(id));
        (
            Promise::from_block(Arc::clone(&block)),
            Resolver::from_block(block),
        )
    }

    /// Returns a promise that is already resolved with `value`.
    pub fn create_resolved_promise<T>(value: T) -> Promise<T>
    where
        T: Send + Clone + 'static,
    {
        let (promise, resolver) = Self::create_resolver();
        resolver.resolve(value);
        promise
    }

    /// Submits `init`, handing it the write side of a fresh promise.
    ///
    /// The returned promise resolves only once some path inside `init`
    /// (directly or transitively) calls [`Resolver::resolve`]; an
    /// initialiser that drops the resolver leaves the promise forever
    /// unresolved.
    pub fn enqueue_with_resolver<T, F>(&self, init: F) -> Promise<T>
    where
        F: FnOnce(Resolver<T>) + Send + 'static,
        T: Send + Clone + 'static,
    {
        self.enqueue_with_resolver_and_id("", init)
    }

    /// Like [`enqueue_with_resolver`](Self::enqueue_with_resolver), with an
    /// identifier for observability.
    pub fn enqueue_with_resolver_and_id<T, F>(&self, id: &str, init: F) -> Promise<T>
    where
        F: FnOnce(Resolver<T>) + Send + 'static,
        T: Send + Clone + 'static,
    {
        let (promise, resolver) = Self::create_resolver_with_id(id);
        self.add_task(id, Box::new(move || init(resolver)));
        promise
    }

    /// Runs `f` on this queue every `interval`, starting immediately.
    ///
    /// Firings are anchored to the originally intended cadence: the k-th
    /// invocation is nominally scheduled at `start + k * interval`
    /// regardless of how long each invocation takes. The schedule stops
    /// when `f` returns `false` or when it is cancelled, whichever comes
    /// first; either way [`Schedule::done`] resolves exactly once.
    pub fn do_periodically<F>(&self, f: F, interval: Duration) -> Schedule
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.do_periodically_with_id("", f, interval)
    }

    /// Like [`do_periodically`](Self::do_periodically), with an identifier
    /// for observability.
    pub fn do_periodically_with_id<F>(&self, id: &str, mut f: F, interval: Duration) -> Schedule
    where
        F: FnMut() -> bool + Send + 'static,
    {
        self.do_periodically_deferred_with_id(
            id,
            move || {
                let (promise, resolver) = Self::create_resolver();
                resolver.resolve(f());
                promise
            },
            interval,
        )
    }

    /// Periodic execution whose body finishes asynchronously.
    ///
    /// `f` returns a `Promise<bool>`; the next firing is armed only after
    /// that promise resolves, with `true` meaning "continue".
    pub fn do_periodically_deferred<F>(&self, f: F, interval: Duration) -> Schedule
    where
        F: FnMut() -> Promise<bool> + Send + 'static,
    {
        self.do_periodically_deferred_with_id("", f, interval)
    }

    /// Like [`do_periodically_deferred`](Self::do_periodically_deferred),
    /// with an identifier for observability.
    pub fn do_periodically_deferred_with_id<F>(
        &self,
        id: &str,
        f: F,
        interval: Duration,
    ) -> Schedule
    where
        F: FnMut() -> Promise<bool> + Send + 'static,
    {
        let (done, done_resolver) = Self::create_resolver();
        let block = Arc::new(ScheduleControlBlock::new(
            self.clone(),
            Box::new(f),
            interval,
            id.to_owned(),
            done_resolver,
        ));
        let trigger = Arc::new(ScheduleCancelTrigger::new(Arc::clone(&block)));
        ScheduleControlBlock::start(&block);
        Schedule::new(trigger, done)
    }

    /// Stops the queue's intake of new program phases.
    ///
    /// The worker exits once the FIFO is empty and no cross-queue handoff
    /// is outstanding. Tasks enqueued before the worker exits still run.
    /// Idempotent; never blocks.
    pub fn finish(&self) {
        let mut state = self.core.state.lock();
        state.running = false;
        self.core.cond.notify_one();
        tracing::trace!(id = %self.core.id, "event queue finishing");
    }

    /// Blocks until the worker thread has exited.
    ///
    /// Every caller, including concurrent ones, returns only once the
    /// worker is gone; the first call does the joining and later calls
    /// return immediately.
    ///
    /// # Panics
    ///
    /// Panics if called from this queue's own worker thread, or if the
    /// worker itself panicked.
    pub fn join(&self) {
        if let Some(current) = EventQueue::current() {
            assert!(
                !Arc::ptr_eq(&current.core, &self.core),
                "an event queue cannot be joined from its own worker thread"
            );
        }

        // Hold the lock across the join itself so a concurrent caller
        // cannot see the handle gone before the worker has exited.
        let mut worker = self.core.worker.lock();
        if let Some(handle) = worker.take() {
            if let Err(panic) = handle.join() {
                std::panic::resume_unwind(panic);
            }
        }
    }

    /// Appends a task and wakes the worker. Fires the enqueue-side
    /// listener hooks under the queue lock.
    pub(crate) fn add_task(&self, id: &str, thunk: Box<dyn FnOnce() + Send>) {
        let mut state = self.core.state.lock();

        let listener = self
            .core
            .listener
            .as_ref()
            .and_then(|queue_listener| queue_listener.on_event_enqueued(id));
        if let Some(listener) = &listener {
            listener.on_enqueued();
        }

        state.tasks.push_back(Task {
            id: id.to_owned(),
            listener,
            thunk,
        });
        self.core.cond.notify_one();
    }

    /// Registers one in-flight cross-queue handoff against this queue.
    pub(crate) fn take(&self) {
        self.core.state.lock().outstanding += 1;
    }

    /// Releases a handoff registered with [`take`](Self::take) and wakes
    /// the worker so it can re-evaluate its exit condition.
    pub(crate) fn release(&self) {
        let mut state = self.core.state.lock();
        state.outstanding -= 1;
        self.core.cond.notify_one();
    }

    /// Worker-side access to the shared state. See [`worker::run`].
    ///
    /// [`worker::run`]: super::worker::run
    pub(crate) fn worker_parts(&self) -> (&Mutex<QueueState>, &Condvar) {
        (&self.core.state, &self.core.cond)
    }

    /// The queue-level listener, consulted by the worker on dequeue.
    pub(crate) fn queue_listener(&self) -> Option<&Arc<dyn EventQueueListener>> {
        self.core.listener.as_ref()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// One decision of the worker loop, taken under the queue lock.
pub(crate) enum WorkerStep {
    /// Run this task next.
    Run(Task),

    /// The queue is finished, drained, and owes no handoffs.
    Exit,

    /// Nothing to do yet; wait on the condition variable.
    Wait,
}

impl QueueState {
    /// Decides the worker's next step.
    pub(crate) fn next_step(&mut self) -> WorkerStep {
        match self.tasks.pop_front() {
            Some(task) => WorkerStep::Run(task),
            None if !self.running && self.outstanding == 0 => WorkerStep::Exit,
            None => WorkerStep::Wait,
        }
    }
}
