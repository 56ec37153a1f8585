use crate::listener::{LifecycleListenerManager, PromiseListener};
use crate::queue::EventQueue;

use parking_lot::Mutex;
use std::sync::Arc;

/// Dependents registered against a promise, each invoked exactly once with
/// its own copy of the resolved value.
type Dependent<T> = Box<dyn FnOnce(T) + Send>;

/// Mutable promise state, guarded by the control block mutex.
struct PromiseState<T> {
    /// The resolved value. Single-assignment; permanent once set.
    result: Option<T>,

    /// Continuations waiting for the value, in registration order.
    dependents: Vec<Dependent<T>>,
}

/// The shared cell behind a `(Promise, Resolver)` pair.
///
/// All synchronisation for one promise goes through the single mutex here.
/// Dependents run only light bookkeeping under that mutex: a registered
/// continuation does nothing but enqueue the client closure onto its target
/// queue; the client code itself runs later, on that queue's worker.
pub(crate) struct PromiseControlBlock<T> {
    state: Mutex<PromiseState<T>>,

    /// Promise-level lifecycle listener, if one was requested at creation.
    listener: Option<Arc<dyn PromiseListener>>,
}

impl<T> PromiseControlBlock<T>
where
    T: Send + Clone + 'static,
{
    pub(crate) fn new(id: &str) -> Self {
        let listener = LifecycleListenerManager::get()
            .and_then(|lifecycle| lifecycle.on_promise_created(id));
        Self {
            state: Mutex::new(PromiseState {
                result: None,
                dependents: Vec::new(),
            }),
            listener,
        }
    }

    /// Stores the value and notifies every pending dependent.
    ///
    /// # Panics
    ///
    /// Panics if the promise was already resolved.
    pub(crate) fn resolve(&self, value: T) {
        let mut state = self.state.lock();
        assert!(
            state.result.is_none(),
            "a promise may be resolved at most once"
        );
        state.result = Some(value);
        notify_dependents(&mut state);
        if let Some(listener) = &self.listener {
            listener.on_resolved();
        }
    }

    /// Registers a continuation that will enqueue `f` onto `queue` when the
    /// value is available.
    ///
    /// The queue hold (`take`) is acquired before the control block mutex
    /// is released, and the matching `release` is the last thing the
    /// downstream task does. For each `then` exactly one `take`/`release`
    /// pair is accounted to `queue`, covering the interval from
    /// registration until the downstream task has run. If the promise is
    /// already resolved, the dependent fires synchronously before this
    /// method returns.
    pub(crate) fn then<Y, F>(
        &self,
        queue: &EventQueue,
        id: &str,
        f: F,
    ) -> Arc<PromiseControlBlock<Y>>
    where
        Y: Send + Clone + 'static,
        F: FnOnce(T) -> Y + Send + 'static,
    {
        let mut state = self.state.lock();

        let downstream = Arc::new(PromiseControlBlock::<Y>::new(id));
        let resolver = crate::promise::Resolver::from_block(Arc::clone(&downstream));

        let target = queue.clone();
        let task_id = id.to_owned();
        state.dependents.push(Box::new(move |value: T| {
            let held = target.clone();
            target.add_task(
                &task_id,
                Box::new(move || {
                    resolver.resolve(f(value));
                    held.release();
                }),
            );
        }));
        queue.take();

        if state.result.is_some() {
            notify_dependents(&mut state);
        }

        downstream
    }
}

/// Invokes and clears every pending dependent with copies of the result.
///
/// Callers must hold the control block mutex and have set the result.
fn notify_dependents<T: Clone>(state: &mut PromiseState<T>) {
    let value = state
        .result
        .clone()
        .expect("dependents notified before resolution");
    for dependent in state.dependents.drain(..) {
        dependent(value.clone());
    }
}
