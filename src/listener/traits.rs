use std::sync::Arc;

/// Process-wide factory for lifecycle listeners.
///
/// Installed once via [`LifecycleListenerManager::set`]; the runtime calls
/// it whenever an event queue or a promise is created. Identifiers are the
/// arbitrary strings supplied at creation and exist only so implementations
/// can filter the objects they care about.
///
/// [`LifecycleListenerManager::set`]: super::LifecycleListenerManager::set
pub trait LifecycleListener: Send + Sync {
    /// Called for every event queue created. Return `None` to leave the
    /// queue uninstrumented.
    fn on_event_queue_created(&self, id: &str) -> Option<Arc<dyn EventQueueListener>>;

    /// Called for every promise control block created. Return `None` to
    /// leave the promise uninstrumented.
    fn on_promise_created(&self, id: &str) -> Option<Arc<dyn PromiseListener>>;
}

/// Observer attached to one event queue.
pub trait EventQueueListener: Send + Sync {
    /// Called under the queue lock when a task is appended. The returned
    /// listener, if any, follows that single event through its lifecycle.
    fn on_event_enqueued(&self, id: &str) -> Option<Arc<dyn EventListener>>;

    /// Called under the queue lock when a task is removed for execution.
    fn on_event_dequeued(&self, id: &str);
}

/// Observer attached to one enqueued event.
///
/// `on_enqueued` and `on_dequeued` fire under the queue lock; `on_started`
/// and `on_completed` bracket the task body on the worker thread.
pub trait EventListener: Send + Sync {
    fn on_enqueued(&self);
    fn on_dequeued(&self);
    fn on_started(&self);
    fn on_completed(&self);
}

/// Observer attached to one promise.
pub trait PromiseListener: Send + Sync {
    /// Called when the promise is resolved.
    fn on_resolved(&self);
}
