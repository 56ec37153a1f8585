use super::EventQueue;
use crate::listener::LifecycleListenerManager;

/// Builder for configuring and creating an [`EventQueue`].
///
/// The only tunable today is the queue identifier, which names the worker
/// thread and is handed to the lifecycle listener (if one is installed).
///
/// # Examples
///
/// ```rust,ignore
/// let queue = EventQueueBuilder::new()
///     .id("ingest")
///     .build();
/// ```
pub struct EventQueueBuilder {
    /// Identifier for the queue; empty by default.
    id: String,
}

impl EventQueueBuilder {
    /// Creates a builder with an empty identifier.
    pub fn new() -> Self {
        Self { id: String::new() }
    }

    /// Sets the queue identifier.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Builds the queue and starts its worker thread.
    ///
    /// If a process-wide lifecycle listener is installed, it is consulted
    /// here; a `None` return leaves the queue uninstrumented.
    pub fn build(self) -> EventQueue {
        let listener = LifecycleListenerManager::get()
            .and_then(|lifecycle| lifecycle.on_event_queue_created(&self.id));
        EventQueue::start(self.id, listener)
    }
}

impl Default for EventQueueBuilder {
    fn default() -> Self {
        Self::new()
    }
}
