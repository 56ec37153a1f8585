use super::subscription::{Subscription, SubscriptionControlBlock};
use super::topic::TopicCore;
use crate::queue::EventQueue;

use std::sync::Arc;

/// The subscribe endpoint of a [`Topic`](super::Topic).
///
/// Cloneable; hand clones to consumers so they can subscribe without
/// gaining the ability to publish.
pub struct Publication<T> {
    core: Arc<TopicCore<T>>,
}

impl<T> Clone for Publication<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> Publication<T>
where
    T: Send + Clone + 'static,
{
    pub(crate) fn new(core: Arc<TopicCore<T>>) -> Self {
        Self { core }
    }

    /// Registers `listener` for values published to the topic.
    ///
    /// The calling worker's queue becomes the delivery queue: every value
    /// is handed to `listener` as a task on that queue, in publish order.
    ///
    /// # Panics
    ///
    /// Panics when called from a thread that is not an event queue worker.
    pub fn subscribe<F>(&self, listener: F) -> Subscription<T>
    where
        F: FnMut(T) + Send + 'static,
    {
        self.subscribe_with_id("", listener)
    }

    /// Like [`subscribe`](Self::subscribe), with an identifier for
    /// observability.
    pub fn subscribe_with_id<F>(&self, id: &str, listener: F) -> Subscription<T>
    where
        F: FnMut(T) + Send + 'static,
    {
        let queue = EventQueue::current()
            .expect("Publication::subscribe must be called from an event queue worker");
        let block = Arc::new(SubscriptionControlBlock::new(
            Arc::downgrade(&self.core),
            queue,
            Box::new(listener),
            id.to_owned(),
        ));
        let subscription = Subscription::from_block(Arc::clone(&block));
        self.core.add(block);
        subscription
    }
}
