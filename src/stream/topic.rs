use super::publication::Publication;
use super::subscription::SubscriptionControlBlock;
use crate::promise::{Promise, Resolver};
use crate::queue::EventQueue;

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Shared state of one topic: the live subscription list.
pub(crate) struct TopicCore<T> {
    subscriptions: Mutex<Vec<Arc<SubscriptionControlBlock<T>>>>,
}

/// A typed broadcast point.
///
/// Cloneable handle. Values published here are delivered to every current
/// subscriber through that subscriber's own event queue. Consumers
/// subscribe through the [`Publication`] obtained from
/// [`publication`](Self::publication).
pub struct Topic<T> {
    core: Arc<TopicCore<T>>,
}

impl<T> Clone for Topic<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> Topic<T>
where
    T: Send + Clone + 'static,
{
    /// Creates a topic with no subscribers.
    pub fn new() -> Self {
        Self {
            core: Arc::new(TopicCore {
                subscriptions: Mutex::new(Vec::new()),
            }),
        }
    }

    /// The subscribe endpoint for this topic.
    pub fn publication(&self) -> Publication<T> {
        Publication::new(Arc::clone(&self.core))
    }

    /// Broadcasts `value` to every current subscriber.
    ///
    /// One delivery task is enqueued onto each subscription's queue under
    /// the topic lock; a delivery that finds its subscription already
    /// unsubscribed does nothing. The returned promise resolves once every
    /// delivery task has completed (immediately after one queue hop when
    /// there are no subscribers).
    ///
    /// # Panics
    ///
    /// Panics when called from a thread that is not an event queue worker;
    /// the caller's queue carries the completion bookkeeping.
    pub fn publish(&self, value: T) -> Promise<()> {
        let caller = EventQueue::current()
            .expect("Topic::publish must be called from an event queue worker");

        let completions: VecDeque<Promise<()>> = {
            let subscriptions = self.core.subscriptions.lock();
            subscriptions
                .iter()
                .map(|block| SubscriptionControlBlock::deliver(block, value.clone()))
                .collect()
        };
        tracing::trace!(recipients = completions.len(), "published to topic");

        let (published, resolver) = EventQueue::create_resolver();
        resolve_when_recipients_done(&caller, resolver, completions);
        published
    }
}

impl<T> Default for Topic<T>
where
    T: Send + Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TopicCore<T> {
    /// Registers a subscription. Serialised with removes and publishes.
    pub(crate) fn add(&self, block: Arc<SubscriptionControlBlock<T>>) {
        self.subscriptions.lock().push(block);
    }

    /// Removes a subscription registered with [`add`](Self::add). A block
    /// unsubscribes itself at most once, so at most one matching entry
    /// exists.
    pub(crate) fn remove(&self, block: &Arc<SubscriptionControlBlock<T>>) {
        let mut subscriptions = self.subscriptions.lock();
        if let Some(position) = subscriptions
            .iter()
            .position(|candidate| Arc::ptr_eq(candidate, block))
        {
            subscriptions.remove(position);
        }
    }
}

/// Chains the per-recipient completion promises sequentially on the
/// caller's queue, resolving `resolver` once after the last one.
fn resolve_when_recipients_done(
    queue: &EventQueue,
    resolver: Resolver<()>,
    mut remaining: VecDeque<Promise<()>>,
) {
    queue.enqueue(move || match remaining.pop_front() {
        None => resolver.resolve(()),
        Some(next) => {
            next.then(move |_| {
                let queue =
                    EventQueue::current().expect("completion chaining runs on a worker");
                resolve_when_recipients_done(&queue, resolver, remaining);
            });
        }
    });
}
