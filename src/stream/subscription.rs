use super::topic::TopicCore;
use crate::promise::Promise;
use crate::queue::EventQueue;

use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Mutable subscription state, guarded by the block mutex.
struct SubscriptionState<T> {
    /// Back-pointer to the topic, taken on unsubscribe. Once it is gone,
    /// no delivery invokes the listener again. Held weakly so ownership
    /// runs strictly trigger → block → topic with no cycle.
    topic: Option<Weak<TopicCore<T>>>,
}

/// Shared state of one registered listener.
pub(crate) struct SubscriptionControlBlock<T> {
    state: Mutex<SubscriptionState<T>>,

    /// The listener closure, behind its own lock so that client code
    /// never runs under the state mutex. Deliveries to one subscription
    /// are serialised by its queue, so this lock is uncontended.
    listener: Mutex<Box<dyn FnMut(T) + Send>>,

    /// The subscriber's queue, captured at subscribe time.
    queue: EventQueue,

    /// Identifier used for observability.
    id: String,
}

impl<T> SubscriptionControlBlock<T> {
    pub(crate) fn new(
        topic: Weak<TopicCore<T>>,
        queue: EventQueue,
        listener: Box<dyn FnMut(T) + Send>,
        id: String,
    ) -> Self {
        Self {
            state: Mutex::new(SubscriptionState { topic: Some(topic) }),
            listener: Mutex::new(listener),
            queue,
            id,
        }
    }

    /// Detaches from the topic. At most one call does anything: the topic
    /// back-pointer is read-and-taken under the block mutex, and the
    /// topic-side removal happens outside it.
    pub(crate) fn unsubscribe(this: &Arc<Self>) {
        let topic = this.state.lock().topic.take();
        if let Some(topic) = topic {
            if let Some(topic) = topic.upgrade() {
                topic.remove(this);
                tracing::trace!(id = %this.id, "unsubscribed from topic");
            }
        }
    }
}

impl<T> SubscriptionControlBlock<T>
where
    T: Send + Clone + 'static,
{
    /// Enqueues one delivery onto the subscriber's queue.
    ///
    /// The delivery task re-checks the topic back-pointer under the block
    /// mutex just before invoking the listener, so a delivery racing with
    /// unsubscribe skips the listener instead of reviving it.
    pub(crate) fn deliver(this: &Arc<Self>, value: T) -> Promise<()> {
        let block = Arc::clone(this);
        this.queue.enqueue_with_id(&this.id, move || {
            {
                let state = block.state.lock();
                if state.topic.is_none() {
                    return;
                }
            }
            let mut listener = block.listener.lock();
            (&mut *listener)(value);
        })
    }
}

/// Unsubscribe capability for one subscription. Dropping the last clone
/// unsubscribes.
pub(crate) struct UnsubscribeTrigger<T> {
    block: Arc<SubscriptionControlBlock<T>>,
}

impl<T> UnsubscribeTrigger<T> {
    fn new(block: Arc<SubscriptionControlBlock<T>>) -> Self {
        Self { block }
    }

    fn unsubscribe(&self) {
        SubscriptionControlBlock::unsubscribe(&self.block);
    }
}

impl<T> Drop for UnsubscribeTrigger<T> {
    fn drop(&mut self) {
        SubscriptionControlBlock::unsubscribe(&self.block);
    }
}

/// Lifetime handle for one registered listener.
///
/// Cloneable; clones share the same registration. Unsubscription happens
/// on the first [`unsubscribe`](Self::unsubscribe) call or when the last
/// clone is dropped, whichever comes first.
///
/// Once `unsubscribe` returns on the subscriber's own queue, later
/// publishes deliver nothing to this listener. From other threads the
/// guarantee is weaker: one delivery already past its unsubscription check
/// may still run.
pub struct Subscription<T> {
    trigger: Arc<UnsubscribeTrigger<T>>,
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        Self {
            trigger: Arc::clone(&self.trigger),
        }
    }
}

impl<T> Subscription<T> {
    pub(crate) fn from_block(block: Arc<SubscriptionControlBlock<T>>) -> Self {
        Self {
            trigger: Arc::new(UnsubscribeTrigger::new(block)),
        }
    }

    /// Detaches the listener from its topic. Idempotent.
    pub fn unsubscribe(&self) {
        self.trigger.unsubscribe();
    }
}
