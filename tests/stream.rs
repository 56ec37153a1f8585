use conflux::{Process, Promise, Publication, Subscription, Topic, blocking};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};

/// A process that owns a topic of consecutive integers.
struct Publisher {
    process: Process,
    numbers: Topic<i32>,
    count: Arc<AtomicI32>,
}

impl Publisher {
    fn new() -> Self {
        Self {
            process: Process::new(),
            numbers: Topic::new(),
            count: Arc::new(AtomicI32::new(0)),
        }
    }

    fn numbers(&self) -> Publication<i32> {
        self.numbers.publication()
    }

    /// Publishes the next integer; the returned promise resolves once
    /// every subscriber has seen it.
    fn publish(&self) -> Promise<()> {
        let topic = self.numbers.clone();
        let count = self.count.clone();
        self.process.enqueue_with_resolver(move |resolver| {
            topic
                .publish(count.fetch_add(1, Ordering::SeqCst))
                .then(move |_| resolver.resolve(()));
        })
    }

    fn shutdown(&self) {
        self.process.finish();
        self.process.join();
    }
}

/// A process that records what it receives from a publisher.
struct Consumer {
    process: Process,
    publication: Publication<i32>,
    received: Arc<Mutex<Vec<i32>>>,
    subscription: Arc<Mutex<Option<Subscription<i32>>>>,
}

impl Consumer {
    fn new(publisher: &Publisher) -> Self {
        Self {
            process: Process::new(),
            publication: publisher.numbers(),
            received: Arc::new(Mutex::new(Vec::new())),
            subscription: Arc::new(Mutex::new(None)),
        }
    }

    fn start_consuming(&self) -> Promise<()> {
        let publication = self.publication.clone();
        let received = self.received.clone();
        let slot = self.subscription.clone();
        self.process.enqueue(move || {
            let subscription =
                publication.subscribe(move |k| received.lock().unwrap().push(k));
            *slot.lock().unwrap() = Some(subscription);
        })
    }

    fn stop_consuming(&self) -> Promise<()> {
        let slot = self.subscription.clone();
        self.process.enqueue(move || {
            if let Some(subscription) = slot.lock().unwrap().take() {
                subscription.unsubscribe();
            }
        })
    }

    fn received(&self) -> Vec<i32> {
        self.received.lock().unwrap().clone()
    }

    fn shutdown(&self) {
        self.process.finish();
        self.process.join();
    }
}

#[test]
fn publishing_without_subscribers_delivers_nothing() {
    let publisher = Publisher::new();
    let consumer = Consumer::new(&publisher);

    for _ in 0..10 {
        publisher.publish();
    }

    publisher.shutdown();
    consumer.shutdown();
    assert!(consumer.received().is_empty());
}

#[test]
fn a_subscriber_sees_one_published_value() {
    let publisher = Publisher::new();
    let consumer = Consumer::new(&publisher);

    blocking::get(consumer.start_consuming());
    blocking::get(publisher.publish());
    blocking::get(consumer.stop_consuming());

    publisher.shutdown();
    consumer.shutdown();
    assert_eq!(consumer.received(), vec![0]);
}

#[test]
fn a_subscriber_sees_values_in_publish_order() {
    let publisher = Publisher::new();
    let consumer = Consumer::new(&publisher);

    blocking::get(consumer.start_consuming());
    for _ in 0..11 {
        blocking::get(publisher.publish());
    }
    blocking::get(consumer.stop_consuming());

    publisher.shutdown();
    consumer.shutdown();

    let received = consumer.received();
    assert_eq!(received.len(), 11);
    assert_eq!(received[0], 0);
    assert_eq!(received[10], 10);
}

/// A consumer that unsubscribes from inside its own callback once it sees
/// `bound`.
struct BoundedConsumer {
    process: Process,
    publication: Publication<i32>,
    received: Arc<Mutex<Vec<i32>>>,
    subscription: Arc<Mutex<Option<Subscription<i32>>>>,
    bound: i32,
}

impl BoundedConsumer {
    fn new(publisher: &Publisher, bound: i32) -> Self {
        Self {
            process: Process::new(),
            publication: publisher.numbers(),
            received: Arc::new(Mutex::new(Vec::new())),
            subscription: Arc::new(Mutex::new(None)),
            bound,
        }
    }

    /// Unsubscribes explicitly when the bound arrives.
    fn start_consuming(&self) -> Promise<()> {
        let publication = self.publication.clone();
        let received = self.received.clone();
        let slot = self.subscription.clone();
        let bound = self.bound;
        self.process.enqueue(move || {
            let listener_slot = slot.clone();
            let subscription = publication.subscribe(move |k| {
                if k == bound {
                    if let Some(active) = listener_slot.lock().unwrap().take() {
                        active.unsubscribe();
                    }
                    return;
                }
                received.lock().unwrap().push(k);
            });
            *slot.lock().unwrap() = Some(subscription);
        })
    }

    /// Drops the subscription handle when the bound arrives instead of
    /// calling unsubscribe.
    fn start_consuming_with_drop(&self) -> Promise<()> {
        let publication = self.publication.clone();
        let received = self.received.clone();
        let slot = self.subscription.clone();
        let bound = self.bound;
        self.process.enqueue(move || {
            let listener_slot = slot.clone();
            let subscription = publication.subscribe(move |k| {
                if k == bound {
                    drop(listener_slot.lock().unwrap().take());
                    return;
                }
                received.lock().unwrap().push(k);
            });
            *slot.lock().unwrap() = Some(subscription);
        })
    }

    fn shutdown(&self) {
        self.process.finish();
        self.process.join();
    }
}

#[test]
fn unsubscribe_inside_the_callback_is_immediate() {
    const BOUND: i32 = 512;
    const MESSAGES: i32 = 4096;

    let publisher = Publisher::new();
    let consumer = BoundedConsumer::new(&publisher, BOUND);
    blocking::get(consumer.start_consuming());

    for _ in 0..MESSAGES {
        blocking::get(publisher.publish());
    }

    publisher.shutdown();
    consumer.shutdown();
    assert_eq!(consumer.received.lock().unwrap().len(), BOUND as usize);
}

#[test]
fn dropping_the_subscription_inside_the_callback_unsubscribes() {
    const BOUND: i32 = 512;
    const MESSAGES: i32 = 4096;

    let publisher = Publisher::new();
    let consumer = BoundedConsumer::new(&publisher, BOUND);
    blocking::get(consumer.start_consuming_with_drop());

    for _ in 0..MESSAGES {
        blocking::get(publisher.publish());
    }

    publisher.shutdown();
    consumer.shutdown();
    assert_eq!(consumer.received.lock().unwrap().len(), BOUND as usize);
}
