use conflux::{EventQueue, Topic, blocking};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[test]
fn get_waits_for_a_promise_from_outside_the_runtime() {
    let queue = EventQueue::new();

    let var = {
        let promise = queue.enqueue(|| 1);
        blocking::get(promise)
    };
    assert_eq!(var, 1);

    queue.finish();
    queue.join();
}

#[test]
fn get_with_evaluates_the_chain_on_a_private_queue() {
    let queue = EventQueue::new();

    let inner = queue.clone();
    let var = blocking::get_with(move || inner.enqueue(|| 1).then(|res| res + 1));
    assert_eq!(var, 2);

    queue.finish();
    queue.join();
}

/// Re-enqueues itself until `stop` is raised, publishing one integer per
/// round.
fn keep_publishing(queue: &EventQueue, topic: &Topic<i32>, stop: &Arc<AtomicBool>, next: i32) {
    let requeue = queue.clone();
    let retopic = topic.clone();
    let restop = stop.clone();
    queue.enqueue(move || {
        if restop.load(Ordering::SeqCst) {
            return;
        }
        retopic.publish(next);
        thread::sleep(Duration::from_millis(1));
        keep_publishing(&requeue, &retopic, &restop, next + 1);
    });
}

#[test]
fn subscribe_and_wait_consumes_a_monotone_stream() {
    let queue = EventQueue::new();
    let topic = Topic::new();
    let stop = Arc::new(AtomicBool::new(false));

    keep_publishing(&queue, &topic, &stop, 0);

    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = received.clone();
    blocking::subscribe_and_wait(topic.publication(), move |k| {
        let mut got = sink.lock().unwrap();
        if got.len() < 5 {
            got.push(k);
            true
        } else {
            false
        }
    });

    stop.store(true, Ordering::SeqCst);
    queue.finish();
    queue.join();

    let got = received.lock().unwrap();
    assert_eq!(got.len(), 5);
    for pair in got.windows(2) {
        assert_eq!(pair[1], pair[0] + 1);
    }
}

#[test]
#[should_panic(expected = "must not be called from an event queue worker")]
fn get_refuses_to_run_on_a_worker() {
    let queue = EventQueue::new();

    // Pull the panic out of the worker by joining it.
    queue.enqueue(|| {
        let promise = EventQueue::create_resolved_promise(1);
        blocking::get(promise);
    });
    queue.finish();
    queue.join();
}
