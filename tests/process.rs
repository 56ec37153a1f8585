use conflux::{Process, Promise};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

/// A process that produces `previous + 1` on demand.
struct IntegerSource {
    process: Process,
}

impl IntegerSource {
    fn new() -> Self {
        Self {
            process: Process::with_id("integer-source"),
        }
    }

    fn get_next(&self, previous: Promise<i32>) -> Promise<i32> {
        self.process.enqueue_with_resolver(move |resolver| {
            previous.then(move |k| resolver.resolve(k + 1));
        })
    }

    fn shutdown(&self) {
        self.process.finish();
        self.process.join();
    }
}

#[test]
fn two_processes_chain_one_hundred_increments() {
    let source = IntegerSource::new();
    let driver = Process::with_id("driver");
    let result = Arc::new(AtomicI32::new(-1));

    let (seed, resolver) = Process::create_resolver::<i32>();
    let mut promise = seed;
    for _ in 0..100 {
        promise = source.get_next(promise);
    }

    let out = result.clone();
    promise.then_on(driver.queue(), move |k| out.store(k, Ordering::SeqCst));
    resolver.resolve(0);

    driver.finish();
    driver.join();
    source.shutdown();

    assert_eq!(result.load(Ordering::SeqCst), 100);
}

#[test]
fn a_process_runs_periodic_work() {
    let process = Process::with_id("ticker");
    let ticks = Arc::new(AtomicI32::new(0));

    let counter = ticks.clone();
    let schedule = process.do_periodically(
        move || counter.fetch_add(1, Ordering::SeqCst) + 1 != 10,
        std::time::Duration::from_millis(1),
    );
    conflux::blocking::get(schedule.done());
    drop(schedule);

    process.finish();
    process.join();
    assert_eq!(ticks.load(Ordering::SeqCst), 10);
}
