use conflux::Timer;
use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn dispatches_in_deadline_order_with_reasonable_accuracy() {
    const N: usize = 50;
    let timer = Timer::global();
    let recorded: Arc<(Mutex<HashMap<usize, Instant>>, Condvar)> =
        Arc::new((Mutex::new(HashMap::new()), Condvar::new()));

    let baseline = timer.now();

    // Schedule latest-first so the dispatch thread has to keep re-sorting.
    for i in (0..N).rev() {
        let recorded = recorded.clone();
        timer.schedule(baseline + Duration::from_millis(i as u64 * 5), move || {
            let (times, cond) = &*recorded;
            let mut times = times.lock().unwrap();
            times.insert(i, Instant::now());
            if times.len() == N {
                cond.notify_one();
            }
        });
    }

    let (times, cond) = &*recorded;
    let mut times = times.lock().unwrap();
    while times.len() != N {
        times = cond.wait(times).unwrap();
    }

    // Timing accuracy in a general purpose test is inherently flaky, so
    // average the error over a large number of jobs instead of bounding
    // any single one.
    let mut total_error_micros: u128 = 0;
    for i in 0..N {
        let expected = baseline + Duration::from_millis(i as u64 * 5);
        let actual = times[&i];
        let error = if actual > expected {
            actual - expected
        } else {
            expected - actual
        };
        total_error_micros += error.as_micros();
    }
    let average_error_micros = total_error_micros / N as u128;
    assert!(
        average_error_micros < 1000,
        "average dispatch error was {}us",
        average_error_micros
    );
}

#[test]
fn past_deadlines_run_immediately() {
    let timer = Timer::global();
    let called = Arc::new((Mutex::new(false), Condvar::new()));

    let signal = called.clone();
    timer.schedule(timer.now() - Duration::from_millis(1000), move || {
        let (flag, cond) = &*signal;
        *flag.lock().unwrap() = true;
        cond.notify_one();
    });

    let (flag, cond) = &*called;
    let mut done = flag.lock().unwrap();
    while !*done {
        done = cond.wait(done).unwrap();
    }
}

#[test]
fn now_deadlines_run_immediately() {
    let timer = Timer::global();
    let called = Arc::new((Mutex::new(false), Condvar::new()));

    let signal = called.clone();
    timer.schedule(timer.now(), move || {
        let (flag, cond) = &*signal;
        *flag.lock().unwrap() = true;
        cond.notify_one();
    });

    let (flag, cond) = &*called;
    let mut done = flag.lock().unwrap();
    while !*done {
        done = cond.wait(done).unwrap();
    }
}

#[test]
fn each_execution_fires_exactly_once() {
    let interval = Duration::from_millis(1);
    let timer = Timer::global();
    let calls = Arc::new((Mutex::new(0usize), Condvar::new()));

    let signal = calls.clone();
    timer.schedule(timer.now() + interval, move || {
        let (count, cond) = &*signal;
        *count.lock().unwrap() += 1;
        cond.notify_one();
    });

    {
        let (count, cond) = &*calls;
        let mut count = count.lock().unwrap();
        while *count == 0 {
            count = cond.wait(count).unwrap();
        }
        assert_eq!(*count, 1);
    }

    thread::sleep(interval * 10);

    let (count, _) = &*calls;
    assert_eq!(*count.lock().unwrap(), 1);
}

#[test]
fn cancel_removes_one_pending_execution() {
    let timer = Timer::global();
    let called_first = Arc::new(Mutex::new(false));
    let called_second = Arc::new((Mutex::new(false), Condvar::new()));

    let first = called_first.clone();
    let cancelled = timer.schedule(timer.now() + Duration::from_millis(50), move || {
        *first.lock().unwrap() = true;
    });

    let second = called_second.clone();
    timer.schedule(timer.now() + Duration::from_millis(50), move || {
        let (flag, cond) = &*second;
        *flag.lock().unwrap() = true;
        cond.notify_one();
    });

    assert!(timer.cancel(cancelled));
    assert!(!timer.cancel(cancelled), "second cancel should find nothing");

    let (flag, cond) = &*called_second;
    let mut done = flag.lock().unwrap();
    while !*done {
        done = cond.wait(done).unwrap();
    }
    drop(done);

    thread::sleep(Duration::from_millis(20));
    assert!(!*called_first.lock().unwrap());
}

#[test]
fn private_timer_shuts_down_on_drop() {
    let timer = Timer::new();
    let called = Arc::new((Mutex::new(false), Condvar::new()));

    let signal = called.clone();
    timer.schedule(timer.now(), move || {
        let (flag, cond) = &*signal;
        *flag.lock().unwrap() = true;
        cond.notify_one();
    });

    let (flag, cond) = &*called;
    let mut done = flag.lock().unwrap();
    while !*done {
        done = cond.wait(done).unwrap();
    }
    drop(done);

    // Entries still pending at drop are discarded without running.
    let leaked = Arc::new(Mutex::new(false));
    let flag = leaked.clone();
    timer.schedule(
        timer.now() + Duration::from_secs(3600),
        move || *flag.lock().unwrap() = true,
    );
    drop(timer);
    assert!(!*leaked.lock().unwrap());
}
