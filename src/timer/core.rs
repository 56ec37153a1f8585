use parking_lot::{Condvar, Mutex};
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::Instant;

/// A callback scheduled for one future execution.
type TimerCallback = Box<dyn FnOnce() + Send>;

/// Mutable timer state, guarded by the timer mutex.
struct TimerState {
    /// Pending executions, ordered by deadline.
    ///
    /// The id in the key makes same-deadline entries distinct; among
    /// entries sharing a deadline any execution order is acceptable.
    entries: BTreeMap<(Instant, u64), TimerCallback>,

    /// Source of execution ids. Monotonically increasing, never reused.
    next_id: u64,

    /// Cleared on drop to stop the dispatch thread.
    live: bool,
}

/// State shared between the timer handle and its dispatch thread.
struct TimerShared {
    state: Mutex<TimerState>,
    cond: Condvar,
}

/// A monotonic-clock scheduler with a single dispatch thread.
///
/// Most code uses the process-wide instance from [`Timer::global`], which
/// is initialised on first use and lives for the rest of the process.
/// Independent instances exist mainly for tests; dropping one stops and
/// joins its dispatch thread, discarding pending entries.
pub struct Timer {
    shared: Arc<TimerShared>,

    /// Dispatch thread handle, joined on drop.
    thread: Mutex<Option<JoinHandle<()>>>,
}

static GLOBAL_TIMER: OnceLock<Timer> = OnceLock::new();

impl Timer {
    /// Creates an independent timer with its own dispatch thread.
    pub fn new() -> Self {
        let shared = Arc::new(TimerShared {
            state: Mutex::new(TimerState {
                entries: BTreeMap::new(),
                next_id: 0,
                live: true,
            }),
            cond: Condvar::new(),
        });

        let dispatch = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("conflux-timer".to_owned())
            .spawn(move || run(dispatch))
            .expect("failed to spawn timer dispatch thread");

        Self {
            shared,
            thread: Mutex::new(Some(handle)),
        }
    }

    /// Returns the process-wide timer, starting it on first use.
    pub fn global() -> &'static Timer {
        GLOBAL_TIMER.get_or_init(Timer::new)
    }

    /// The current time on the clock this timer schedules against.
    pub fn now(&self) -> Instant {
        Instant::now()
    }

    /// Schedules `f` to run at `when` and returns an id for this one
    /// execution.
    ///
    /// A deadline that is not in the future runs as soon as possible, in
    /// arbitrary order relative to other due entries.
    pub fn schedule(&self, when: Instant, f: impl FnOnce() + Send + 'static) -> u64 {
        let mut state = self.shared.state.lock();
        let id = state.next_id;
        state.next_id += 1;
        state.entries.insert((when, id), Box::new(f));
        self.shared.cond.notify_one();
        tracing::trace!(id, "timer execution scheduled");
        id
    }

    /// Cancels the execution identified by `id`.
    ///
    /// Returns `true` iff the entry was still pending, i.e. the callback
    /// will not run as a result of that schedule. Returns `false` for
    /// unknown ids and for entries that have already been dispatched.
    pub fn cancel(&self, id: u64) -> bool {
        let mut state = self.shared.state.lock();
        let key = state
            .entries
            .keys()
            .find(|(_, entry_id)| *entry_id == id)
            .copied();
        match key {
            Some(key) => {
                state.entries.remove(&key);
                self.shared.cond.notify_one();
                tracing::trace!(id, "timer execution cancelled");
                true
            }
            None => false,
        }
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Timer {
    /// Stops the dispatch thread and joins it. Pending entries are
    /// discarded without running.
    fn drop(&mut self) {
        {
            let mut state = self.shared.state.lock();
            state.live = false;
            self.shared.cond.notify_one();
        }
        if let Some(handle) = self.thread.get_mut().take() {
            let _ = handle.join();
        }
    }
}

/// The dispatch loop.
///
/// Takes the earliest entry; if it is due, removes it and runs it with the
/// lock released, otherwise sleeps until its deadline or until the entry
/// set changes.
fn run(shared: Arc<TimerShared>) {
    loop {
        let mut due: Option<TimerCallback> = None;
        {
            let mut state = shared.state.lock();
            if !state.live {
                break;
            }
            match state.entries.keys().next().copied() {
                None => {
                    shared.cond.wait(&mut state);
                }
                Some((deadline, _)) => {
                    if deadline <= Instant::now() {
                        due = state.entries.pop_first().map(|(_, callback)| callback);
                    } else {
                        shared.cond.wait_until(&mut state, deadline);
                    }
                }
            }
        }

        if let Some(callback) = due {
            callback();
        }
    }
}
