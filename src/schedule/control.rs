use crate::promise::{Promise, Resolver};
use crate::queue::EventQueue;
use crate::timer::Timer;

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The client function invoked on each firing. Returns a promise whose
/// `true` resolution requests the next firing.
type PeriodicFn = Box<dyn FnMut() -> Promise<bool> + Send>;

/// Mutable schedule state, guarded by the schedule mutex.
///
/// The client function lives inside the state so that a firing body and a
/// concurrent cancel are serialised: once `cancel` has returned, the
/// function can no longer start running.
struct ScheduleState {
    /// Whether the schedule is still live. Cleared exactly once, by the
    /// terminal `false` vote or by cancellation.
    running: bool,

    /// The nominal time of the most recently armed firing. `None` until
    /// the first firing is armed; afterwards advanced by exactly one
    /// interval per firing, independent of how late the timer actually
    /// delivered it.
    scheduled_run_time: Option<Instant>,

    /// The timer execution currently armed, if any. While the schedule is
    /// running at most one execution is registered at a time.
    current_timer: Option<u64>,

    /// The periodic client function.
    f: PeriodicFn,
}

/// Shared state of one periodic schedule.
///
/// Holds one `outstanding` count against the owning queue from
/// construction until the block is dropped, so the queue's worker outlives
/// every firing body even if the queue has already been finished.
pub(crate) struct ScheduleControlBlock {
    state: Mutex<ScheduleState>,

    /// The queue firings are enqueued onto.
    queue: EventQueue,

    /// Spacing between nominal firing times.
    interval: Duration,

    /// Identifier used for observability.
    id: String,

    /// Resolves the schedule's done promise, exactly once.
    done: Resolver<()>,
}

impl ScheduleControlBlock {
    pub(crate) fn new(
        queue: EventQueue,
        f: PeriodicFn,
        interval: Duration,
        id: String,
        done: Resolver<()>,
    ) -> Self {
        queue.take();
        Self {
            state: Mutex::new(ScheduleState {
                running: true,
                scheduled_run_time: None,
                current_timer: None,
                f,
            }),
            queue,
            interval,
            id,
            done,
        }
    }

    /// Arms the first firing, nominally at the current time.
    pub(crate) fn start(this: &Arc<Self>) {
        Self::schedule_next_run(this);
    }

    /// Cancels the armed timer execution, if any, then finishes.
    ///
    /// Safe to call from any thread and idempotent. A firing body that was
    /// already enqueued may still run after this returns, but it observes
    /// `running == false` and exits without invoking the client function.
    pub(crate) fn cancel(&self) {
        {
            let mut state = self.state.lock();
            if let Some(timer_id) = state.current_timer.take() {
                Timer::global().cancel(timer_id);
            }
        }
        self.finish();
    }

    /// Marks the schedule terminated and resolves the done promise.
    /// Idempotent.
    fn finish(&self) {
        let mut state = self.state.lock();
        if state.running {
            state.running = false;
            self.done.resolve(());
            tracing::debug!(id = %self.id, "schedule finished");
        }
    }

    /// Timer-thread entry point for one firing: forget the spent timer id
    /// and move execution onto the owning queue.
    fn on_timer(this: &Arc<Self>) {
        let mut state = this.state.lock();
        state.current_timer = None;
        let block = Arc::clone(this);
        this.queue
            .enqueue_with_id(&this.id, move || Self::run_once(&block));
    }

    /// One firing body, executed as a task on the owning queue.
    ///
    /// The `running` check and the client function call are serialised
    /// with `cancel` by the schedule mutex: either `cancel` acquires it
    /// first and this body does nothing, or the call completes before
    /// `cancel` can return.
    fn run_once(this: &Arc<Self>) {
        let mut state = this.state.lock();
        if !state.running {
            return;
        }
        let vote = (state.f)();
        drop(state);

        let block = Arc::clone(this);
        vote.then(move |keep_running| {
            if keep_running {
                Self::schedule_next_run(&block);
            } else {
                block.finish();
            }
        });
    }

    /// Arms the next firing at the nominal cadence.
    ///
    /// The first firing is anchored at `now`; every later one at the
    /// previous nominal time plus the interval, which prevents drift.
    fn schedule_next_run(this: &Arc<Self>) {
        let mut state = this.state.lock();
        if !state.running {
            return;
        }

        let timer = Timer::global();
        let when = match state.scheduled_run_time {
            None => timer.now(),
            Some(previous) => previous + this.interval,
        };
        state.scheduled_run_time = Some(when);

        let block = Arc::clone(this);
        state.current_timer = Some(timer.schedule(when, move || Self::on_timer(&block)));
    }
}

impl Drop for ScheduleControlBlock {
    /// Balances the queue hold taken at construction.
    fn drop(&mut self) {
        debug_assert!(
            !self.state.get_mut().running,
            "schedule control block dropped while running"
        );
        self.queue.release();
    }
}

/// Cancel capability for one schedule. Dropping the last clone cancels.
pub(crate) struct ScheduleCancelTrigger {
    block: Arc<ScheduleControlBlock>,
}

impl ScheduleCancelTrigger {
    pub(crate) fn new(block: Arc<ScheduleControlBlock>) -> Self {
        Self { block }
    }

    pub(crate) fn cancel(&self) {
        self.block.cancel();
    }
}

impl Drop for ScheduleCancelTrigger {
    fn drop(&mut self) {
        self.block.cancel();
    }
}
