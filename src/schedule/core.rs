use super::control::ScheduleCancelTrigger;
use crate::promise::Promise;

use std::sync::Arc;

/// Handle to a periodic task created with
/// [`EventQueue::do_periodically`](crate::EventQueue::do_periodically).
///
/// Cloneable; clones control the same underlying schedule. When the last
/// handle is dropped the schedule is cancelled, so keep a `Schedule` alive
/// for as long as the periodic work should keep running.
pub struct Schedule {
    trigger: Arc<ScheduleCancelTrigger>,
    done: Promise<()>,
}

impl Clone for Schedule {
    fn clone(&self) -> Self {
        Self {
            trigger: Arc::clone(&self.trigger),
            done: self.done.clone(),
        }
    }
}

impl Schedule {
    pub(crate) fn new(trigger: Arc<ScheduleCancelTrigger>, done: Promise<()>) -> Self {
        Self { trigger, done }
    }

    /// A promise that resolves exactly once when the schedule terminates,
    /// whether by a terminal `false` vote or by cancellation.
    pub fn done(&self) -> Promise<()> {
        self.done.clone()
    }

    /// Requests termination.
    ///
    /// Idempotent and safe from any thread. At most one firing body that
    /// was already enqueued may still run after this returns; it observes
    /// the cancellation and exits without invoking the client function.
    pub fn cancel(&self) {
        self.trigger.cancel();
    }
}
