use super::EventQueue;
use super::context;
use super::core::WorkerStep;

/// The worker loop for one event queue.
///
/// Runs on the queue's dedicated thread. The execution protocol is:
///
/// 1. Pop the head task and run it to completion
/// 2. If the FIFO is empty and the queue is finished with no outstanding
///    handoffs, exit
/// 3. Otherwise wait on the condition variable
///
/// Dequeue-side listener hooks fire under the queue lock; the task body and
/// its `on_started`/`on_completed` bracket run with the lock released.
pub(crate) fn run(queue: EventQueue) {
    context::set_current(Some(queue.clone()));
    tracing::debug!(id = %queue.id(), "event queue worker started");

    let (state, cond) = queue.worker_parts();

    'work: loop {
        let task = {
            let mut state = state.lock();
            loop {
                match state.next_step() {
                    WorkerStep::Run(task) => {
                        if let Some(listener) = &task.listener {
                            listener.on_dequeued();
                        }
                        if let Some(listener) = queue.queue_listener() {
                            listener.on_event_dequeued(&task.id);
                        }
                        break task;
                    }
                    WorkerStep::Exit => break 'work,
                    WorkerStep::Wait => cond.wait(&mut state),
                }
            }
        };

        if let Some(listener) = &task.listener {
            listener.on_started();
        }
        (task.thunk)();
        if let Some(listener) = &task.listener {
            listener.on_completed();
        }
    }

    tracing::debug!(id = %queue.id(), "event queue worker exited");
    context::set_current(None);
}
