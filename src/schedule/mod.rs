//! Cancellable periodic tasks.
//!
//! A [`Schedule`] is created with
//! [`EventQueue::do_periodically`](crate::EventQueue::do_periodically) and
//! represents the repeated invocation of a client function on its owning
//! queue, paced by the shared [`Timer`](crate::Timer). Firings are
//! anchored to the absolute cadence `start + k * interval`, so a slow
//! invocation does not shift every later one.
//!
//! A schedule ends when the client function votes to stop, when
//! [`Schedule::cancel`] is called, or when the last handle is dropped;
//! in every case [`Schedule::done`] resolves exactly once.

mod control;
mod core;

#[doc(inline)]
pub use core::Schedule;

pub(crate) use control::{ScheduleCancelTrigger, ScheduleControlBlock};
