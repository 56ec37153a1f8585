//! The shared deadline timer.
//!
//! One [`Timer`] owns one dispatch thread that runs scheduled callbacks
//! when their deadline arrives. The process-wide instance behind
//! [`Timer::global`] drives every [`Schedule`](crate::Schedule); private
//! instances can be created for tests and are shut down on drop.
//!
//! Callbacks run on the dispatch thread with no timer lock held, so
//! [`schedule`](Timer::schedule) and [`cancel`](Timer::cancel) never block
//! behind a running callback.

mod core;

#[doc(inline)]
pub use core::Timer;
