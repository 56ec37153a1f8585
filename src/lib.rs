//! # Conflux
//!
//! **Conflux** is a lightweight concurrency runtime for Rust built around
//! message passing instead of shared mutable state.
//!
//! Programs are structured as a set of [`EventQueue`]s, each backed by one
//! dedicated worker thread that executes submitted tasks strictly in FIFO
//! order. Work submitted to a queue yields a [`Promise`], a single-assignment
//! value that can chain follow-up work onto any queue. On top of these two
//! primitives the crate offers broadcast [`stream`]s (topics with
//! per-subscriber delivery through event queues) and cancellable periodic
//! [`schedule`]s driven by a shared monotonic [`timer`].
//!
//! Conflux favours a small, predictable core:
//!
//! - **One worker per queue.** Tasks on a queue never run concurrently with
//!   each other, so per-queue state needs no locking.
//! - **Promises without an error channel.** A promise is always eventually
//!   resolved with a value, or silently abandoned when its last handle is
//!   dropped.
//! - **Safe shutdown.** A queue that has been told to [`finish`] keeps its
//!   worker alive until every pending cross-queue handoff has landed, so no
//!   continuation is ever lost.
//! - **Drop-to-release lifetimes.** Dropping a [`Subscription`] unsubscribes
//!   it; dropping a [`Schedule`] cancels it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use conflux::EventQueue;
//!
//! let queue = EventQueue::new();
//!
//! let total = queue
//!     .enqueue(|| 40)
//!     .then_on(&queue, |n| n + 2);
//!
//! total.then_on(&queue, |n| assert_eq!(n, 42));
//!
//! queue.finish();
//! queue.join();
//! ```
//!
//! ## Modules
//!
//! - [`queue`] — event queues and their worker protocol
//! - [`promise`] — promises, resolvers, and the [`resolve_all!`] fan-in
//! - [`timer`] — the shared deadline timer service
//! - [`schedule`] — cancellable periodic tasks
//! - [`stream`] — topics, publications, and subscriptions
//! - [`listener`] — optional lifecycle observation hooks
//! - [`process`] — a queue bound to an application identity
//! - [`blocking`] — bridging helpers for threads outside the runtime
//!
//! [`finish`]: EventQueue::finish

pub mod blocking;
pub mod listener;
pub mod process;
pub mod promise;
pub mod queue;
pub mod schedule;
pub mod stream;
pub mod timer;

pub use listener::{
    EventListener, EventQueueListener, LifecycleListener, LifecycleListenerManager,
    PromiseListener,
};
pub use process::Process;
pub use promise::{Promise, Resolver};
pub use queue::{EventQueue, EventQueueBuilder};
pub use schedule::Schedule;
pub use stream::{Publication, Subscription, Topic};
pub use timer::Timer;
