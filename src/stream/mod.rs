//! Broadcast streams.
//!
//! A [`Topic`] is a typed broadcast point. Its [`Publication`] is the
//! subscribe endpoint handed to consumers; each
//! [`subscribe`](Publication::subscribe) captures the calling worker's
//! queue as the delivery queue, so a subscriber's listener always runs on
//! the subscriber's own queue, serialised with the rest of its work.
//!
//! [`publish`](Topic::publish) fans a value out to every current
//! subscriber and returns a promise that resolves once all delivery tasks
//! have completed. Unsubscribing takes effect immediately from the
//! perspective of the subscriber's queue: once
//! [`Subscription::unsubscribe`] returns there, no later publish delivers
//! to that listener, and deliveries already in flight notice and skip it.

mod publication;
mod subscription;
mod topic;

#[doc(inline)]
pub use publication::Publication;

#[doc(inline)]
pub use subscription::Subscription;

#[doc(inline)]
pub use topic::Topic;
