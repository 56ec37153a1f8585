//! Promises and resolvers.
//!
//! A [`Promise`] is a single-assignment handle to a value that some task
//! will eventually produce; a [`Resolver`] is its write-capability dual.
//! Both are cheap cloneable handles over one shared control block.
//!
//! Chaining with [`Promise::then`] registers a continuation that runs on an
//! event queue once the value is available, regardless of whether the value
//! arrives before or after the continuation is attached. Each continuation
//! holds its target queue open across shutdown until the handed-off task
//! has been delivered, so finishing queues in any order never loses work.
//!
//! There is no error channel: a promise either resolves with a value or is
//! silently abandoned when its last handle is dropped.

mod control;
mod core;
mod resolver;

#[doc(inline)]
pub use core::Promise;

#[doc(inline)]
pub use resolver::Resolver;

pub(crate) use control::PromiseControlBlock;

/// Resolves to `()` once every input promise has resolved.
///
/// Inputs may have heterogeneous value types; the values themselves are
/// discarded. Resolution order among the inputs is irrelevant. Each input
/// is chained on the calling thread's current event queue, so this must be
/// invoked from a worker.
///
/// # Examples
///
/// ```rust,ignore
/// let all = conflux::resolve_all!(fetch_a(), fetch_b(), fetch_c());
/// all.then(|_| tracing::info!("all three arrived"));
/// ```
#[macro_export]
macro_rules! resolve_all {
    ($($promise:expr),+ $(,)?) => {{
        let (all_done, resolver) = $crate::EventQueue::create_resolver::<()>();
        let remaining = ::std::sync::Arc::new(::std::sync::atomic::AtomicUsize::new(
            [$($crate::resolve_all!(@unit $promise)),+].len(),
        ));
        $(
            {
                let resolver = resolver.clone();
                let remaining = ::std::sync::Arc::clone(&remaining);
                $promise.then(move |_| {
                    if remaining.fetch_sub(1, ::std::sync::atomic::Ordering::AcqRel) == 1 {
                        resolver.resolve(());
                    }
                });
            }
        )+
        all_done
    }};
    (@unit $promise:expr) => {
        ()
    };
}
