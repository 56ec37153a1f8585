use super::control::PromiseControlBlock;

use std::sync::Arc;

/// The write-capability dual of a [`Promise`](super::Promise).
///
/// Cloneable; clones write to the same control block, and only one of them
/// may ever resolve it.
pub struct Resolver<T> {
    block: Arc<PromiseControlBlock<T>>,
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            block: Arc::clone(&self.block),
        }
    }
}

impl<T> Resolver<T>
where
    T: Send + Clone + 'static,
{
    pub(crate) fn from_block(block: Arc<PromiseControlBlock<T>>) -> Self {
        Self { block }
    }

    /// Resolves the promise with `value`, waking every registered
    /// continuation in registration order.
    ///
    /// # Panics
    ///
    /// Panics if the promise was already resolved.
    pub fn resolve(&self, value: T) {
        self.block.resolve(value);
    }
}
