use super::LifecycleListener;

use parking_lot::RwLock;
use std::sync::Arc;

/// The single process-wide lifecycle listener slot.
static LIFECYCLE_LISTENER: RwLock<Option<Arc<dyn LifecycleListener>>> = RwLock::new(None);

/// Access point for the process-wide [`LifecycleListener`].
///
/// The slot starts empty; while it is empty, all runtime objects are created
/// uninstrumented. Installing a listener affects objects created afterwards,
/// not ones that already exist.
pub struct LifecycleListenerManager;

impl LifecycleListenerManager {
    /// Installs the process-wide listener, replacing any previous one.
    pub fn set(listener: Arc<dyn LifecycleListener>) {
        *LIFECYCLE_LISTENER.write() = Some(listener);
    }

    /// Returns the currently installed listener, if any.
    pub fn get() -> Option<Arc<dyn LifecycleListener>> {
        LIFECYCLE_LISTENER.read().clone()
    }

    /// Removes the process-wide listener.
    pub fn clear() {
        *LIFECYCLE_LISTENER.write() = None;
    }
}
