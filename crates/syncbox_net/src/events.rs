//! Typed observer list with per-callback isolation.

use parking_lot::RwLock;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Handle returned by [`CallbackRegistry::subscribe`]; pass it back to
/// [`CallbackRegistry::unsubscribe`] to remove the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type SharedCallback<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// An observer list that fans events out to registered callbacks.
///
/// Callbacks are invoked synchronously, in registration order. Each
/// invocation is isolated: a panicking callback is caught and logged, and
/// does not prevent later callbacks from running or corrupt registry state.
///
/// # Example
///
/// ```rust
/// use syncbox_net::CallbackRegistry;
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
///
/// let registry: CallbackRegistry<u32> = CallbackRegistry::new();
/// let seen = Arc::new(AtomicU32::new(0));
///
/// let seen2 = Arc::clone(&seen);
/// let sub = registry.subscribe(move |n| {
///     seen2.store(*n, Ordering::SeqCst);
/// });
///
/// registry.emit(&7);
/// assert_eq!(seen.load(Ordering::SeqCst), 7);
///
/// registry.unsubscribe(sub);
/// ```
pub struct CallbackRegistry<E> {
    next_id: AtomicU64,
    callbacks: RwLock<Vec<(u64, SharedCallback<E>)>>,
}

impl<E> CallbackRegistry<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Registers a callback and returns its subscription handle.
    pub fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.callbacks.write().push((id, Arc::new(callback)));
        Subscription(id)
    }

    /// Removes a callback. Returns false if the handle was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut callbacks = self.callbacks.write();
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != subscription.0);
        callbacks.len() != before
    }

    /// Removes all callbacks.
    pub fn clear(&self) {
        self.callbacks.write().clear();
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.read().len()
    }

    /// Returns true if no callbacks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.read().is_empty()
    }

    /// Invokes every callback with `event`, in registration order.
    ///
    /// The callback list is snapshotted before invocation, so a callback may
    /// subscribe or unsubscribe without deadlocking; such changes take
    /// effect from the next `emit`.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<SharedCallback<E>> = self
            .callbacks
            .read()
            .iter()
            .map(|(_, cb)| Arc::clone(cb))
            .collect();

        for callback in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| (*callback)(event))).is_err() {
                tracing::warn!("observer callback panicked; continuing with remaining observers");
            }
        }
    }
}

impl<E> Default for CallbackRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}
