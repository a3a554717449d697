//! Connectivity monitor.

use crate::events::{CallbackRegistry, Subscription};
use crate::status::{ConnectivityEvent, ConnectivityStatus};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::SystemTime;

/// Single source of truth for the host's network reachability.
///
/// The monitor is purely signal-driven: the embedding platform forwards its
/// reachability events through [`signal_reachable`](Self::signal_reachable)
/// and [`signal_unreachable`](Self::signal_unreachable), and the monitor
/// maintains the current status and fans transitions out to subscribers.
///
/// Instances are constructed explicitly and passed to the components that
/// need them; there is no process-wide singleton. None of the monitor's
/// operations can fail.
///
/// # Thread Safety
///
/// The monitor is `Send + Sync`. Status is written only by the signal entry
/// points and read freely by any thread. Subscriber callbacks run
/// synchronously on the signaling thread, in registration order.
pub struct ConnectivityMonitor {
    status: RwLock<ConnectivityStatus>,
    subscribers: CallbackRegistry<ConnectivityEvent>,
    shut_down: AtomicBool,
}

impl ConnectivityMonitor {
    /// Creates a monitor with no observed status yet.
    ///
    /// Until the first signal arrives, [`current_status`](Self::current_status)
    /// is [`ConnectivityStatus::Unknown`], which
    /// [`is_online`](Self::is_online) treats optimistically as online.
    #[must_use]
    pub fn new() -> Self {
        Self::with_status(ConnectivityStatus::Unknown)
    }

    /// Creates a monitor with a known initial status.
    ///
    /// For embedders that can read the host's reachability state at startup,
    /// and for tests.
    #[must_use]
    pub fn with_status(initial: ConnectivityStatus) -> Self {
        Self {
            status: RwLock::new(initial),
            subscribers: CallbackRegistry::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Returns the last observed status. No side effects, never blocks.
    #[must_use]
    pub fn current_status(&self) -> ConnectivityStatus {
        *self.status.read()
    }

    /// Returns true unless the host is known to be offline.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.current_status().is_online()
    }

    /// Returns true if the host is known to be offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        self.current_status().is_offline()
    }

    /// Host signal: the network became reachable.
    ///
    /// If the status was not already online, records the transition and
    /// notifies subscribers. A redundant signal is a no-op.
    pub fn signal_reachable(&self) {
        self.transition(ConnectivityStatus::Online);
    }

    /// Host signal: the network became unreachable.
    ///
    /// Symmetric to [`signal_reachable`](Self::signal_reachable).
    pub fn signal_unreachable(&self) {
        self.transition(ConnectivityStatus::Offline);
    }

    fn transition(&self, new_status: ConnectivityStatus) {
        if self.shut_down.load(Ordering::SeqCst) {
            return;
        }

        let previous = {
            let mut status = self.status.write();
            if *status == new_status {
                return;
            }
            let previous = *status;
            *status = new_status;
            previous
        };

        tracing::debug!(%previous, status = %new_status, "connectivity changed");

        self.subscribers.emit(&ConnectivityEvent {
            status: new_status,
            previous,
            observed_at: SystemTime::now(),
        });
    }

    /// Registers a callback invoked on every status change.
    ///
    /// Callbacks receive the new status, the prior status and the
    /// observation time. Subscribers are independent: a panicking callback
    /// is caught and logged without affecting the others.
    pub fn subscribe(
        &self,
        callback: impl Fn(&ConnectivityEvent) + Send + Sync + 'static,
    ) -> Subscription {
        self.subscribers.subscribe(callback)
    }

    /// Removes one callback. Returns false if it was already removed.
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.subscribers.unsubscribe(subscription)
    }

    /// Removes all callbacks.
    pub fn clear_subscribers(&self) {
        self.subscribers.clear();
    }

    /// Returns the number of registered callbacks.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Detaches from the host signal source and clears subscribers.
    ///
    /// Idempotent. Signals arriving after shutdown are ignored; the last
    /// observed status remains readable.
    pub fn shutdown(&self) {
        self.shut_down.store(true, Ordering::SeqCst);
        self.subscribers.clear();
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn starts_unknown_and_optimistic() {
        let monitor = ConnectivityMonitor::new();
        assert_eq!(monitor.current_status(), ConnectivityStatus::Unknown);
        assert!(monitor.is_online());
        assert!(!monitor.is_offline());
    }

    #[test]
    fn signals_update_status() {
        let monitor = ConnectivityMonitor::new();

        monitor.signal_unreachable();
        assert_eq!(monitor.current_status(), ConnectivityStatus::Offline);
        assert!(monitor.is_offline());

        monitor.signal_reachable();
        assert_eq!(monitor.current_status(), ConnectivityStatus::Online);
        assert!(monitor.is_online());
    }

    #[test]
    fn transition_carries_previous_status() {
        let monitor = ConnectivityMonitor::new();
        let events = Arc::new(Mutex::new(Vec::new()));

        let events2 = Arc::clone(&events);
        monitor.subscribe(move |event| {
            events2.lock().push((event.previous, event.status));
        });

        monitor.signal_unreachable();
        monitor.signal_reachable();

        assert_eq!(
            *events.lock(),
            vec![
                (ConnectivityStatus::Unknown, ConnectivityStatus::Offline),
                (ConnectivityStatus::Offline, ConnectivityStatus::Online),
            ]
        );
    }

    #[test]
    fn redundant_signal_emits_nothing() {
        let monitor = ConnectivityMonitor::with_status(ConnectivityStatus::Online);
        let fired = Arc::new(Mutex::new(0u32));

        let fired2 = Arc::clone(&fired);
        monitor.subscribe(move |_| {
            *fired2.lock() += 1;
        });

        monitor.signal_reachable();
        monitor.signal_reachable();
        assert_eq!(*fired.lock(), 0);

        monitor.signal_unreachable();
        assert_eq!(*fired.lock(), 1);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let monitor = ConnectivityMonitor::new();
        let fired = Arc::new(Mutex::new(0u32));

        let fired2 = Arc::clone(&fired);
        let sub = monitor.subscribe(move |_| {
            *fired2.lock() += 1;
        });

        monitor.signal_unreachable();
        assert!(monitor.unsubscribe(sub));
        monitor.signal_reachable();

        assert_eq!(*fired.lock(), 1);
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let monitor = ConnectivityMonitor::new();
        let fired = Arc::new(Mutex::new(false));

        monitor.subscribe(|_| panic!("bad subscriber"));
        let fired2 = Arc::clone(&fired);
        monitor.subscribe(move |_| {
            *fired2.lock() = true;
        });

        monitor.signal_unreachable();
        assert!(*fired.lock());
        assert_eq!(monitor.current_status(), ConnectivityStatus::Offline);
    }

    #[test]
    fn shutdown_is_idempotent_and_final() {
        let monitor = ConnectivityMonitor::new();
        let fired = Arc::new(Mutex::new(0u32));

        let fired2 = Arc::clone(&fired);
        monitor.subscribe(move |_| {
            *fired2.lock() += 1;
        });

        monitor.signal_unreachable();
        monitor.shutdown();
        monitor.shutdown();

        monitor.signal_reachable();
        assert_eq!(*fired.lock(), 1);
        assert_eq!(monitor.subscriber_count(), 0);
        // Last observed status survives shutdown
        assert_eq!(monitor.current_status(), ConnectivityStatus::Offline);
    }
}
