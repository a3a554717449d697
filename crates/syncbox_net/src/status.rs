//! Connectivity status values and change events.

use std::fmt;
use std::time::SystemTime;

/// The host's current network reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectivityStatus {
    /// The host can reach the network.
    Online,
    /// The host cannot reach the network.
    Offline,
    /// No reachability signal has been observed yet.
    ///
    /// This is the status at process startup, before the embedding platform
    /// delivers its first signal. Once a concrete status has been observed
    /// it is never produced again.
    Unknown,
}

impl ConnectivityStatus {
    /// Returns true unless the host is known to be offline.
    ///
    /// `Unknown` counts as online: in an environment with no reachability
    /// signal, callers should attempt requests rather than queue them.
    #[must_use]
    pub fn is_online(&self) -> bool {
        !matches!(self, ConnectivityStatus::Offline)
    }

    /// Returns true if the host is known to be offline.
    #[must_use]
    pub fn is_offline(&self) -> bool {
        matches!(self, ConnectivityStatus::Offline)
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectivityStatus::Online => "online",
            ConnectivityStatus::Offline => "offline",
            ConnectivityStatus::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A connectivity transition, delivered to every subscriber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectivityEvent {
    /// The new status.
    pub status: ConnectivityStatus,
    /// The status before this transition.
    pub previous: ConnectivityStatus,
    /// When the transition was observed.
    pub observed_at: SystemTime,
}

impl ConnectivityEvent {
    /// Returns true if this event is a reconnect: the host moved from a
    /// known-offline state back to online.
    #[must_use]
    pub fn is_reconnect(&self) -> bool {
        self.previous == ConnectivityStatus::Offline && self.status == ConnectivityStatus::Online
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_is_optimistically_online() {
        assert!(ConnectivityStatus::Unknown.is_online());
        assert!(!ConnectivityStatus::Unknown.is_offline());
        assert!(ConnectivityStatus::Online.is_online());
        assert!(ConnectivityStatus::Offline.is_offline());
    }

    #[test]
    fn reconnect_detection() {
        let event = ConnectivityEvent {
            status: ConnectivityStatus::Online,
            previous: ConnectivityStatus::Offline,
            observed_at: SystemTime::now(),
        };
        assert!(event.is_reconnect());

        // First concrete signal is not a reconnect
        let event = ConnectivityEvent {
            status: ConnectivityStatus::Online,
            previous: ConnectivityStatus::Unknown,
            observed_at: SystemTime::now(),
        };
        assert!(!event.is_reconnect());
    }
}
