//! # Syncbox Net
//!
//! Connectivity monitoring and observer fan-out.
//!
//! This crate provides:
//! - [`ConnectivityMonitor`] - the single source of truth for "can the host
//!   currently reach the network", fed by host reachability signals
//! - [`CallbackRegistry`] - a typed observer list with per-callback panic
//!   isolation, shared by the monitor and the sync engine
//!
//! ## Design Principles
//!
//! - Purely signal-driven: no polling, no debouncing. The embedding platform
//!   forwards its reachability events into the monitor.
//! - Optimistic when blind: before the first signal the status is
//!   [`ConnectivityStatus::Unknown`], which counts as online so that callers
//!   do not needlessly queue requests in ambiguous environments.
//! - A failing subscriber never prevents other subscribers from running.
//!
//! ## Example
//!
//! ```rust
//! use syncbox_net::{ConnectivityMonitor, ConnectivityStatus};
//!
//! let monitor = ConnectivityMonitor::new();
//! assert!(monitor.is_online()); // optimistic before the first signal
//!
//! monitor.signal_unreachable();
//! assert_eq!(monitor.current_status(), ConnectivityStatus::Offline);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod events;
mod monitor;
mod status;

pub use events::{CallbackRegistry, Subscription};
pub use monitor::ConnectivityMonitor;
pub use status::{ConnectivityEvent, ConnectivityStatus};
