//! # Syncbox Engine
//!
//! Drain loop and delivery engine for the Syncbox offline outbox.
//!
//! This crate provides:
//! - The [`SyncEngine`] state machine (idle → draining → idle)
//! - Single-flight drain execution with strict FIFO delivery order
//! - Progress and completion notification fan-out
//! - Automatic draining on connectivity recovery
//! - A delivery transport abstraction with mock and HTTP implementations
//!
//! ## Architecture
//!
//! The engine sits on top of two collaborators: an
//! [`OutboxStore`](syncbox_outbox::OutboxStore) holding durable write
//! intents, and a [`ConnectivityMonitor`](syncbox_net::ConnectivityMonitor)
//! reporting host reachability. A drain pass snapshots the pending entries
//! once and delivers them sequentially, oldest first; entries enqueued while
//! the pass runs are picked up by the next one.
//!
//! ## Key Invariants
//!
//! - At most one drain pass runs at a time; a concurrent `drain()` returns
//!   an empty report instead of queuing behind the running pass
//! - Entries are delivered strictly in enqueue order within a pass
//! - A single entry's failure never aborts the pass
//! - A successfully delivered entry is deleted from the store
//! - After a crash, entries stranded mid-delivery are swept back to a
//!   retryable state at engine initialization

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod engine;
mod error;
mod http;
mod transport;

pub use config::EngineConfig;
pub use engine::{EngineStats, SyncEngine, SyncProgress, SyncReport};
pub use error::{EngineError, EngineResult};
pub use http::HttpTransport;
pub use transport::{
    DeliveryRequest, DeliveryResponse, DeliveryTransport, MockTransport, TransportError,
};
