//! # Syncbox Outbox
//!
//! Durable storage for queued offline writes.
//!
//! The outbox is a keyed collection of [`OutboxEntry`] records: HTTP write
//! requests that were issued while the host had no connectivity and must be
//! delivered later. The store only ever holds *unresolved* work; an entry
//! that has been delivered is deleted, never retained with a success status.
//!
//! ## Design Principles
//!
//! - The [`OutboxStore`] trait is the entire persistence contract; the sync
//!   engine never touches a concrete store type.
//! - Stores do not interpret payloads: they are opaque bytes, forwarded
//!   verbatim at delivery time.
//! - Entries are returned in enqueue order (ascending creation time), which
//!   is what gives the drain loop its FIFO guarantee.
//!
//! ## Available Stores
//!
//! - [`MemoryOutbox`] - For tests and ephemeral queues
//! - [`FileOutbox`] - Durable, survives process restarts
//!
//! ## Example
//!
//! ```rust
//! use syncbox_outbox::{HttpMethod, MemoryOutbox, OutboxStore, WriteRequest};
//!
//! let store = MemoryOutbox::new();
//! let request = WriteRequest::new("req-1", "https://api.example.com/orders", HttpMethod::Post)
//!     .with_payload(br#"{"qty":2}"#.to_vec());
//! store.insert(request).unwrap();
//! assert_eq!(store.pending_count().unwrap(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entry;
mod error;
mod file;
mod memory;
mod store;

pub use entry::{DeliveryStatus, HttpMethod, OutboxEntry, WriteRequest};
pub use error::{StoreError, StoreResult};
pub use file::FileOutbox;
pub use memory::MemoryOutbox;
pub use store::OutboxStore;
