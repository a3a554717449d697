//! File-backed outbox store for persistent queues.
//!
//! Directory layout:
//!
//! ```text
//! <dir>/
//! ├─ LOCK         # Advisory lock for single-writer
//! ├─ outbox.db    # CBOR snapshot of all entries
//! └─ outbox.tmp   # Staging file for atomic rewrites
//! ```
//!
//! The LOCK file ensures only one process owns the outbox at a time. Every
//! mutation rewrites `outbox.db` atomically: the new image is written to
//! `outbox.tmp`, synced, then renamed over the data file.

use crate::entry::{DeliveryStatus, OutboxEntry, WriteRequest};
use crate::error::{StoreError, StoreResult};
use crate::store::{now_millis, sort_by_enqueue_order, OutboxStore};
use fs2::FileExt;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File names within the outbox directory.
const DATA_FILE: &str = "outbox.db";
const TEMP_FILE: &str = "outbox.tmp";
const LOCK_FILE: &str = "LOCK";

/// The full persisted image of the outbox.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    next_key: u64,
    entries: Vec<OutboxEntry>,
}

/// A durable outbox store backed by a directory on disk.
///
/// Queued entries survive process restarts. The outbox holds a handful of
/// unresolved write intents at a time, so the whole image is kept in memory
/// and rewritten atomically on every mutation rather than maintained through
/// an append log.
///
/// # Thread Safety
///
/// The store is thread-safe within one process; the LOCK file excludes other
/// processes (a second [`FileOutbox::open`] returns [`StoreError::Locked`]).
///
/// # Example
///
/// ```no_run
/// use syncbox_outbox::{FileOutbox, HttpMethod, OutboxStore, WriteRequest};
/// use std::path::Path;
///
/// let store = FileOutbox::open(Path::new("queue")).unwrap();
/// store
///     .insert(WriteRequest::new("req-1", "https://example.com/a", HttpMethod::Post))
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct FileOutbox {
    dir: PathBuf,
    state: RwLock<Snapshot>,
    /// Lock file handle (held for exclusive access).
    _lock_file: File,
}

impl FileOutbox {
    /// Opens or creates an outbox directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The directory cannot be created
    /// - Another process holds the lock (returns [`StoreError::Locked`])
    /// - The persisted image cannot be read or decoded
    pub fn open(dir: &Path) -> StoreResult<Self> {
        fs::create_dir_all(dir)?;

        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))?;

        if lock_file.try_lock_exclusive().is_err() {
            return Err(StoreError::Locked);
        }

        let state = Self::load(dir)?;
        tracing::debug!(
            path = %dir.display(),
            entries = state.entries.len(),
            "opened file outbox"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            state: RwLock::new(state),
            _lock_file: lock_file,
        })
    }

    /// Returns the outbox directory path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn load(dir: &Path) -> StoreResult<Snapshot> {
        let data_path = dir.join(DATA_FILE);
        if !data_path.exists() {
            return Ok(Snapshot::default());
        }

        let bytes = fs::read(&data_path)?;
        ciborium::from_reader(bytes.as_slice())
            .map_err(|e| StoreError::Corrupted(e.to_string()))
    }

    /// Writes the snapshot to disk atomically: temp write, sync, rename,
    /// directory fsync.
    fn persist(&self, state: &Snapshot) -> StoreResult<()> {
        let temp_path = self.dir.join(TEMP_FILE);
        let data_path = self.dir.join(DATA_FILE);

        let mut encoded = Vec::new();
        ciborium::into_writer(state, &mut encoded)
            .map_err(|e| StoreError::Corrupted(e.to_string()))?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&temp_path, &data_path)?;
        self.sync_directory()?;

        Ok(())
    }

    #[cfg(unix)]
    fn sync_directory(&self) -> StoreResult<()> {
        // On Unix, fsync on a directory makes the rename durable
        let dir = File::open(&self.dir)?;
        dir.sync_all()?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn sync_directory(&self) -> StoreResult<()> {
        // Directory fsync is not directly supported on Windows
        Ok(())
    }
}

impl OutboxStore for FileOutbox {
    fn insert(&self, request: WriteRequest) -> StoreResult<u64> {
        let mut state = self.state.write();
        state.next_key += 1;
        let record_key = state.next_key;

        state.entries.push(OutboxEntry {
            record_key,
            request_id: request.request_id,
            target_url: request.target_url,
            method: request.method,
            payload: request.payload,
            headers: request.headers,
            created_at_ms: now_millis(),
            retry_count: 0,
            last_error: None,
            status: DeliveryStatus::Pending,
        });

        self.persist(&state)?;
        Ok(record_key)
    }

    fn get_by_request_id(&self, request_id: &str) -> StoreResult<Option<OutboxEntry>> {
        Ok(self
            .state
            .read()
            .entries
            .iter()
            .find(|e| e.request_id == request_id)
            .cloned())
    }

    fn list_all(&self) -> StoreResult<Vec<OutboxEntry>> {
        let mut entries = self.state.read().entries.clone();
        sort_by_enqueue_order(&mut entries);
        Ok(entries)
    }

    fn list_pending(&self) -> StoreResult<Vec<OutboxEntry>> {
        let mut entries: Vec<OutboxEntry> = self
            .state
            .read()
            .entries
            .iter()
            .filter(|e| e.status.is_retryable())
            .cloned()
            .collect();
        sort_by_enqueue_order(&mut entries);
        Ok(entries)
    }

    fn update_status(
        &self,
        request_id: &str,
        status: DeliveryStatus,
        last_error: Option<String>,
    ) -> StoreResult<()> {
        let mut state = self.state.write();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.request_id == request_id)
            .ok_or_else(|| StoreError::not_found(request_id))?;

        entry.status = status;
        if status == DeliveryStatus::Failed {
            entry.retry_count += 1;
        }
        if let Some(detail) = last_error {
            entry.last_error = Some(detail);
        }

        self.persist(&state)
    }

    fn delete(&self, request_id: &str) -> StoreResult<()> {
        let mut state = self.state.write();
        let before = state.entries.len();
        state.entries.retain(|e| e.request_id != request_id);

        if state.entries.len() == before {
            // Unknown key: nothing changed, nothing to persist
            return Ok(());
        }
        self.persist(&state)
    }

    fn clear(&self) -> StoreResult<()> {
        let mut state = self.state.write();
        state.entries.clear();
        self.persist(&state)
    }
}
