//! Sync engine: drain loop, single-flight guard and notification fan-out.

use crate::config::EngineConfig;
use crate::error::EngineResult;
use crate::http::HttpTransport;
use crate::transport::{DeliveryRequest, DeliveryTransport};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use syncbox_net::{CallbackRegistry, ConnectivityEvent, ConnectivityMonitor, Subscription};
use syncbox_outbox::{DeliveryStatus, HttpMethod, OutboxEntry, OutboxStore, WriteRequest};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Aggregate result of one drain pass.
///
/// An all-zero report means the pass was rejected by a precondition (host
/// offline, or another pass already in flight); callers should treat that as
/// "try again later", not as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Number of entries in the pass's snapshot.
    pub total: usize,
    /// Entries delivered and removed from the store.
    pub succeeded: usize,
    /// Entries that failed and remain queued for retry.
    pub failed: usize,
    /// Request ids of the failed entries, in snapshot order.
    pub failed_request_ids: Vec<String>,
}

impl SyncReport {
    /// Returns true if every snapshotted entry was delivered.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Progress notification emitted during a drain pass.
///
/// One event is emitted when the pass starts (no current request id), then
/// one per entry just before its delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncProgress {
    /// Number of entries in the pass's snapshot.
    pub total: usize,
    /// Entries delivered so far.
    pub completed: usize,
    /// Entries failed so far.
    pub failed: usize,
    /// The entry about to be attempted, if any.
    pub current_request_id: Option<String>,
}

/// Counters accumulated across the lifetime of an engine.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Drain passes that ran to completion (precondition rejections are not
    /// counted).
    pub passes_completed: u64,
    /// Total entries delivered and removed.
    pub entries_delivered: u64,
    /// Total failed delivery attempts.
    pub entries_failed: u64,
    /// Summary of the most recent pass's failures, if any.
    pub last_error: Option<String>,
    /// When the most recent pass finished.
    pub last_drain_at: Option<Instant>,
}

/// Drives delivery of queued outbox entries to the network.
///
/// The engine enforces single-flight execution (at most one drain pass at a
/// time), strict FIFO processing within a pass, and publishes progress and
/// completion notifications. It is constructed explicitly with its
/// collaborators and shared as `Arc<SyncEngine<_, _>>`.
///
/// # Lifecycle
///
/// [`SyncEngine::new`] performs the crash-recovery sweep (entries stranded
/// in the syncing state by a previous process are reset to failed, keeping
/// them retryable) and subscribes to the connectivity monitor for automatic
/// draining on reconnect. [`SyncEngine::shutdown`] detaches that
/// subscription and clears all observers.
///
/// # Cancellation
///
/// A drain pass has no mid-pass cancellation: once started it runs to
/// completion over its snapshot. Callers wanting to stop the system should
/// disable auto-drain and stop invoking [`drain`](Self::drain).
pub struct SyncEngine<S, T> {
    config: EngineConfig,
    store: S,
    transport: T,
    monitor: Arc<ConnectivityMonitor>,
    draining: AtomicBool,
    auto_drain: AtomicBool,
    progress: CallbackRegistry<SyncProgress>,
    complete: CallbackRegistry<SyncReport>,
    stats: RwLock<EngineStats>,
    monitor_sub: Mutex<Option<Subscription>>,
}

impl<S, T> SyncEngine<S, T>
where
    S: OutboxStore + 'static,
    T: DeliveryTransport + 'static,
{
    /// Creates an engine over the given store, transport and monitor.
    ///
    /// Runs the crash-recovery sweep against the store, then registers the
    /// reconnect hook on the monitor. The hook holds only a weak reference,
    /// so dropping every strong handle to the engine detaches it.
    ///
    /// # Errors
    ///
    /// Returns an error if the recovery sweep cannot read or update the
    /// store.
    pub fn new(
        config: EngineConfig,
        store: S,
        transport: T,
        monitor: Arc<ConnectivityMonitor>,
    ) -> EngineResult<Arc<Self>> {
        let engine = Arc::new(Self {
            auto_drain: AtomicBool::new(config.auto_drain_on_reconnect),
            config,
            store,
            transport,
            monitor,
            draining: AtomicBool::new(false),
            progress: CallbackRegistry::new(),
            complete: CallbackRegistry::new(),
            stats: RwLock::new(EngineStats::default()),
            monitor_sub: Mutex::new(None),
        });

        engine.recover_interrupted()?;

        let weak = Arc::downgrade(&engine);
        let sub = engine.monitor.subscribe(move |event| {
            if let Some(engine) = weak.upgrade() {
                engine.on_connectivity_change(event);
            }
        });
        *engine.monitor_sub.lock() = Some(sub);

        Ok(engine)
    }

    /// Queues a write request, generating a fresh request id.
    ///
    /// Returns the generated id for later correlation (progress events,
    /// [`discard`](Self::discard), failed-id reporting).
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    pub fn enqueue(
        &self,
        target_url: impl Into<String>,
        method: HttpMethod,
        payload: Vec<u8>,
        headers: Vec<(String, String)>,
    ) -> EngineResult<String> {
        self.enqueue_request(WriteRequest {
            request_id: Uuid::new_v4().to_string(),
            target_url: target_url.into(),
            method,
            payload,
            headers,
        })
    }

    /// Queues a write request with a caller-assigned request id.
    ///
    /// Uniqueness of the id is the caller's responsibility; nothing is
    /// deduplicated here.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted.
    pub fn enqueue_request(&self, request: WriteRequest) -> EngineResult<String> {
        let request_id = request.request_id.clone();
        debug!(request_id = %request_id, url = %request.target_url, "queueing write");
        self.store.insert(request)?;
        Ok(request_id)
    }

    /// Removes a queued entry (e.g. the user cancelled the action).
    ///
    /// Removing an unknown or already-delivered id is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    pub fn discard(&self, request_id: &str) -> EngineResult<()> {
        self.store.delete(request_id)?;
        Ok(())
    }

    /// Delivers all currently pending entries, oldest first.
    ///
    /// Preconditions: if the host is offline, or another pass is already in
    /// flight, returns an empty [`SyncReport`] immediately without touching
    /// the queue. The second caller does not wait for the running pass.
    ///
    /// The pass snapshots the pending entries once; entries enqueued while
    /// it runs are left for the next pass. A single entry's failure never
    /// aborts the pass.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store-contract violation; delivery
    /// failures are reported through the returned report.
    pub fn drain(&self) -> EngineResult<SyncReport> {
        if self.monitor.is_offline() {
            debug!("drain skipped: host is offline");
            return Ok(SyncReport::default());
        }
        if self.draining.swap(true, Ordering::SeqCst) {
            debug!("drain skipped: a pass is already in flight");
            return Ok(SyncReport::default());
        }

        let outcome = self.run_pass();
        self.draining.store(false, Ordering::SeqCst);

        let report = outcome?;
        self.record_stats(&report);
        self.complete.emit(&report);
        Ok(report)
    }

    fn run_pass(&self) -> EngineResult<SyncReport> {
        let snapshot = self.store.list_pending()?;
        let mut report = SyncReport {
            total: snapshot.len(),
            ..SyncReport::default()
        };

        info!(total = report.total, "drain pass started");
        self.progress.emit(&SyncProgress {
            total: report.total,
            completed: 0,
            failed: 0,
            current_request_id: None,
        });

        for entry in &snapshot {
            self.progress.emit(&SyncProgress {
                total: report.total,
                completed: report.succeeded,
                failed: report.failed,
                current_request_id: Some(entry.request_id.clone()),
            });

            if self.sync_one(entry)? {
                report.succeeded += 1;
            } else {
                report.failed += 1;
                report.failed_request_ids.push(entry.request_id.clone());
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "drain pass finished"
        );
        Ok(report)
    }

    /// Attempts delivery of a single entry.
    ///
    /// Marks the entry syncing, performs the HTTP call, then either deletes
    /// the entry (2xx) or marks it failed with the failure detail. Exposed
    /// so callers can retry one failed entry without a full drain.
    ///
    /// # Errors
    ///
    /// Returns an error only on a store-contract violation; a failed
    /// delivery is `Ok(false)`.
    pub fn sync_one(&self, entry: &OutboxEntry) -> EngineResult<bool> {
        self.store
            .update_status(&entry.request_id, DeliveryStatus::Syncing, None)?;

        match self.transport.deliver(&DeliveryRequest::from_entry(entry)) {
            Ok(response) if response.is_success() => {
                debug!(request_id = %entry.request_id, status = response.status, "delivered");
                self.store.delete(&entry.request_id)?;
                Ok(true)
            }
            Ok(response) => {
                debug!(
                    request_id = %entry.request_id,
                    status = response.status,
                    "delivery rejected by server"
                );
                self.store.update_status(
                    &entry.request_id,
                    DeliveryStatus::Failed,
                    Some(response.describe()),
                )?;
                Ok(false)
            }
            Err(err) => {
                debug!(request_id = %entry.request_id, error = %err, "delivery failed");
                self.store.update_status(
                    &entry.request_id,
                    DeliveryStatus::Failed,
                    Some(err.to_string()),
                )?;
                Ok(false)
            }
        }
    }

    /// Registers a callback for progress events.
    pub fn on_progress(
        &self,
        callback: impl Fn(&SyncProgress) + Send + Sync + 'static,
    ) -> Subscription {
        self.progress.subscribe(callback)
    }

    /// Removes a progress callback.
    pub fn unsubscribe_progress(&self, subscription: Subscription) -> bool {
        self.progress.unsubscribe(subscription)
    }

    /// Registers a callback invoked with the aggregate report of every
    /// completed pass.
    pub fn on_complete(
        &self,
        callback: impl Fn(&SyncReport) + Send + Sync + 'static,
    ) -> Subscription {
        self.complete.subscribe(callback)
    }

    /// Removes a completion callback.
    pub fn unsubscribe_complete(&self, subscription: Subscription) -> bool {
        self.complete.unsubscribe(subscription)
    }

    /// Enables or disables automatic draining on reconnect.
    pub fn set_auto_drain_on_reconnect(&self, enabled: bool) {
        self.auto_drain.store(enabled, Ordering::SeqCst);
    }

    /// Returns whether automatic draining on reconnect is enabled.
    #[must_use]
    pub fn auto_drain_on_reconnect(&self) -> bool {
        self.auto_drain.load(Ordering::SeqCst)
    }

    /// Returns true while a drain pass is in flight.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Returns a copy of the lifetime counters.
    #[must_use]
    pub fn stats(&self) -> EngineStats {
        self.stats.read().clone()
    }

    /// Returns the engine's outbox store.
    #[must_use]
    pub fn outbox(&self) -> &S {
        &self.store
    }

    /// Returns the engine's delivery transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the engine's connectivity monitor.
    #[must_use]
    pub fn monitor(&self) -> &ConnectivityMonitor {
        &self.monitor
    }

    /// Returns the engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Detaches the reconnect hook and clears all observers.
    ///
    /// Idempotent. Manual [`drain`](Self::drain) calls remain possible
    /// afterwards; only the automatic trigger and the notification fan-out
    /// are gone.
    pub fn shutdown(&self) {
        if let Some(sub) = self.monitor_sub.lock().take() {
            self.monitor.unsubscribe(sub);
        }
        self.progress.clear();
        self.complete.clear();
    }

    /// Resets entries stranded in the syncing state by a crashed process.
    ///
    /// An entry must never stay in the syncing state across a restart: the
    /// pass that owned it is gone, and nothing else may touch it. Marking it
    /// failed returns it to the retryable pool.
    fn recover_interrupted(&self) -> EngineResult<()> {
        for entry in self.store.list_all()? {
            if entry.status == DeliveryStatus::Syncing {
                warn!(
                    request_id = %entry.request_id,
                    "entry was stranded mid-delivery; marking failed for retry"
                );
                self.store.update_status(
                    &entry.request_id,
                    DeliveryStatus::Failed,
                    Some("interrupted by process restart".into()),
                )?;
            }
        }
        Ok(())
    }

    fn on_connectivity_change(&self, event: &ConnectivityEvent) {
        if !event.is_reconnect() || !self.auto_drain.load(Ordering::SeqCst) {
            return;
        }

        // The pending check is an optimization; a racing enqueue is caught
        // by the next reconnect or a manual drain.
        match self.store.has_pending() {
            Ok(true) => {
                info!("connectivity recovered; draining outbox");
                if let Err(error) = self.drain() {
                    error!(%error, "auto-drain failed");
                }
            }
            Ok(false) => debug!("connectivity recovered; outbox is empty"),
            Err(error) => error!(%error, "could not inspect outbox after reconnect"),
        }
    }

    fn record_stats(&self, report: &SyncReport) {
        let mut stats = self.stats.write();
        stats.passes_completed += 1;
        stats.entries_delivered += report.succeeded as u64;
        stats.entries_failed += report.failed as u64;
        stats.last_drain_at = Some(Instant::now());
        stats.last_error = if report.failed > 0 {
            Some(format!(
                "{} of {} deliveries failed",
                report.failed, report.total
            ))
        } else {
            None
        };
    }
}

impl<S> SyncEngine<S, HttpTransport>
where
    S: OutboxStore + 'static,
{
    /// Creates an engine delivering over real HTTP, with the request timeout
    /// taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed or the
    /// recovery sweep fails.
    pub fn with_http_transport(
        config: EngineConfig,
        store: S,
        monitor: Arc<ConnectivityMonitor>,
    ) -> EngineResult<Arc<Self>> {
        let transport = HttpTransport::new(config.request_timeout)?;
        Self::new(config, store, transport, monitor)
    }
}
