//! Drain command implementation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use syncbox_engine::{EngineConfig, SyncEngine};
use syncbox_net::{ConnectivityMonitor, ConnectivityStatus};
use syncbox_outbox::{FileOutbox, OutboxStore};

/// Runs the drain command: delivers every pending entry over HTTP.
pub fn run(path: &Path, timeout_secs: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileOutbox::open(path)?;
    if !store.has_pending()? {
        println!("Outbox is empty; nothing to deliver.");
        return Ok(());
    }

    // A one-shot CLI run has no host reachability feed; start from a
    // known-online status and let delivery outcomes speak for themselves.
    let monitor = Arc::new(ConnectivityMonitor::with_status(ConnectivityStatus::Online));
    let config = EngineConfig::new()
        .with_request_timeout(Duration::from_secs(timeout_secs))
        .with_auto_drain_on_reconnect(false);
    let engine = SyncEngine::with_http_transport(config, store, monitor)?;

    engine.on_progress(|progress| {
        if let Some(id) = &progress.current_request_id {
            let position = progress.completed + progress.failed + 1;
            println!("  [{position}/{}] delivering {id}", progress.total);
        }
    });

    let report = engine.drain()?;
    println!(
        "Delivered {} of {} entries ({} failed).",
        report.succeeded, report.total, report.failed
    );

    for id in &report.failed_request_ids {
        if let Some(entry) = engine.outbox().get_by_request_id(id)? {
            println!(
                "  failed: {id}: {}",
                entry.last_error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}
