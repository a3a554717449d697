//! Inspect command implementation.

use serde::Serialize;
use std::path::Path;
use syncbox_outbox::{FileOutbox, OutboxStore};

/// Outbox inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Outbox directory path.
    pub path: String,
    /// Total number of entries.
    pub total: usize,
    /// Entries eligible for delivery.
    pub pending: usize,
    /// Per-entry summaries, oldest first.
    pub entries: Vec<EntrySummary>,
}

/// Summary of one queued entry.
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    /// Caller-assigned request id.
    pub request_id: String,
    /// HTTP method.
    pub method: String,
    /// Target URL.
    pub target_url: String,
    /// Delivery state.
    pub status: String,
    /// Failed attempts so far.
    pub retry_count: u32,
    /// Payload size in bytes.
    pub payload_bytes: usize,
    /// Insert time, unix-epoch milliseconds.
    pub created_at_ms: u64,
    /// Most recent failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileOutbox::open(path)?;
    let entries = store.list_all()?;

    let result = InspectResult {
        path: path.display().to_string(),
        total: entries.len(),
        pending: store.pending_count()?,
        entries: entries
            .iter()
            .map(|e| EntrySummary {
                request_id: e.request_id.clone(),
                method: e.method.to_string(),
                target_url: e.target_url.clone(),
                status: e.status.to_string(),
                retry_count: e.retry_count,
                payload_bytes: e.payload.len(),
                created_at_ms: e.created_at_ms,
                last_error: e.last_error.clone(),
            })
            .collect(),
    };

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&result)?),
        _ => print_text(&result),
    }

    Ok(())
}

fn print_text(result: &InspectResult) {
    println!("Outbox: {}", result.path);
    println!(
        "Entries: {} total, {} eligible for delivery",
        result.total, result.pending
    );

    if result.entries.is_empty() {
        return;
    }

    println!();
    for entry in &result.entries {
        println!(
            "  {}  {:6} {}  [{}] retries={}",
            entry.request_id, entry.method, entry.target_url, entry.status, entry.retry_count
        );
        if let Some(error) = &entry.last_error {
            println!("      last error: {error}");
        }
    }
}
