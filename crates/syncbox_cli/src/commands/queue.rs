//! Enqueue, discard and clear command implementations.

use std::path::Path;
use syncbox_outbox::{FileOutbox, HttpMethod, OutboxStore, WriteRequest};
use tracing::info;
use uuid::Uuid;

/// Runs the enqueue command. Prints the generated request id.
pub fn enqueue(
    path: &Path,
    url: &str,
    method: &str,
    data: &str,
    headers: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let method = parse_method(method)?;
    let headers = parse_headers(headers)?;

    let store = FileOutbox::open(path)?;
    let request_id = Uuid::new_v4().to_string();

    info!(request_id = %request_id, url, "queueing write");
    store.insert(WriteRequest {
        request_id: request_id.clone(),
        target_url: url.to_string(),
        method,
        payload: data.as_bytes().to_vec(),
        headers,
    })?;

    println!("{request_id}");
    Ok(())
}

/// Runs the discard command.
pub fn discard(path: &Path, request_id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileOutbox::open(path)?;

    match store.get_by_request_id(request_id)? {
        Some(_) => {
            store.delete(request_id)?;
            println!("Discarded {request_id}");
        }
        None => println!("No entry for {request_id}"),
    }
    Ok(())
}

/// Runs the clear command.
pub fn clear(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileOutbox::open(path)?;
    let count = store.list_all()?.len();
    store.clear()?;
    println!("Removed {count} entries");
    Ok(())
}

fn parse_method(method: &str) -> Result<HttpMethod, String> {
    match method.to_ascii_lowercase().as_str() {
        "post" => Ok(HttpMethod::Post),
        "put" => Ok(HttpMethod::Put),
        "delete" => Ok(HttpMethod::Delete),
        other => Err(format!(
            "unsupported method {other:?} (expected post, put or delete)"
        )),
    }
}

fn parse_headers(headers: &[String]) -> Result<Vec<(String, String)>, String> {
    headers
        .iter()
        .map(|raw| {
            raw.split_once('=')
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .ok_or_else(|| format!("invalid header {raw:?} (expected name=value)"))
        })
        .collect()
}
