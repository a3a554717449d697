//! Syncbox CLI
//!
//! Command-line tools for inspecting and draining file-backed outbox queues.
//!
//! # Commands
//!
//! - `inspect` - List queued entries and their delivery state
//! - `enqueue` - Queue a write request
//! - `drain` - Deliver all pending entries over HTTP
//! - `discard` - Remove one queued entry
//! - `clear` - Remove all queued entries

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Syncbox command-line outbox tools.
#[derive(Parser)]
#[command(name = "syncbox")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the outbox directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List queued entries and their delivery state
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Queue a write request
    Enqueue {
        /// Target URL
        #[arg(long)]
        url: String,

        /// HTTP method (post, put, delete)
        #[arg(long, default_value = "post")]
        method: String,

        /// Request body
        #[arg(long, default_value = "")]
        data: String,

        /// Extra header in name=value form (repeatable)
        #[arg(long = "header")]
        headers: Vec<String>,
    },

    /// Deliver all pending entries over HTTP
    Drain {
        /// Per-request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
    },

    /// Remove one queued entry
    Discard {
        /// The request id to remove
        request_id: String,
    },

    /// Remove all queued entries
    Clear,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Outbox path required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Enqueue {
            url,
            method,
            data,
            headers,
        } => {
            let path = cli.path.ok_or("Outbox path required for enqueue")?;
            commands::queue::enqueue(&path, &url, &method, &data, &headers)?;
        }
        Commands::Drain { timeout } => {
            let path = cli.path.ok_or("Outbox path required for drain")?;
            commands::drain::run(&path, timeout)?;
        }
        Commands::Discard { request_id } => {
            let path = cli.path.ok_or("Outbox path required for discard")?;
            commands::queue::discard(&path, &request_id)?;
        }
        Commands::Clear => {
            let path = cli.path.ok_or("Outbox path required for clear")?;
            commands::queue::clear(&path)?;
        }
        Commands::Version => {
            println!("Syncbox CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
