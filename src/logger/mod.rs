//! Logger module
//!
//! Thin facade over `tracing` used by the rest of the server:
//! - Server lifecycle logging
//! - Access logging with multiple formats (emitted on the `access` target)
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use std::net::SocketAddr;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Initialize the global subscriber
///
/// `RUST_LOG` wins over `logging.level` when set. Should be called once at
/// application startup.
pub fn init(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| -> Box<dyn std::error::Error> { e })
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        server_name = %config.http.server_name,
        level = %config.logging.level,
        "Listening on: http://{addr}"
    );
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(max) = config.performance.max_connections {
        tracing::info!("Max connections: {max}");
    }
    tracing::info!("Serving assets from: {}", config.assets.dir);
    match config.database.url.as_deref() {
        Some(url) => tracing::info!("Document store: {url}"),
        None => tracing::warn!("No database configured; save/load will report it"),
    }
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_rejected(peer_addr: &SocketAddr, max: u64) {
    tracing::warn!("[Connection] Rejected {peer_addr}: limit of {max} reached");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("[Connection] Failed to serve connection: {err:?}");
}

pub fn log_connection_timeout(peer_addr: &SocketAddr, secs: u64) {
    tracing::warn!("[Connection] {peer_addr} timed out after {secs}s");
}

pub fn log_shutdown() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}
