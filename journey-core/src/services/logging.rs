//! Logging service

use crate::models::{EngineConfiguration, LogLevel};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Initialize logging with the specified level
///
/// `RUST_LOG` takes precedence when set. Calling this more than once is an error
/// reported through the result, never a panic.
pub fn init_logging(level: LogLevel) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("journey_core={}", level.as_str())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
}

/// Initialize logging at the configured level
pub fn init_logging_from_config(
    config: &EngineConfiguration,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_logging(config.log_level)
}

/// Log a transition taken by the engine
pub fn log_transition(jid: Uuid, from: &str, event: &str, to: &str) {
    tracing::debug!(
        jid = %jid,
        from = from,
        event = event,
        to = to,
        "State transition"
    );
}

/// Log a caller mistake rejected by the engine
pub fn log_rejection(jid: Option<Uuid>, event: &str, reason: &str) {
    tracing::warn!(
        jid = jid.map(|id| id.to_string()).unwrap_or_default(),
        event = event,
        reason = reason,
        "Request rejected"
    );
}

/// Log a fault indicating a malformed graph or corrupt journey
pub fn log_internal_fault(jid: Option<Uuid>, error: &str) {
    tracing::error!(
        jid = jid.map(|id| id.to_string()).unwrap_or_default(),
        error = error,
        "Internal invariant violated"
    );
}
