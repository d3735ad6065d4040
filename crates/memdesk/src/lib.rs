//! Public SDK surface for memdesk.
//!
//! This crate re-exports the core building blocks and provides a small
//! initialization helper to keep consumer setup consistent.

/// Re-export for convenience.
pub use memdesk_config as config;
pub use memdesk_core as core;
/// Re-export for convenience.
pub use memdesk_memory as memory;

pub use memdesk_core::{QueryReport, SupportAgent, SupportAgentBuilder};

#[inline]
/// Initialize logging using env_logger (`RUST_LOG`), with millisecond timestamps.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::builder()
        .format_timestamp_millis()
        .parse_default_env()
        .try_init();
}
