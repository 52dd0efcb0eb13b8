//! Ember CLI library: program loading, command handlers and logging setup.
//!
//! The `ember` binary is a thin wrapper over [`commands`]; everything it
//! does is reachable from here so integration tests can drive it directly.

pub mod commands;
pub mod load;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `EMBER_LOG=ember_eval=debug`, or through `RUST_LOG`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if a filter is configured
        let filter = if let Ok(directives) = std::env::var("EMBER_LOG") {
            EnvFilter::new(directives)
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
