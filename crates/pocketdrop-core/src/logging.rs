//! Tracing setup for host applications
//!
//! Library code only emits `tracing` events. A host that has no subscriber
//! of its own can call [`init_logging`] once at startup.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr subscriber
///
/// `RUST_LOG` overrides the level. Returns `false` if a global subscriber
/// was already set, which is left in place.
pub fn init_logging(debug: bool) -> bool {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .try_init()
        .is_ok()
}

/// Same as [`init_logging`] but emits one JSON object per line
pub fn init_json_logging(debug: bool) -> bool {
    let level = if debug { Level::DEBUG } else { Level::INFO };

    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .try_init()
        .is_ok()
}
