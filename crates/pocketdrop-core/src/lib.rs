//! PocketDrop Core - Options, engine contract, and shared types
//!
//! This crate holds everything both sides of the transfer engine boundary
//! agree on. It does no transferring and spawns nothing.

pub mod cancel;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod logging;
pub mod options;
pub mod secret;
pub mod translate;

pub use cancel::{cancellation, CancelTrigger, CancellationToken};
pub use diagnostics::DiagnosticSink;
pub use engine::{
    EngineContext, EngineFactory, EngineObserver, Enumeration, Progress, TransferEngine,
};
pub use error::*;
pub use options::{new_options, TransferOptions};
pub use secret::{generate_secret, try_generate_secret};
pub use translate::{validate_receive, validate_send, EngineConfig};
