//! PocketDrop Mobile - Non-blocking transfer requests for host apps
//!
//! This crate provides:
//! - A launcher that validates a transfer, builds the engine, and returns a
//!   request handle before any network work starts
//! - A registry of in-flight requests with one-shot cooperative cancellation
//! - A bridge from the engine's id-less callbacks to request-scoped handlers
//! - Per-transfer diagnostic suppression
//!
//! # Architecture
//!
//! The key challenge is keeping the host's thread free while a blocking
//! engine call runs, and still telling the host which request an event
//! belongs to:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                Host thread (UI / FFI caller)                │
//! │  send() / receive() → TransferRequest, returns immediately  │
//! └─────────────────────────────┬───────────────────────────────┘
//!                               │ tokio task per request
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  Tokio Runtime (async)                      │
//! │  - spawn_blocking worker running the engine                 │
//! │  - HandlerBridge: started/progress → Handlers(id, ...)      │
//! │  - exactly one transfer_complete, then token release        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod bridge;
pub mod diagnostics;
pub mod events;
pub mod launcher;
pub mod registry;

pub use bridge::{HandlerBridge, Handlers};
pub use diagnostics::DiagnosticScope;
pub use events::{event_channel, EventChannel, TransferEvent, TransferEvents};
pub use launcher::Launcher;
pub use registry::{
    CancelOutcome, RequestId, RequestRegistry, RequestState, TokenRelease, TransferKind,
    TransferRequest,
};

pub use pocketdrop_core::{
    new_options, DiagnosticSink, LaunchError, Progress, TransferError, TransferOptions,
};
