//! Engine ↔ Handlers Bridge
//!
//! The engine reports through [`EngineObserver`], which has no notion of a
//! request. Host apps implement [`Handlers`], where every call carries the
//! request id. The bridge sits in between and does nothing but add the id.
//!
//! ```text
//! Engine (worker thread)           Host app
//! ──────────────────────           ────────
//!   started()          ──────►  transfer_started(id)
//!   progress(p)        ──────►  transfer_progress(id, p)
//!   (returns result)   ──────►  transfer_complete(id, err)
//! ```
//!
//! When the host passes no handlers, no bridge is built and the engine runs
//! without an observer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use pocketdrop_core::{EngineObserver, Progress, TransferError};

use crate::registry::RequestId;

/// Capability interface implemented by the host application
///
/// Calls arrive on runtime worker threads, never on the thread that started
/// the transfer. For one request the order is: at most one
/// `transfer_started`, then any number of `transfer_progress`, then exactly
/// one `transfer_complete`.
pub trait Handlers: Send + Sync {
    fn transfer_started(&self, request_id: RequestId);

    fn transfer_progress(&self, request_id: RequestId, progress: Progress);

    /// `None` on success
    fn transfer_complete(&self, request_id: RequestId, error: Option<TransferError>);
}

/// Request-scoped adapter from engine callbacks to [`Handlers`]
pub struct HandlerBridge {
    request_id: RequestId,
    handlers: Arc<dyn Handlers>,
    completed: AtomicBool,
}

impl HandlerBridge {
    pub fn new(request_id: RequestId, handlers: Arc<dyn Handlers>) -> Self {
        Self {
            request_id,
            handlers,
            completed: AtomicBool::new(false),
        }
    }

    /// Build a bridge only if there is something to bridge to
    pub fn install(
        request_id: RequestId,
        handlers: Option<Arc<dyn Handlers>>,
    ) -> Option<Arc<HandlerBridge>> {
        handlers.map(|h| Arc::new(Self::new(request_id, h)))
    }

    /// Deliver the terminal result
    ///
    /// Only the first call reaches the host.
    pub fn complete(&self, result: Result<(), TransferError>) {
        if self.completed.swap(true, Ordering::AcqRel) {
            warn!("request {} completed twice, dropping {:?}", self.request_id, result);
            return;
        }
        self.handlers.transfer_complete(self.request_id, result.err());
    }
}

impl EngineObserver for HandlerBridge {
    fn started(&self) {
        self.handlers.transfer_started(self.request_id);
    }

    fn progress(&self, progress: Progress) {
        self.handlers.transfer_progress(self.request_id, progress);
    }
}
