//! Transfer engine contract
//!
//! PocketDrop does not speak the transfer protocol itself. Key exchange,
//! relay negotiation, chunking and hashing all live behind these traits:
//!
//! 1. [`EngineFactory::enumerate`] turns the source path into engine
//!    metadata (called on the caller's thread)
//! 2. [`EngineFactory::build`] validates the translated configuration and
//!    binds the engine to its cancellation token, observer and sink
//! 3. [`TransferEngine::send`] / [`TransferEngine::receive`] block until the
//!    transfer ends (called on a worker thread)

use std::path::PathBuf;
use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::diagnostics::DiagnosticSink;
use crate::error::{ConfigurationError, EnumerationError, TransferError};
use crate::translate::EngineConfig;

/// Byte and time counters reported while a transfer runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    /// Size of the item currently being transferred
    pub file_size: u64,
    /// Bytes of the current item done so far
    pub bytes_transferred: u64,
    /// Time spent on the current item
    pub ms_elapsed: u64,
    /// Bytes done across all items
    pub total_bytes_transferred: u64,
    /// Time spent across all items
    pub total_ms_elapsed: u64,
}

/// Callbacks the engine fires while running
///
/// These know nothing about request ids. Engines call `started` at most
/// once, and only call `progress` after it.
pub trait EngineObserver: Send + Sync {
    fn started(&self);
    fn progress(&self, progress: Progress);
}

/// Result of enumerating a source path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enumeration<M> {
    /// Files to send, in the engine's own metadata form
    pub files: Vec<M>,
    /// Folders with nothing in them, recreated on the receiving side
    pub empty_folders: Vec<M>,
    /// Number of folders walked
    pub folder_count: usize,
}

/// Everything an engine instance is bound to at construction
pub struct EngineContext {
    /// Checked by the engine; set when the request is cancelled or released
    pub cancel: CancellationToken,
    /// `None` when the caller supplied no handlers
    pub observer: Option<Arc<dyn EngineObserver>>,
    /// Where the engine writes its diagnostics
    pub diagnostics: DiagnosticSink,
}

impl EngineContext {
    pub fn notify_started(&self) {
        if let Some(observer) = &self.observer {
            observer.started();
        }
    }

    pub fn notify_progress(&self, progress: Progress) {
        if let Some(observer) = &self.observer {
            observer.progress(progress);
        }
    }
}

/// A single-use engine instance
pub trait TransferEngine: Send + 'static {
    /// Per-file metadata produced by enumeration
    type Metadata: Send + 'static;

    /// Send the enumerated files. Blocks until done, failed or cancelled.
    fn send(self, files: Enumeration<Self::Metadata>) -> Result<(), TransferError>;

    /// Receive whatever the peer with the same secret sends
    fn receive(self) -> Result<(), TransferError>;
}

/// Builds engine instances and enumerates sources for them
pub trait EngineFactory: Send + Sync + 'static {
    type Engine: TransferEngine;

    fn enumerate(
        &self,
        paths: &[PathBuf],
        zip_folder: bool,
    ) -> Result<Enumeration<<Self::Engine as TransferEngine>::Metadata>, EnumerationError>;

    fn build(
        &self,
        config: EngineConfig,
        context: EngineContext,
    ) -> Result<Self::Engine, ConfigurationError>;
}
