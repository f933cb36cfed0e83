//! Async launcher
//!
//! [`Launcher::send`] and [`Launcher::receive`] do all validation and engine
//! setup on the calling thread, then hand the transfer to the runtime and
//! return a [`TransferRequest`] immediately. Everything that happens after
//! that is reported through the request's [`Handlers`] (or its
//! [`TransferEvents`] stream).
//!
//! Each transfer runs as one task awaiting one blocking worker:
//!
//! ```text
//! caller thread                 runtime task               blocking worker
//! ─────────────                 ────────────               ───────────────
//! validate + translate
//! enumerate (send only)
//! build engine
//! register, mark running
//! spawn ───────────────────────► spawn_blocking ──────────► DiagnosticScope
//! return request                      │                     engine.send()
//!                                     │◄──────── result ────┘
//!                                complete (once)
//!                                release token
//! ```
//!
//! Completion and release live in a guard owned by the task. If the task is
//! dropped before the engine returns (runtime shut down, launcher dropped),
//! the guard still completes the request with [`TransferError::Aborted`] and
//! settles it as cancelled.

use std::path::Path;
use std::sync::Arc;

use tokio::runtime::{Builder, Handle, Runtime};
use tracing::{debug, error, info, warn};

use pocketdrop_core::{
    cancellation, validate_receive, validate_send, DiagnosticSink, EngineConfig, EngineContext,
    EngineFactory, EngineObserver, LaunchError, TransferEngine, TransferError, TransferOptions,
};

use crate::bridge::{HandlerBridge, Handlers};
use crate::diagnostics::{engine_sink, DiagnosticScope};
use crate::events::{event_channel, TransferEvents};
use crate::registry::{
    CancelOutcome, RequestId, RequestRegistry, TokenRelease, TransferKind, TransferRequest,
};

/// Engine built and registered, not yet running
struct Prepared<E> {
    engine: E,
    release: TokenRelease,
    bridge: Option<Arc<HandlerBridge>>,
    suppress: bool,
}

/// Terminal half of a running request
struct Completion {
    bridge: Option<Arc<HandlerBridge>>,
    release: TokenRelease,
    finished: bool,
}

impl Completion {
    fn finish(mut self, result: Result<(), TransferError>) {
        self.finished = true;
        if let Some(bridge) = &self.bridge {
            bridge.complete(result);
        }
    }
}

impl Drop for Completion {
    fn drop(&mut self) {
        if !self.finished {
            let id = self.release.request().id();
            warn!("request {} torn down before the engine returned", id);
            self.release.mark_cancelled();
            if let Some(bridge) = &self.bridge {
                bridge.complete(Err(TransferError::Aborted("launcher shut down".into())));
            }
        }
        // `release` drops after this, so the token is released last
    }
}

/// Starts transfers without blocking the caller
pub struct Launcher<F: EngineFactory> {
    factory: Arc<F>,
    registry: RequestRegistry,
    /// Present when the launcher created its own runtime
    runtime: Option<Runtime>,
    handle: Handle,
    /// Destination for engine output when suppression is off
    verbose_sink: DiagnosticSink,
}

impl<F: EngineFactory> Launcher<F> {
    /// Create a launcher with its own multi-threaded runtime
    ///
    /// For hosts with no async runtime of their own. Transfers still in
    /// flight when the launcher is dropped are abandoned without a
    /// completion call, so keep it alive for the life of the app.
    pub fn new(factory: F) -> std::io::Result<Self> {
        let runtime = Builder::new_multi_thread()
            .enable_all()
            .thread_name("pocketdrop")
            .build()?;
        let handle = runtime.handle().clone();

        Ok(Self {
            factory: Arc::new(factory),
            registry: RequestRegistry::new(),
            runtime: Some(runtime),
            handle,
            verbose_sink: DiagnosticSink::stderr(),
        })
    }

    /// Create a launcher that spawns onto an existing runtime
    pub fn with_handle(factory: F, handle: Handle) -> Self {
        Self {
            factory: Arc::new(factory),
            registry: RequestRegistry::new(),
            runtime: None,
            handle,
            verbose_sink: DiagnosticSink::stderr(),
        }
    }

    /// Where engines write when a request sets `debug_wrapper` (stderr by default)
    pub fn with_verbose_sink(mut self, sink: DiagnosticSink) -> Self {
        self.verbose_sink = sink;
        self
    }

    pub fn registry(&self) -> &RequestRegistry {
        &self.registry
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Send a file or folder
    ///
    /// Fails synchronously on an empty path, an empty secret, or an engine
    /// that rejects the configuration or cannot enumerate the path. In every
    /// failure case no handler is ever called.
    pub fn send(
        &self,
        path: impl AsRef<Path>,
        options: Option<TransferOptions>,
        handlers: Option<Arc<dyn Handlers>>,
    ) -> Result<TransferRequest, LaunchError> {
        let path = path.as_ref();
        let options = validate_send(path, options)?;
        check_role(&options, TransferKind::Send);
        let config = EngineConfig::from_options(&options);

        let files = self
            .factory
            .enumerate(&[path.to_path_buf()], config.zip_folder)?;
        debug!(
            "enumerated {:?}: {} files, {} empty folders, {} folders",
            path,
            files.files.len(),
            files.empty_folders.len(),
            files.folder_count
        );

        let prepared = self.prepare(TransferKind::Send, config, options.debug_wrapper, handlers)?;
        Ok(self.spawn(prepared, move |engine| engine.send(files)))
    }

    /// Receive from the peer holding the same shared secret
    pub fn receive(
        &self,
        options: TransferOptions,
        handlers: Option<Arc<dyn Handlers>>,
    ) -> Result<TransferRequest, LaunchError> {
        validate_receive(&options)?;
        check_role(&options, TransferKind::Receive);
        let config = EngineConfig::from_options(&options);

        let prepared =
            self.prepare(TransferKind::Receive, config, options.debug_wrapper, handlers)?;
        Ok(self.spawn(prepared, |engine| engine.receive()))
    }

    /// [`send`](Self::send), reporting through an event stream instead of handlers
    pub fn send_with_events(
        &self,
        path: impl AsRef<Path>,
        options: Option<TransferOptions>,
    ) -> Result<(TransferRequest, TransferEvents), LaunchError> {
        let (channel, events) = event_channel();
        let request = self.send(path, options, Some(Arc::new(channel)))?;
        Ok((request, events))
    }

    /// [`receive`](Self::receive), reporting through an event stream
    pub fn receive_with_events(
        &self,
        options: TransferOptions,
    ) -> Result<(TransferRequest, TransferEvents), LaunchError> {
        let (channel, events) = event_channel();
        let request = self.receive(options, Some(Arc::new(channel)))?;
        Ok((request, events))
    }

    /// Cancel by id, for hosts that only kept the number
    pub fn cancel(&self, id: RequestId) -> Option<CancelOutcome> {
        self.registry.cancel(id)
    }

    /// Cancel every transfer still running
    pub fn cancel_all(&self) -> usize {
        self.registry.cancel_all()
    }

    fn prepare(
        &self,
        kind: TransferKind,
        config: EngineConfig,
        debug_wrapper: bool,
        handlers: Option<Arc<dyn Handlers>>,
    ) -> Result<Prepared<F::Engine>, LaunchError> {
        let id = self.registry.next_id();
        let bridge = HandlerBridge::install(id, handlers);
        let (trigger, token) = cancellation();

        let context = EngineContext {
            cancel: token,
            observer: bridge.clone().map(|b| b as Arc<dyn EngineObserver>),
            diagnostics: engine_sink(debug_wrapper, &self.verbose_sink),
        };

        // Nothing is registered until the engine accepts the config
        let engine = self.factory.build(config, context).map_err(|e| {
            warn!("engine rejected configuration: {}", e);
            e
        })?;
        let (_request, release) = self.registry.register(id, kind, trigger);

        Ok(Prepared {
            engine,
            release,
            bridge,
            suppress: !debug_wrapper,
        })
    }

    fn spawn<R>(&self, prepared: Prepared<F::Engine>, run: R) -> TransferRequest
    where
        R: FnOnce(F::Engine) -> Result<(), TransferError> + Send + 'static,
    {
        let Prepared {
            engine,
            release,
            bridge,
            suppress,
        } = prepared;

        let request = release.request().clone();
        let id = request.id();
        release.mark_running();
        info!("request {} ({:?}) running", id, request.kind());

        let completion = Completion {
            bridge,
            release,
            finished: false,
        };

        self.handle.spawn(async move {
            let worker = tokio::task::spawn_blocking(move || {
                let _scope = DiagnosticScope::enter(suppress);
                run(engine)
            });

            let result = match worker.await {
                Ok(result) => result,
                Err(e) => {
                    error!("request {} worker died: {}", id, e);
                    Err(TransferError::Aborted(e.to_string()))
                }
            };

            match &result {
                Ok(()) => info!("request {} finished", id),
                Err(e) => warn!("request {} failed: {}", id, e),
            }

            completion.finish(result);
        });

        request
    }
}

impl<F: EngineFactory> Drop for Launcher<F> {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            let active = self.registry.active_count();
            if active > 0 {
                warn!("launcher dropped with {} transfers in flight, aborting", active);
            }
            // Safe to call from inside another runtime, unlike a plain drop
            runtime.shutdown_background();
        }
    }
}

/// The flag is passed to the engine as given; a mismatch is only logged
fn check_role(options: &TransferOptions, kind: TransferKind) -> bool {
    let matches = options.is_sender == (kind == TransferKind::Send);
    if !matches {
        warn!(
            "options say is_sender={} on a {:?} call",
            options.is_sender, kind
        );
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_role_leaves_flag_alone() {
        let options = TransferOptions::new();
        assert!(check_role(&options, TransferKind::Send));
        assert!(!check_role(&options, TransferKind::Receive));
        assert!(options.is_sender);

        let options = TransferOptions {
            is_sender: false,
            ..TransferOptions::new()
        };
        assert!(check_role(&options, TransferKind::Receive));
        assert!(!check_role(&options, TransferKind::Send));
    }
}
