//! Request registry
//!
//! Every send or receive call gets a [`TransferRequest`]: an id, a kind, and
//! the cancel trigger the engine's token is tied to. The registry hands out
//! ids from a counter and keeps a table of requests that have not yet been
//! released, so a host holding only the numeric id can still cancel.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──mark_running──► Running ──release──► Completed
//!                              │
//!                   cancel() or unit dropped
//!                              ▼
//!                          Cancelled ──release──► Cancelled (removed)
//! ```
//!
//! Cancel and release are serialized on the request's state lock, so
//! whichever arrives first decides the terminal state. A cancel that loses
//! the race is reported as [`CancelOutcome::AlreadyFinished`] and ignored.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use pocketdrop_core::CancelTrigger;

/// Identifier of one transfer attempt, unique per registry
pub type RequestId = u64;

/// Direction of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferKind {
    Send,
    Receive,
}

/// Where a request is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    /// Allocated, engine not yet running
    Created,
    /// Engine call in flight
    Running,
    /// Engine call returned, whatever its result
    Completed,
    /// Cancel was requested before the engine returned
    Cancelled,
}

/// What a call to [`TransferRequest::cancel`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// This call signalled the engine
    Requested,
    /// An earlier call already did
    AlreadyRequested,
    /// The transfer had already ended; nothing was signalled
    AlreadyFinished,
}

#[derive(Debug)]
struct RequestShared {
    id: RequestId,
    kind: TransferKind,
    state: Mutex<RequestState>,
    trigger: CancelTrigger,
}

/// Handle to one transfer attempt
#[derive(Debug, Clone)]
pub struct TransferRequest {
    shared: Arc<RequestShared>,
}

impl TransferRequest {
    pub fn id(&self) -> RequestId {
        self.shared.id
    }

    pub fn kind(&self) -> TransferKind {
        self.shared.kind
    }

    pub fn state(&self) -> RequestState {
        *self.shared.state.lock()
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == RequestState::Cancelled
    }

    /// Ask the engine to stop
    ///
    /// Cooperative: the engine decides when it notices, and the completion
    /// handler still fires exactly once afterwards.
    pub fn cancel(&self) -> CancelOutcome {
        let mut state = self.shared.state.lock();
        match *state {
            RequestState::Created | RequestState::Running => {
                *state = RequestState::Cancelled;
                self.shared.trigger.cancel();
                debug!("request {} cancel requested", self.shared.id);
                CancelOutcome::Requested
            }
            RequestState::Cancelled => CancelOutcome::AlreadyRequested,
            RequestState::Completed => CancelOutcome::AlreadyFinished,
        }
    }
}

/// Release side of a request, owned by the unit running the transfer
///
/// Dropping it (or calling [`release`](Self::release)) ends the request:
/// the state settles, the token is released and the registry entry goes
/// away. Ownership makes this happen exactly once.
#[derive(Debug)]
pub struct TokenRelease {
    request: TransferRequest,
    registry: RequestRegistry,
}

impl TokenRelease {
    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    /// Created → Running
    pub fn mark_running(&self) {
        let mut state = self.request.shared.state.lock();
        if *state == RequestState::Created {
            *state = RequestState::Running;
        }
    }

    /// Settle as `Cancelled` ahead of release, for a unit torn down before
    /// the engine returned
    pub fn mark_cancelled(&self) {
        let mut state = self.request.shared.state.lock();
        if matches!(*state, RequestState::Created | RequestState::Running) {
            *state = RequestState::Cancelled;
        }
    }

    pub fn release(self) {
        drop(self);
    }
}

impl Drop for TokenRelease {
    fn drop(&mut self) {
        let shared = &self.request.shared;
        {
            let mut state = shared.state.lock();
            if matches!(*state, RequestState::Created | RequestState::Running) {
                *state = RequestState::Completed;
            }
            debug!("request {} released as {:?}", shared.id, *state);
        }
        // Any engine clone of the token still around sees a closed request
        shared.trigger.cancel();
        self.registry.inner.active.remove(&shared.id);
    }
}

#[derive(Debug)]
struct RegistryInner {
    next_id: AtomicU64,
    active: DashMap<RequestId, TransferRequest>,
}

/// Allocates ids and tracks unreleased requests
#[derive(Debug, Clone)]
pub struct RequestRegistry {
    inner: Arc<RegistryInner>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                next_id: AtomicU64::new(1),
                active: DashMap::new(),
            }),
        }
    }

    /// Reserve the next id
    ///
    /// Ids reserved by calls that later fail validation are simply skipped.
    pub fn next_id(&self) -> RequestId {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a request in the `Created` state
    pub fn register(
        &self,
        id: RequestId,
        kind: TransferKind,
        trigger: CancelTrigger,
    ) -> (TransferRequest, TokenRelease) {
        let request = TransferRequest {
            shared: Arc::new(RequestShared {
                id,
                kind,
                state: Mutex::new(RequestState::Created),
                trigger,
            }),
        };
        self.inner.active.insert(id, request.clone());
        debug!("request {} registered ({:?})", id, kind);

        let release = TokenRelease {
            request: request.clone(),
            registry: self.clone(),
        };
        (request, release)
    }

    pub fn get(&self, id: RequestId) -> Option<TransferRequest> {
        self.inner.active.get(&id).map(|entry| entry.value().clone())
    }

    /// State of an unreleased request
    pub fn state(&self, id: RequestId) -> Option<RequestState> {
        self.get(id).map(|request| request.state())
    }

    /// Cancel by id. `None` if the id is unknown or already released.
    pub fn cancel(&self, id: RequestId) -> Option<CancelOutcome> {
        // Clone out first so the shard lock is not held while cancelling
        let request = self.get(id)?;
        Some(request.cancel())
    }

    /// Cancel everything still running, returning how many were signalled
    pub fn cancel_all(&self) -> usize {
        let requests: Vec<TransferRequest> = self
            .inner
            .active
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        requests
            .iter()
            .filter(|r| r.cancel() == CancelOutcome::Requested)
            .count()
    }

    pub fn active_count(&self) -> usize {
        self.inner.active.len()
    }

    pub fn active_ids(&self) -> Vec<RequestId> {
        let mut ids: Vec<RequestId> = self.inner.active.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocketdrop_core::cancellation;

    fn start(registry: &RequestRegistry, kind: TransferKind) -> (TransferRequest, TokenRelease) {
        let id = registry.next_id();
        let (trigger, _token) = cancellation();
        let (request, release) = registry.register(id, kind, trigger);
        release.mark_running();
        (request, release)
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = RequestRegistry::new();
        let ids: Vec<RequestId> = (0..100).map(|_| registry.next_id()).collect();
        let mut deduped = ids.clone();
        deduped.dedup();
        assert_eq!(ids, deduped);
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_register_and_release() {
        let registry = RequestRegistry::new();
        let id = registry.next_id();
        let (trigger, token) = cancellation();
        let (request, release) = registry.register(id, TransferKind::Send, trigger);

        assert_eq!(request.state(), RequestState::Created);
        assert_eq!(request.kind(), TransferKind::Send);
        assert_eq!(registry.active_ids(), vec![id]);

        release.mark_running();
        assert_eq!(request.state(), RequestState::Running);

        release.release();
        assert_eq!(request.state(), RequestState::Completed);
        assert_eq!(registry.active_count(), 0);
        // Token is released with the request
        assert!(token.is_cancelled());
        // Completed is not the same as cancelled
        assert!(!request.is_cancelled());
    }

    #[test]
    fn test_cancel_signals_token() {
        let registry = RequestRegistry::new();
        let id = registry.next_id();
        let (trigger, token) = cancellation();
        let (request, release) = registry.register(id, TransferKind::Receive, trigger);
        release.mark_running();

        assert_eq!(request.cancel(), CancelOutcome::Requested);
        assert!(token.is_cancelled());
        assert_eq!(request.state(), RequestState::Cancelled);
    }

    #[test]
    fn test_double_cancel() {
        let registry = RequestRegistry::new();
        let (request, _release) = start(&registry, TransferKind::Send);

        assert_eq!(request.cancel(), CancelOutcome::Requested);
        assert_eq!(request.cancel(), CancelOutcome::AlreadyRequested);
        assert_eq!(request.state(), RequestState::Cancelled);
    }

    #[test]
    fn test_cancel_after_completion_is_ignored() {
        let registry = RequestRegistry::new();
        let (request, release) = start(&registry, TransferKind::Send);
        release.release();

        assert_eq!(request.cancel(), CancelOutcome::AlreadyFinished);
        assert_eq!(request.state(), RequestState::Completed);
    }

    #[test]
    fn test_cancelled_stays_cancelled_after_release() {
        let registry = RequestRegistry::new();
        let (request, release) = start(&registry, TransferKind::Send);
        request.cancel();
        drop(release);

        assert_eq!(request.state(), RequestState::Cancelled);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(request.cancel(), CancelOutcome::AlreadyRequested);
    }

    #[test]
    fn test_cancel_by_id() {
        let registry = RequestRegistry::new();
        let (request, release) = start(&registry, TransferKind::Send);

        assert_eq!(registry.cancel(request.id()), Some(CancelOutcome::Requested));
        assert!(registry.get(request.id()).unwrap().is_cancelled());

        release.release();
        assert_eq!(registry.cancel(request.id()), None);
        assert_eq!(registry.cancel(9999), None);
    }

    #[test]
    fn test_cancel_all() {
        let registry = RequestRegistry::new();
        let (a, _ra) = start(&registry, TransferKind::Send);
        let (b, _rb) = start(&registry, TransferKind::Receive);
        let (_c, _rc) = start(&registry, TransferKind::Send);
        a.cancel();

        assert_eq!(registry.cancel_all(), 2);
        assert!(b.is_cancelled());
        assert_eq!(registry.active_count(), 3);
    }

    #[test]
    fn test_state_by_id() {
        let registry = RequestRegistry::new();
        let id = registry.next_id();
        let (trigger, _token) = cancellation();
        let (_request, release) = registry.register(id, TransferKind::Receive, trigger);

        assert_eq!(registry.state(id), Some(RequestState::Created));
        release.mark_running();
        assert_eq!(registry.state(id), Some(RequestState::Running));

        release.release();
        assert_eq!(registry.state(id), None);
    }

    #[test]
    fn test_mark_cancelled_before_release() {
        let registry = RequestRegistry::new();
        let (request, release) = start(&registry, TransferKind::Send);

        release.mark_cancelled();
        assert_eq!(request.state(), RequestState::Cancelled);
        assert_eq!(request.cancel(), CancelOutcome::AlreadyRequested);

        release.release();
        assert_eq!(request.state(), RequestState::Cancelled);
        assert_eq!(registry.active_count(), 0);
    }
}
