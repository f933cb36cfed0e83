//! Pull-based transfer events
//!
//! An alternative to implementing [`Handlers`]: the launcher plugs an
//! [`EventChannel`] in as the handlers and gives the caller the matching
//! [`TransferEvents`] to read from. The channel is unbounded so a slow
//! reader never stalls the engine.

use tokio::sync::mpsc;

use pocketdrop_core::{Progress, TransferError};

use crate::bridge::Handlers;
use crate::registry::RequestId;

/// One lifecycle event of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Started,
    Progress(Progress),
    /// Always the last event; `None` on success
    Complete(Option<TransferError>),
}

impl TransferEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferEvent::Complete(_))
    }
}

/// Create a connected handlers/stream pair
pub fn event_channel() -> (EventChannel, TransferEvents) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventChannel { tx }, TransferEvents { rx, done: false })
}

/// [`Handlers`] implementation feeding a [`TransferEvents`] stream
#[derive(Debug, Clone)]
pub struct EventChannel {
    tx: mpsc::UnboundedSender<TransferEvent>,
}

impl EventChannel {
    fn push(&self, event: TransferEvent) {
        // Reader gone means nobody is interested any more
        let _ = self.tx.send(event);
    }
}

impl Handlers for EventChannel {
    fn transfer_started(&self, _request_id: RequestId) {
        self.push(TransferEvent::Started);
    }

    fn transfer_progress(&self, _request_id: RequestId, progress: Progress) {
        self.push(TransferEvent::Progress(progress));
    }

    fn transfer_complete(&self, _request_id: RequestId, error: Option<TransferError>) {
        self.push(TransferEvent::Complete(error));
    }
}

/// Events of a single request, ending after [`TransferEvent::Complete`]
#[derive(Debug)]
pub struct TransferEvents {
    rx: mpsc::UnboundedReceiver<TransferEvent>,
    done: bool,
}

impl TransferEvents {
    /// Wait for the next event. `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<TransferEvent> {
        if self.done {
            return None;
        }
        let event = self.rx.recv().await;
        self.observe(event)
    }

    /// Blocking variant for hosts without an async runtime
    ///
    /// # Panics
    /// Panics if called from within an async execution context.
    pub fn blocking_next(&mut self) -> Option<TransferEvent> {
        if self.done {
            return None;
        }
        let event = self.rx.blocking_recv();
        self.observe(event)
    }

    /// Next event if one is already queued
    pub fn try_next(&mut self) -> Option<TransferEvent> {
        if self.done {
            return None;
        }
        let event = self.rx.try_recv().ok();
        match event {
            Some(event) => self.observe(Some(event)),
            None => None,
        }
    }

    /// Skip ahead to the terminal result
    pub async fn finish(mut self) -> Result<(), TransferError> {
        while let Some(event) = self.next().await {
            if let TransferEvent::Complete(error) = event {
                return error.map_or(Ok(()), Err);
            }
        }
        Err(TransferError::Aborted("event stream closed before completion".into()))
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    fn observe(&mut self, event: Option<TransferEvent>) -> Option<TransferEvent> {
        match &event {
            Some(e) if e.is_terminal() => self.done = true,
            None => self.done = true,
            _ => {}
        }
        event
    }
}
