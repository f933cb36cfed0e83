//! Cooperative cancellation
//!
//! A [`CancelTrigger`] and its [`CancellationToken`]s share one flag that
//! only ever goes from clear to set. The engine polls or awaits the token;
//! nothing is forcibly stopped.

use tokio::sync::watch;

/// Create a connected trigger/token pair
pub fn cancellation() -> (CancelTrigger, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancelTrigger { tx }, CancellationToken { rx })
}

/// Owning side of a cancellation flag
#[derive(Debug)]
pub struct CancelTrigger {
    tx: watch::Sender<bool>,
}

impl CancelTrigger {
    /// Set the flag. Returns `false` if it was already set.
    pub fn cancel(&self) -> bool {
        self.tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        })
    }
}

/// Observing side of a cancellation flag, handed to the engine
#[derive(Debug, Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    /// Non-blocking check, for engines that poll between chunks
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the flag is set
    ///
    /// Also resolves if the trigger is dropped, since nobody is left to
    /// keep the transfer alive.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_one_shot() {
        let (trigger, token) = cancellation();
        assert!(!token.is_cancelled());

        assert!(trigger.cancel());
        assert!(token.is_cancelled());

        // Second call changes nothing
        assert!(!trigger.cancel());
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let (trigger, token) = cancellation();
        let cloned = token.clone();

        trigger.cancel();
        assert!(token.is_cancelled());
        assert!(cloned.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves() {
        let (trigger, token) = cancellation();

        let waiter = tokio::spawn(async move { token.cancelled().await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        trigger.cancel();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("token did not observe cancel")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_trigger_dropped() {
        let (trigger, token) = cancellation();
        drop(trigger);
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .expect("dropped trigger should release waiters");
    }
}
