//! Diagnostic suppression for one transfer
//!
//! Engines are noisy. Unless the caller asked for `debug_wrapper`, a
//! transfer gets a discard [`DiagnosticSink`] and its worker thread runs
//! inside a [`DiagnosticScope`] that silences `tracing` for the length of the
//! engine call. Both are scoped to the transfer: the sink belongs to one
//! engine instance, and the scope only affects the current thread and is
//! undone when the guard drops, including on early return or panic.

use tracing::subscriber::{DefaultGuard, NoSubscriber};

use pocketdrop_core::DiagnosticSink;

/// Pick the sink for an engine instance
///
/// `verbose` is where output goes when the caller opted out of suppression.
pub fn engine_sink(debug_wrapper: bool, verbose: &DiagnosticSink) -> DiagnosticSink {
    if debug_wrapper {
        verbose.clone()
    } else {
        DiagnosticSink::discard()
    }
}

/// RAII guard silencing `tracing` on the current thread
#[must_use = "suppression ends as soon as the scope is dropped"]
pub struct DiagnosticScope {
    guard: Option<DefaultGuard>,
}

impl DiagnosticScope {
    /// Enter a scope; with `suppress == false` this is a no-op guard
    pub fn enter(suppress: bool) -> Self {
        let guard = suppress.then(|| tracing::subscriber::set_default(NoSubscriber::default()));
        Self { guard }
    }

    pub fn is_suppressing(&self) -> bool {
        self.guard.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::dispatcher;
    use tracing_subscriber::Registry;

    fn current_is_silent() -> bool {
        dispatcher::get_default(|d| d.is::<NoSubscriber>())
    }

    fn current_is_registry() -> bool {
        dispatcher::get_default(|d| d.is::<Registry>())
    }

    #[test]
    fn test_scope_silences_and_restores() {
        let _outer = tracing::subscriber::set_default(tracing_subscriber::registry());
        assert!(current_is_registry());

        {
            let scope = DiagnosticScope::enter(true);
            assert!(scope.is_suppressing());
            assert!(current_is_silent());
        }

        assert!(current_is_registry());
    }

    #[test]
    fn test_scope_disabled_leaves_dispatcher_alone() {
        let _outer = tracing::subscriber::set_default(tracing_subscriber::registry());

        let scope = DiagnosticScope::enter(false);
        assert!(!scope.is_suppressing());
        assert!(current_is_registry());
    }

    #[test]
    fn test_scope_restores_after_panic() {
        let _outer = tracing::subscriber::set_default(tracing_subscriber::registry());

        let result = std::panic::catch_unwind(|| {
            let _scope = DiagnosticScope::enter(true);
            panic!("engine blew up");
        });
        assert!(result.is_err());
        assert!(current_is_registry());
    }

    #[test]
    fn test_engine_sink_choice() {
        let verbose = DiagnosticSink::stderr();
        assert!(engine_sink(false, &verbose).is_discard());
        assert!(!engine_sink(true, &verbose).is_discard());
    }
}
