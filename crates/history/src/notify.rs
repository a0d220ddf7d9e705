//! Presentation hooks fired by the stores.

/// Receives a notification after the history has been cleared.
///
/// Only called when the clear actually succeeded.
pub trait ClearNotifier: Send + Sync {
    fn history_cleared(&self);
}

/// Notifier that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl ClearNotifier for NoopNotifier {
    fn history_cleared(&self) {}
}
