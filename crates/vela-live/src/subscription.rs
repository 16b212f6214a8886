//! Listener registration handles.

use std::fmt;

/// Undoes a listener registration when dropped or explicitly cancelled.
///
/// Returned by `add_listener`; holding the subscription is what keeps the
/// listener registered. [`cancel`](Self::cancel) unregisters immediately,
/// dropping does the same, and [`detach`](Self::detach) gives the listener
/// up to the node's lifetime instead. Cancelling a subscription whose node
/// is already gone is a no-op.
#[must_use = "dropping a subscription unregisters the listener; call detach() to keep it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A subscription with nothing to undo.
    pub(crate) fn inert() -> Self {
        Self { cancel: None }
    }

    /// Unregisters the listener now.
    ///
    /// No notification is delivered after this returns, except for a pass
    /// that had already snapshotted the listener list on another thread.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    /// Keeps the listener registered for as long as the node lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counting() -> (Subscription, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let hook = Arc::clone(&count);
        let subscription = Subscription::new(move || {
            hook.fetch_add(1, Ordering::SeqCst);
        });
        (subscription, count)
    }

    #[test]
    fn cancel_runs_the_teardown_once() {
        let (subscription, count) = counting();
        subscription.cancel();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_cancels() {
        let (subscription, count) = counting();
        drop(subscription);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn detach_skips_the_teardown() {
        let (subscription, count) = counting();
        subscription.detach();
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn inert_subscriptions_do_nothing() {
        let subscription = Subscription::inert();
        subscription.cancel();
    }
}
