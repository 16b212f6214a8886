//! Mutable leaves of the expression graph.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::expr::LiveExpression;
use crate::subscription::Subscription;

/// An observable value with a setter.
///
/// This is the binding point for outside input, a text widget for example:
/// the outside world writes with [`set`](Self::set) and anything derived
/// reacts through the underlying [`LiveExpression`], with the usual
/// equality gate (writing the value already held notifies nobody).
///
/// Cloning shares the same variable.
pub struct LiveVariable<V> {
    slot: Arc<Mutex<V>>,
    node: LiveExpression<V>,
}

impl<V> LiveVariable<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(initial: V) -> Self {
        let slot = Arc::new(Mutex::new(initial.clone()));
        let source = Arc::clone(&slot);
        let node = LiveExpression::computed(initial, move || source.lock().clone());
        Self { slot, node }
    }

    /// Writes `value` and refreshes, notifying listeners if it differs from
    /// the current value.
    pub fn set(&self, value: V) {
        *self.slot.lock() = value;
        self.node.refresh();
    }

    /// Mutates the value in place, then refreshes.
    pub fn update(&self, mutate: impl FnOnce(&mut V)) {
        let mut slot = self.slot.lock();
        mutate(&mut slot);
        drop(slot);
        self.node.refresh();
    }

    pub fn get(&self) -> V {
        self.node.get()
    }

    /// The expression view of this variable, for `depends_on`, `map` and
    /// friends.
    pub fn live(&self) -> &LiveExpression<V> {
        &self.node
    }

    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LiveExpression<V>, &V) + Send + Sync + 'static,
    {
        self.node.add_listener(listener)
    }
}

impl<V> Clone for LiveVariable<V> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            node: self.node.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for LiveVariable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LiveVariable").field(&*self.slot.lock()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded<V: Clone + PartialEq + Send + Sync + 'static>(
        variable: &LiveVariable<V>,
    ) -> (Subscription, Arc<Mutex<Vec<V>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = variable.add_listener(move |_, value| sink.lock().push(value.clone()));
        (subscription, seen)
    }

    #[test]
    fn set_then_get_round_trips() {
        let name = LiveVariable::new(String::new());
        name.set("vela".to_owned());
        assert_eq!(name.get(), "vela");
    }

    #[test]
    fn set_notifies_each_listener_once() {
        let counter = LiveVariable::new(0);
        let (subscription, seen) = recorded(&counter);
        counter.set(1);
        counter.set(2);
        assert_eq!(*seen.lock(), vec![0, 1, 2]);
        subscription.cancel();
    }

    #[test]
    fn setting_the_same_value_is_silent() {
        let counter = LiveVariable::new(7);
        let (subscription, seen) = recorded(&counter);
        counter.set(7);
        assert_eq!(*seen.lock(), vec![7]);
        subscription.cancel();
    }

    #[test]
    fn update_mutates_in_place() {
        let text = LiveVariable::new("ab".to_owned());
        let (subscription, seen) = recorded(&text);
        text.update(|value| value.push('c'));
        assert_eq!(text.get(), "abc");
        assert_eq!(*seen.lock(), vec!["ab", "abc"]);
        subscription.cancel();
    }

    #[test]
    fn clones_share_the_same_value() {
        let left = LiveVariable::new(1);
        let right = left.clone();
        left.set(5);
        assert_eq!(right.get(), 5);
    }

    #[test]
    fn derived_expressions_follow_the_variable() {
        let base = LiveVariable::new(2);
        let doubled = base.live().map(|value| value * 2);
        assert_eq!(doubled.get(), 4);
        base.set(6);
        assert_eq!(doubled.get(), 12);
    }
}
