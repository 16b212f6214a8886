//! Observable sets.
//!
//! Set-valued nodes hold an `Arc<BTreeSet<T>>`: cheap to clone into
//! listeners, compared by contents for the equality gate, and iterated in a
//! deterministic order. [`ObservableSet`] is simply a [`LiveExpression`]
//! over that value type, so listeners, dependencies, equality injection and
//! async modes all work unchanged; this module adds set-shaped constructors
//! and the mutable [`LiveSetVariable`].

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::expr::LiveExpression;
use crate::subscription::Subscription;
use crate::variable::LiveVariable;

/// An expression whose value is a shared, ordered set.
pub type ObservableSet<T> = LiveExpression<Arc<BTreeSet<T>>>;

impl<T> LiveExpression<Arc<BTreeSet<T>>>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    /// A set that never changes.
    pub fn constant_set(values: impl IntoIterator<Item = T>) -> Self {
        LiveExpression::constant(Arc::new(values.into_iter().collect()))
    }

    /// A derived set recomputed by `compute` on every refresh.
    pub fn computed_set<F>(initial: BTreeSet<T>, compute: F) -> Self
    where
        F: Fn() -> BTreeSet<T> + Send + Sync + 'static,
    {
        LiveExpression::computed(Arc::new(initial), move || Arc::new(compute()))
    }

    /// Like [`computed_set`](Self::computed_set) for computations that can
    /// fail; an `Err` keeps the previous contents and notifies nobody.
    pub fn computed_set_fallible<F>(initial: BTreeSet<T>, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<BTreeSet<T>> + Send + Sync + 'static,
    {
        LiveExpression::computed_fallible(Arc::new(initial), move || compute().map(Arc::new))
    }

    /// The current contents.
    pub fn values(&self) -> Arc<BTreeSet<T>> {
        self.get()
    }

    pub fn contains_value(&self, value: &T) -> bool {
        self.get().contains(value)
    }
}

/// A mutable observable set.
///
/// Mutations go through the usual equality gate: adding an element already
/// present, or removing one that is absent, notifies nobody.
#[derive(Clone)]
pub struct LiveSetVariable<T: Ord> {
    var: LiveVariable<Arc<BTreeSet<T>>>,
}

impl<T> LiveSetVariable<T>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            var: LiveVariable::new(Arc::new(BTreeSet::new())),
        }
    }

    pub fn with_values(values: impl IntoIterator<Item = T>) -> Self {
        Self {
            var: LiveVariable::new(Arc::new(values.into_iter().collect())),
        }
    }

    /// Inserts `value`, returning whether the set changed.
    pub fn add(&self, value: T) -> bool {
        let mut added = false;
        self.var.update(|set| {
            if !set.contains(&value) {
                Arc::make_mut(set).insert(value);
                added = true;
            }
        });
        added
    }

    /// Removes `value`, returning whether the set changed.
    pub fn remove(&self, value: &T) -> bool {
        let mut removed = false;
        self.var.update(|set| {
            if set.contains(value) {
                Arc::make_mut(set).remove(value);
                removed = true;
            }
        });
        removed
    }

    /// Replaces the whole contents in one notification.
    pub fn replace_all(&self, values: impl IntoIterator<Item = T>) {
        self.var.set(Arc::new(values.into_iter().collect()));
    }

    pub fn values(&self) -> Arc<BTreeSet<T>> {
        self.var.get()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.var.get().contains(value)
    }

    /// The expression view of this set, for `depends_on` and listeners.
    pub fn live(&self) -> &ObservableSet<T> {
        self.var.live()
    }

    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&ObservableSet<T>, &Arc<BTreeSet<T>>) + Send + Sync + 'static,
    {
        self.var.add_listener(listener)
    }
}

impl<T> Default for LiveSetVariable<T>
where
    T: Ord + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
