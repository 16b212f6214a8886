//! The live expression node.
//!
//! # Model
//!
//! A [`LiveExpression`] is a shared handle to one node in a directed acyclic
//! graph of observable values. Each node caches its last computed value.
//! [`refresh`](LiveExpression::refresh) runs the node's compute closure and,
//! only when the result differs from the cache under the node's equality,
//! stores it and notifies listeners in registration order. Dependencies are
//! declared with [`depends_on`](LiveExpression::depends_on): a change to the
//! upstream node refreshes the dependent during the upstream's notification
//! pass, so changes propagate depth-first through the graph.
//!
//! Constants are a degenerate node with no bookkeeping at all: they never
//! change, never notify, and refreshing them does nothing.
//!
//! # Locking and reentrancy
//!
//! Every node guards its state with a mutex, but user code never runs under
//! it: compute closures run before the lock is taken and listeners run on a
//! snapshot after it is released. A listener may therefore re-enter the node
//! freely, for example to refresh it or register another listener. Two
//! consequences of the snapshot are worth knowing: a listener cancelled
//! during a notification pass can still receive that pass, and a listener
//! that panics aborts notification of the listeners after it. The injected
//! equality closure is the one piece of user code that runs under the lock;
//! it must not touch the node.
//!
//! # Cycles
//!
//! The graph must stay acyclic. A cycle shows up as unbounded recursive
//! refreshing, so a thread-local depth counter panics after
//! [`MAX_REFRESH_DEPTH`] nested refreshes to make the failure immediate
//! instead of a stack overflow.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::refresher::{AsyncMode, Refresher, RefresherHandle};
use crate::subscription::Subscription;

/// Nested refresh depth at which propagation assumes a dependency cycle and
/// panics.
pub const MAX_REFRESH_DEPTH: usize = 256;

thread_local! {
    static REFRESH_DEPTH: Cell<usize> = const { Cell::new(0) };
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        REFRESH_DEPTH.with(|depth| {
            let next = depth.get() + 1;
            assert!(
                next <= MAX_REFRESH_DEPTH,
                "refresh exceeded {MAX_REFRESH_DEPTH} nested levels; \
                 live expression dependencies form a cycle"
            );
            depth.set(next);
        });
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        REFRESH_DEPTH.with(|depth| depth.set(depth.get() - 1));
    }
}

type Compute<V> = Arc<dyn Fn() -> anyhow::Result<V> + Send + Sync>;
type Equals<V> = Box<dyn Fn(&V, &V) -> bool + Send>;
type Listener<V> = Arc<dyn Fn(&LiveExpression<V>, &V) + Send + Sync>;

struct ListenerEntry<V> {
    id: u64,
    listener: Listener<V>,
}

struct NodeState<V> {
    value: V,
    /// `None` means the cached value only changes through outside writes
    /// (see `LiveVariable`); refreshing such a node is a no-op.
    compute: Option<Compute<V>>,
    equals: Equals<V>,
    listeners: Vec<ListenerEntry<V>>,
    next_listener_id: u64,
    /// Subscriptions held on upstream nodes. Dropping the node drops these,
    /// which unhooks it from everything it depended on.
    upstream: Vec<Subscription>,
    refresh_mode: AsyncMode,
    events_mode: AsyncMode,
    refresher: Option<RefresherHandle>,
}

struct NodeShared<V> {
    state: Mutex<NodeState<V>>,
    /// Set while an async refresh is queued; coalesces bursts into one job.
    refresh_pending: AtomicBool,
}

enum Repr<V> {
    Constant(Arc<V>),
    Node(Arc<NodeShared<V>>),
}

/// A shared handle to an observable value; see the [module docs](self).
pub struct LiveExpression<V> {
    repr: Repr<V>,
}

impl<V> Clone for LiveExpression<V> {
    fn clone(&self) -> Self {
        let repr = match &self.repr {
            Repr::Constant(value) => Repr::Constant(Arc::clone(value)),
            Repr::Node(node) => Repr::Node(Arc::clone(node)),
        };
        Self { repr }
    }
}

impl<V: fmt::Debug> fmt::Debug for LiveExpression<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("LiveExpression");
        match &self.repr {
            Repr::Constant(value) => dbg.field("constant", value).finish(),
            Repr::Node(node) => dbg.field("value", &node.state.lock().value).finish(),
        }
    }
}

impl<V> LiveExpression<V> {
    /// A value that never changes.
    ///
    /// Refreshing is a no-op and nothing is ever stored for listeners: each
    /// `add_listener` call delivers the value once and returns an inert
    /// subscription.
    pub fn constant(value: V) -> Self {
        Self {
            repr: Repr::Constant(Arc::new(value)),
        }
    }
}

impl<V> LiveExpression<V>
where
    V: Clone + PartialEq + Send + Sync + 'static,
{
    /// A node holding `initial` with no compute closure.
    ///
    /// Its value only moves when something outside the node writes it, so
    /// `refresh` is a no-op. This is the building block for mutable leaves
    /// like [`LiveVariable`](crate::LiveVariable).
    pub fn with_value(initial: V) -> Self {
        Self::node(initial, None)
    }

    /// A derived node recomputed by `compute` on every refresh.
    ///
    /// `compute` is not called here; the node reports `initial` until the
    /// first refresh. Chain [`depends_on`](Self::depends_on) to refresh it
    /// whenever its inputs change.
    pub fn computed<F>(initial: V, compute: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self::node(initial, Some(Arc::new(move || Ok(compute()))))
    }

    /// Like [`computed`](Self::computed) for computations that can fail.
    ///
    /// An `Err` refresh logs a warning, keeps the previous value, and
    /// notifies nobody; the next successful refresh resumes normal
    /// behavior.
    pub fn computed_fallible<F>(initial: V, compute: F) -> Self
    where
        F: Fn() -> anyhow::Result<V> + Send + Sync + 'static,
    {
        Self::node(initial, Some(Arc::new(compute)))
    }

    fn node(initial: V, compute: Option<Compute<V>>) -> Self {
        Self {
            repr: Repr::Node(Arc::new(NodeShared {
                state: Mutex::new(NodeState {
                    value: initial,
                    compute,
                    equals: Box::new(|a: &V, b: &V| a == b),
                    listeners: Vec::new(),
                    next_listener_id: 0,
                    upstream: Vec::new(),
                    refresh_mode: AsyncMode::Sync,
                    events_mode: AsyncMode::Sync,
                    refresher: None,
                }),
                refresh_pending: AtomicBool::new(false),
            })),
        }
    }
}

impl<V> LiveExpression<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn from_shared(shared: Arc<NodeShared<V>>) -> Self {
        Self {
            repr: Repr::Node(shared),
        }
    }

    /// Replaces the equality used to decide whether a refresh changed the
    /// value.
    ///
    /// The closure runs under the node's lock and must not touch the node.
    pub fn with_equality<F>(self, equals: F) -> Self
    where
        F: Fn(&V, &V) -> bool + Send + 'static,
    {
        if let Repr::Node(node) = &self.repr {
            node.state.lock().equals = Box::new(equals);
        }
        self
    }

    /// Chooses where this node recomputes and where it notifies.
    ///
    /// Plain constructors default to synchronous on both sides. The node
    /// keeps a handle to the refresher; if the refresher shuts down or its
    /// queue fills up, the node falls back to doing the work on the calling
    /// thread.
    pub fn with_modes(
        self,
        refresher: &Refresher,
        refresh_mode: AsyncMode,
        events_mode: AsyncMode,
    ) -> Self {
        if let Repr::Node(node) = &self.repr {
            let mut state = node.state.lock();
            state.refresh_mode = refresh_mode;
            state.events_mode = events_mode;
            state.refresher = Some(refresher.handle());
        }
        self
    }

    /// Returns a clone of the cached value without recomputing.
    pub fn get(&self) -> V {
        match &self.repr {
            Repr::Constant(value) => V::clone(value),
            Repr::Node(node) => node.state.lock().value.clone(),
        }
    }

    /// Recomputes the value and notifies listeners if it changed.
    ///
    /// In [`AsyncMode::Async`] refresh mode this only queues the recompute;
    /// a burst of refresh requests while one is queued collapses into a
    /// single recompute that reads the inputs current at that time.
    pub fn refresh(&self) {
        let Repr::Node(node) = &self.repr else { return };
        let (mode, handle) = {
            let state = node.state.lock();
            (state.refresh_mode, state.refresher.clone())
        };
        match (mode, handle) {
            (AsyncMode::Async, Some(handle)) => self.refresh_async(node, &handle),
            _ => self.refresh_sync(),
        }
    }

    fn refresh_async(&self, node: &Arc<NodeShared<V>>, handle: &RefresherHandle) {
        if node.refresh_pending.swap(true, Ordering::AcqRel) {
            return;
        }
        let target = self.clone();
        let submitted = handle.submit(move || {
            let Repr::Node(node) = &target.repr else { return };
            // Clear before recomputing so a request arriving mid-compute
            // queues another pass instead of being lost.
            node.refresh_pending.store(false, Ordering::Release);
            target.refresh_sync();
        });
        if let Err(error) = submitted {
            node.refresh_pending.store(false, Ordering::Release);
            tracing::warn!(
                target: "vela.live",
                error = %error,
                "async refresh submission failed; refreshing on the calling thread"
            );
            self.refresh_sync();
        }
    }

    fn refresh_sync(&self) {
        let Repr::Node(node) = &self.repr else { return };
        let _depth = DepthGuard::enter();

        let compute = node.state.lock().compute.clone();
        let Some(compute) = compute else { return };
        let next = match compute() {
            Ok(next) => next,
            Err(error) => {
                tracing::warn!(
                    target: "vela.live",
                    error = %error,
                    "compute failed; keeping the previous value"
                );
                return;
            }
        };

        let changed = {
            let mut state = node.state.lock();
            if (state.equals)(&state.value, &next) {
                None
            } else {
                state.value = next.clone();
                let listeners: Vec<Listener<V>> = state
                    .listeners
                    .iter()
                    .map(|entry| Arc::clone(&entry.listener))
                    .collect();
                Some((state.events_mode, state.refresher.clone(), listeners))
            }
        };
        let Some((events_mode, refresher, listeners)) = changed else {
            return;
        };

        match (events_mode, refresher) {
            (AsyncMode::Async, Some(handle)) => {
                let target = self.clone();
                let queued_listeners = listeners.clone();
                let queued_value = next.clone();
                let submitted = handle.submit(move || {
                    notify_all(&target, &queued_listeners, &queued_value);
                });
                if let Err(error) = submitted {
                    tracing::warn!(
                        target: "vela.live",
                        error = %error,
                        "async notification submission failed; notifying on the calling thread"
                    );
                    notify_all(self, &listeners, &next);
                }
            }
            _ => notify_all(self, &listeners, &next),
        }
    }

    /// Registers `listener` and immediately invokes it once with the current
    /// value, so new listeners never wait for the next change to
    /// synchronize. The immediate call is synchronous regardless of the
    /// events mode.
    ///
    /// Listeners run in registration order. A panicking listener unwinds
    /// through the notification pass, skipping the listeners registered
    /// after it.
    pub fn add_listener<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&LiveExpression<V>, &V) + Send + Sync + 'static,
    {
        match &self.repr {
            Repr::Constant(value) => {
                listener(self, &**value);
                Subscription::inert()
            }
            Repr::Node(node) => {
                let listener: Listener<V> = Arc::new(listener);
                let (id, current) = {
                    let mut state = node.state.lock();
                    let id = state.next_listener_id;
                    state.next_listener_id += 1;
                    state.listeners.push(ListenerEntry {
                        id,
                        listener: Arc::clone(&listener),
                    });
                    (id, state.value.clone())
                };
                listener(self, &current);

                let node = Arc::downgrade(node);
                Subscription::new(move || {
                    if let Some(node) = node.upgrade() {
                        node.state.lock().listeners.retain(|entry| entry.id != id);
                    }
                })
            }
        }
    }

    /// Declares that this node must refresh whenever `upstream` changes.
    ///
    /// Returns the node so multiple dependencies chain fluently. The hook
    /// holds only a weak reference back to this node, and the registration
    /// on `upstream` is owned by this node, so dropping either side cleans
    /// up without leaking.
    ///
    /// Registering fires the hook's immediate initial notification, which
    /// runs one refresh; the node leaves this call already computed from
    /// current inputs.
    pub fn depends_on<U>(self, upstream: &LiveExpression<U>) -> Self
    where
        U: Clone + Send + Sync + 'static,
    {
        let Repr::Node(node) = &self.repr else {
            return self;
        };
        let hook = Arc::downgrade(node);
        let subscription = upstream.add_listener(move |_, _| {
            if let Some(node) = hook.upgrade() {
                LiveExpression::from_shared(node).refresh();
            }
        });
        node.state.lock().upstream.push(subscription);
        self
    }

    /// A derived node holding `f` of this node's value.
    pub fn map<U, F>(&self, f: F) -> LiveExpression<U>
    where
        U: Clone + PartialEq + Send + Sync + 'static,
        F: Fn(&V) -> U + Send + Sync + 'static,
    {
        let source = self.clone();
        let initial = f(&source.get());
        LiveExpression::computed(initial, move || f(&source.get())).depends_on(self)
    }

    /// A derived node holding this node's value while `predicate` accepts
    /// it, and `None` otherwise.
    pub fn filter<P>(&self, predicate: P) -> LiveExpression<Option<V>>
    where
        V: PartialEq,
        P: Fn(&V) -> bool + Send + Sync + 'static,
    {
        self.map(move |value| predicate(value).then(|| value.clone()))
    }
}

fn notify_all<V>(node: &LiveExpression<V>, listeners: &[Listener<V>], value: &V) {
    for listener in listeners {
        listener(node, value);
    }
}
