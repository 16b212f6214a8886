//! Live expressions: observable values with equality-gated change
//! propagation.
//!
//! The building block is [`LiveExpression`], a node that caches a value,
//! recomputes it on [`refresh`](LiveExpression::refresh), and notifies
//! listeners only when the recomputed value actually differs. Nodes declare
//! what they read with [`depends_on`](LiveExpression::depends_on), so a
//! change at a leaf walks the graph depth-first and every affected node
//! settles in one synchronous pass. [`LiveVariable`] is the mutable leaf,
//! [`ObservableSet`] the set-shaped value, [`ValidationResult`] the usual
//! payload for input validation, and [`Refresher`] moves recomputation or
//! notification off the calling thread for nodes that ask for it.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use vela_live::LiveVariable;
//!
//! let celsius = LiveVariable::new(0i32);
//! let fahrenheit = celsius.live().map(|c| c * 9 / 5 + 32);
//!
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! let subscription = fahrenheit.add_listener(move |_, value| {
//!     sink.lock().unwrap().push(*value);
//! });
//!
//! celsius.set(100);
//! // Listeners get the current value on registration, then every change.
//! assert_eq!(*seen.lock().unwrap(), vec![32, 212]);
//! subscription.cancel();
//! ```

pub mod expr;
pub mod refresher;
pub mod set;
pub mod subscription;
pub mod validation;
pub mod variable;

pub use expr::{LiveExpression, MAX_REFRESH_DEPTH};
pub use refresher::{
    AsyncMode, Refresher, RefresherError, RefresherHandle, DEFAULT_QUEUE_CAPACITY,
    REFRESH_QUEUE_CAPACITY_ENV,
};
pub use set::{LiveSetVariable, ObservableSet};
pub use subscription::Subscription;
pub use validation::{validator, ValidationResult};
pub use variable::LiveVariable;
