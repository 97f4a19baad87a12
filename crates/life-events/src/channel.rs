//! Ordered, synchronous listener lists.
//!
//! An [`EventChannel`] is the only coupling between the simulation engine and
//! whoever observes it. Listeners are plain closures attached at runtime;
//! [`EventChannel::notify`] calls every one of them, in attachment order,
//! before returning.
//!
//! # Rules
//!
//! - **Ordered**: listeners run in the order they were attached.
//! - **No de-duplication**: attaching the same closure twice means it runs
//!   twice per notification.
//! - **Failures are reported, not swallowed**: a listener returning
//!   [`ListenerError`] is logged at `warn` level and counted in the
//!   [`Delivery`] report, and the remaining listeners still run.

use std::fmt;

use tracing::warn;

use crate::error::ListenerError;

/// Boxed listener callback stored by a channel.
type Listener<T> = Box<dyn FnMut(&T) -> Result<(), ListenerError> + Send>;

/// Handle returned by [`EventChannel::attach`], used to detach a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

/// Outcome of a single [`EventChannel::notify`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Listeners that handled the payload successfully.
    pub delivered: usize,
    /// Listeners that returned an error.
    pub failed: usize,
}

impl Delivery {
    /// Whether every listener handled the payload.
    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Ordered list of listeners for one event kind.
///
/// The payload type `T` is the event's argument list. Listeners receive it
/// by reference, so a single value is shared by every listener of one
/// notification.
pub struct EventChannel<T> {
    /// Name used in log output.
    name: &'static str,
    /// Attached listeners in attachment order.
    listeners: Vec<(ListenerId, Listener<T>)>,
    /// Next identifier to hand out.
    next_id: u64,
}

impl<T> EventChannel<T> {
    /// Create an empty channel. The name only appears in log output.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    /// Attach a listener that runs on every future notification.
    pub fn attach<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&T) -> Result<(), ListenerError> + Send + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Detach a listener. Returns `false` if the id is unknown.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with `payload`, in attachment order.
    pub fn notify(&mut self, payload: &T) -> Delivery {
        let mut delivery = Delivery::default();
        for (id, listener) in &mut self.listeners {
            match listener(payload) {
                Ok(()) => delivery.delivered = delivery.delivered.saturating_add(1),
                Err(e) => {
                    warn!(channel = self.name, listener = %id, error = %e, "Listener failed");
                    delivery.failed = delivery.failed.saturating_add(1);
                }
            }
        }
        delivery
    }

    /// Number of attached listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is attached.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// The channel name used in logs.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for EventChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
