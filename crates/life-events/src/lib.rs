//! Typed publish/subscribe channels for the Life simulation engine.
//!
//! The engine announces state changes (grid created, cell changed, game
//! ended, generation advanced) without knowing who listens. Each event kind
//! gets its own [`EventChannel`], which holds an ordered list of listener
//! callbacks and invokes them synchronously on every notification.
//!
//! # Modules
//!
//! - [`channel`] -- [`EventChannel`], [`ListenerId`] and the [`Delivery`]
//!   report returned by every notification.
//! - [`error`] -- [`ListenerError`], the failure type listeners return.

pub mod channel;
pub mod error;

pub use channel::{Delivery, EventChannel, ListenerId};
pub use error::ListenerError;
