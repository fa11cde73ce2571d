//! Deterministic stand-ins for an asynchronous substrate.
//!
//! [`VirtualLoop`] is a single-threaded event loop over a virtual clock: timers
//! and deferred completions fork the branch that scheduled them and resume it
//! when they fire. [`EventTarget`] models a handler object whose listeners are
//! invoked by an external dispatcher. Together they let scope propagation be
//! exercised without a real runtime.

mod events;
mod virtual_loop;

pub use self::events::*;
pub use self::virtual_loop::*;
