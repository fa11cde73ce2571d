//! Active-scope propagation across nested calls and asynchronous continuations.
//!
//! A [`ScopeManager`] answers one question: which application scope (a request,
//! a span, a tenant) is active right now? Scopes nest through
//! [`ScopeManager::with`], and every piece of work scheduled while a scope is
//! active runs on a fork of the scheduling branch, so it still sees that scope
//! when it finally runs.
//!
//! # Using this crate
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scopeline::Scope;
//!
//! #[tokio::main]
//! async fn main() {
//!     let manager = scopeline::tokio::manager();
//!     manager.enable();
//!
//!     let request = Scope::new("request-42");
//!     let m = manager.clone();
//!     let handle = manager.with(request, || {
//!         scopeline::tokio::set_timeout(&manager, Duration::from_millis(10), move || {
//!             println!("still in {:?}", m.active());
//!         })
//!     });
//!     handle.await.unwrap();
//! }
//! ```
//!
//! The manager starts disabled. Until [`ScopeManager::enable`] is called every
//! operation is a pass-through, and [`ScopeManager::disable`] forgets every
//! scope entered on every branch at once.
//!
//! # Cargo features
//!
//! | Feature | Effect |
//! |---------|--------|
//! | `tokio` *(default)* | Adds the [`tokio`] module: a task-local substrate, `spawn`, `set_timeout` and `Scoped`. |
//!
//! Without `tokio`, managers run over [`MainLane`] or any custom [`ForkJoin`]
//! implementation; [`lab::VirtualLoop`] is a deterministic one for tests.

pub use scopeline_runtime::*;

#[cfg(feature = "tokio")]
pub mod tokio {
    //! Tokio backend.
    pub use scopeline_tokio::*;
}
