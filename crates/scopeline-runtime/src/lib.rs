//! Scope stack runtime.
//!
//! A [`ScopeManager`] keeps, for every execution branch, the history of scopes
//! entered on it and reports the innermost one as active. Branches come from a
//! [`ForkJoin`] substrate: the main flow is one branch, and every piece of
//! asynchronous work forks the branch that scheduled it, so a continuation sees
//! the scope that was active when it was scheduled rather than whatever is
//! active when it finally runs.
//!
//! ```
//! use scopeline_runtime::{Scope, ScopeManager};
//!
//! let manager = ScopeManager::new();
//! manager.enable();
//!
//! let request = Scope::new("request-42");
//! manager.with(request.clone(), || {
//!     assert_eq!(manager.active(), Some(request.clone()));
//! });
//! assert_eq!(manager.active(), manager.root());
//! ```
//!
//! Top-level split:
//! - gate: enabled/disabled lifecycle and the per-period root scope
//! - frames and branches: the per-branch scope history
//! - substrate: the fork/join boundary, with [`MainLane`] as the default
//! - bind: scope capture into callables and handler objects
//! - [`lab`]: a deterministic substrate for exercising all of the above

mod bind;
mod branch;
mod config;
mod frame;
mod gate;
mod guard;
mod manager;
mod substrate;

pub mod lab;

pub use self::bind::*;
pub use self::branch::*;
pub use self::config::*;
pub use self::guard::*;
pub use self::manager::*;
pub use self::substrate::*;

pub use scopeline_types::{
    BranchId, Epoch, ManagerSnapshot, Scope, ScopeKind, ScopeSnapshot, SnapshotError,
};
