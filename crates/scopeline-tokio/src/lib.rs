//! Tokio backend for scopeline.
//!
//! [`TaskLane`] gives every task started with [`spawn`] its own branch, forked
//! from the spawner's. Scopes entered synchronously inside a task stay in that
//! task; scopes that must survive `.await` points go through [`Scoped`].

mod lane;
mod scoped;
mod task;

pub use self::lane::*;
pub use self::scoped::*;
pub use self::task::*;
