//! Core types shared by the scopeline crates.
//!
//! A [`Scope`] is an opaque, reference-compared value. The runtime never looks
//! inside it; it only tracks which scope is active on which branch.

mod ids;
mod scope;
mod snapshot;

pub use self::ids::*;
pub use self::scope::*;
pub use self::snapshot::*;
