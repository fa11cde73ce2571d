use facet::Facet;
use std::error::Error;
use std::fmt;

use crate::{BranchId, Epoch};

/// Coarse shape of a scope, the only part of it diagnostics can see.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum ScopeKind {
    Null,
    Root,
    Value,
}

#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct ScopeSnapshot {
    pub kind: ScopeKind,
    /// Rust type of the wrapped value, for value scopes.
    pub type_name: Option<String>,
}

/// Point-in-time view of a manager, as seen from the current branch.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct ManagerSnapshot {
    /// Manager name from its configuration.
    pub name: String,
    pub enabled: bool,
    /// Current enabled period, `None` while disabled.
    pub epoch: Option<Epoch>,
    /// Branch the snapshot was taken on.
    pub branch: BranchId,
    /// Branch this one was forked from, if it is still alive.
    pub parent_branch: Option<BranchId>,
    /// Number of scopes entered on top of the root on this branch.
    pub depth: u32,
    /// Active scope, `None` while disabled.
    pub active: Option<ScopeSnapshot>,
}

impl ManagerSnapshot {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        facet_json::to_string(self).map_err(|e| SnapshotError::Encode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Encode(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encode(reason) => write!(f, "failed to encode manager snapshot: {reason}"),
        }
    }
}

impl Error for SnapshotError {}
