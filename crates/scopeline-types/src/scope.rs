use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::{Epoch, ScopeKind, ScopeSnapshot};

/// An opaque scope value.
///
/// Scopes are compared by identity, never structurally: two scopes built from
/// equal values are still different scopes. Cloning a `Scope` keeps its
/// identity. The null scope is a valid scope distinct from "no scope at all",
/// which the manager reports as `None` while disabled.
#[derive(Clone)]
pub struct Scope(Repr);

#[derive(Clone)]
enum Repr {
    Null,
    Root(Arc<RootToken>),
    Value {
        value: Arc<dyn Any + Send + Sync>,
        type_name: &'static str,
    },
}

struct RootToken {
    epoch: Epoch,
}

impl Scope {
    /// Wraps `value` in a new scope with its own identity.
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value; the scope's identity is the allocation's.
    pub fn from_arc<T>(value: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self(Repr::Value {
            value,
            type_name: std::any::type_name::<T>(),
        })
    }

    /// The null scope. All null scopes are the same scope.
    pub const fn null() -> Self {
        Self(Repr::Null)
    }

    /// Creates the root scope for `epoch`. Every call yields a distinct identity.
    pub fn root(epoch: Epoch) -> Self {
        Self(Repr::Root(Arc::new(RootToken { epoch })))
    }

    pub fn kind(&self) -> ScopeKind {
        match &self.0 {
            Repr::Null => ScopeKind::Null,
            Repr::Root(_) => ScopeKind::Root,
            Repr::Value { .. } => ScopeKind::Value,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.0, Repr::Null)
    }

    pub fn is_root(&self) -> bool {
        matches!(self.0, Repr::Root(_))
    }

    /// Identity comparison.
    pub fn same(&self, other: &Scope) -> bool {
        match (&self.0, &other.0) {
            (Repr::Null, Repr::Null) => true,
            (Repr::Root(a), Repr::Root(b)) => Arc::ptr_eq(a, b),
            (Repr::Value { value: a, .. }, Repr::Value { value: b, .. }) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }

    /// Name of the wrapped value's type, for value scopes.
    pub fn type_name(&self) -> Option<&'static str> {
        match &self.0 {
            Repr::Value { type_name, .. } => Some(*type_name),
            _ => None,
        }
    }

    /// The epoch a root scope was created for.
    pub fn root_epoch(&self) -> Option<Epoch> {
        match &self.0 {
            Repr::Root(token) => Some(token.epoch),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.0 {
            Repr::Value { value, .. } => (**value).downcast_ref::<T>(),
            _ => None,
        }
    }

    pub fn downcast_arc<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        match &self.0 {
            Repr::Value { value, .. } => Arc::clone(value).downcast::<T>().ok(),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            kind: self.kind(),
            type_name: self.type_name().map(str::to_owned),
        }
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl Eq for Scope {}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Repr::Null => f.write_str("Scope(null)"),
            Repr::Root(token) => write!(f, "Scope(root, {})", token.epoch),
            Repr::Value { value, type_name } => {
                write!(f, "Scope({type_name} @ {:p})", Arc::as_ptr(value))
            }
        }
    }
}
