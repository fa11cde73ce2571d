use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use scopeline_types::BranchId;

use crate::frame::Frame;

/// An independent line of execution with its own active-scope slot.
///
/// The main flow is one branch; every asynchronous continuation runs on a
/// branch forked from the branch that scheduled it. Cloning a `Branch` yields
/// another handle to the same branch.
#[derive(Clone)]
pub struct Branch(Arc<BranchInner>);

struct BranchInner {
    id: BranchId,
    parent: Weak<BranchInner>,
    top: Mutex<Option<Arc<Frame>>>,
}

impl Branch {
    /// A branch with no parent and an empty slot.
    pub fn detached() -> Self {
        Self(Arc::new(BranchInner {
            id: BranchId::next(),
            parent: Weak::new(),
            top: Mutex::new(None),
        }))
    }

    /// Creates a child branch whose slot starts as a copy of this branch's
    /// slot. Only the top frame reference is copied.
    pub fn fork(&self) -> Branch {
        let top = self.0.top.lock().clone();
        let child = Self(Arc::new(BranchInner {
            id: BranchId::next(),
            parent: Arc::downgrade(&self.0),
            top: Mutex::new(top),
        }));
        tracing::trace!(parent = %self.0.id, branch = %child.0.id, "forked branch");
        child
    }

    pub fn id(&self) -> BranchId {
        self.0.id
    }

    /// The branch this one was forked from, while it is still alive.
    pub fn parent(&self) -> Option<Branch> {
        self.0.parent.upgrade().map(Branch)
    }

    pub fn same(&self, other: &Branch) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn top(&self) -> Option<Arc<Frame>> {
        self.0.top.lock().clone()
    }

    pub(crate) fn replace_top(&self, top: Option<Arc<Frame>>) -> Option<Arc<Frame>> {
        std::mem::replace(&mut *self.0.top.lock(), top)
    }
}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Branch")
            .field("id", &self.0.id)
            .field("parent", &self.0.parent.upgrade().map(|p| p.id))
            .finish()
    }
}
