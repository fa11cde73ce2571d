use std::sync::{Arc, Weak};

use scopeline_types::{Epoch, Scope};

/// One entry of a branch's scope history.
///
/// Frames form a chain from the innermost entered scope down to the root of
/// the epoch they were created in. Parent links are weak: a frame is kept
/// alive by the branch whose top it is and by the guards still waiting to
/// restore it, never by its children.
pub(crate) struct Frame {
    scope: Scope,
    epoch: Epoch,
    depth: u32,
    parent: Weak<Frame>,
}

impl Frame {
    pub(crate) fn root(epoch: Epoch, scope: Scope) -> Arc<Frame> {
        Arc::new(Frame {
            scope,
            epoch,
            depth: 0,
            parent: Weak::new(),
        })
    }

    pub(crate) fn push(self: &Arc<Self>, scope: Scope) -> Arc<Frame> {
        Arc::new(Frame {
            scope,
            epoch: self.epoch,
            depth: self.depth.saturating_add(1),
            parent: Arc::downgrade(self),
        })
    }

    pub(crate) fn scope(&self) -> &Scope {
        &self.scope
    }

    pub(crate) fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub(crate) fn depth(&self) -> u32 {
        self.depth
    }

    /// Scopes from this frame towards the root, innermost first. Stops early
    /// at the first parent that has already been released.
    pub(crate) fn history(self: &Arc<Self>) -> Vec<Scope> {
        let mut out = Vec::with_capacity(self.depth as usize + 1);
        let mut cursor = Some(Arc::clone(self));
        while let Some(frame) = cursor {
            out.push(frame.scope.clone());
            cursor = frame.parent.upgrade();
        }
        out
    }
}
