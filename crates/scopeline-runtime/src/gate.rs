//! Lifecycle gate: whether a manager is engaged, and the root of the current
//! enabled period.

use std::sync::Arc;

use scopeline_types::{Epoch, Scope};

use crate::frame::Frame;

pub(crate) enum Gate {
    Disengaged,
    Engaged { epoch: Epoch, root: Arc<Frame> },
}

impl Gate {
    /// Engages with a fresh epoch and root. Returns `false` if already engaged.
    pub(crate) fn engage(&mut self) -> bool {
        if matches!(self, Gate::Engaged { .. }) {
            return false;
        }
        let epoch = Epoch::next();
        *self = Gate::Engaged {
            epoch,
            root: Frame::root(epoch, Scope::root(epoch)),
        };
        true
    }

    /// Returns `false` if already disengaged.
    pub(crate) fn disengage(&mut self) -> bool {
        !matches!(
            std::mem::replace(self, Gate::Disengaged),
            Gate::Disengaged
        )
    }

    pub(crate) fn epoch(&self) -> Option<Epoch> {
        match self {
            Gate::Disengaged => None,
            Gate::Engaged { epoch, .. } => Some(*epoch),
        }
    }

    pub(crate) fn root(&self) -> Option<&Arc<Frame>> {
        match self {
            Gate::Disengaged => None,
            Gate::Engaged { root, .. } => Some(root),
        }
    }

    /// Maps a branch's recorded top frame to the frame that is active under
    /// this gate. Frames from an earlier epoch fall back to the root.
    pub(crate) fn resolve(&self, top: Option<Arc<Frame>>) -> Option<Arc<Frame>> {
        match self {
            Gate::Disengaged => None,
            Gate::Engaged { epoch, root } => match top {
                Some(frame) if frame.epoch() == *epoch => Some(frame),
                _ => Some(Arc::clone(root)),
            },
        }
    }
}
