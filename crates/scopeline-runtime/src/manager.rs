use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use scopeline_types::{ManagerSnapshot, Scope};

use crate::bind::{Bindable, Binding, Bound};
use crate::branch::Branch;
use crate::config::ManagerConfig;
use crate::frame::Frame;
use crate::gate::Gate;
use crate::guard::ScopeGuard;
use crate::substrate::{self, ForkJoin, MainLane};

/// Tracks which scope is active on each execution branch.
///
/// A manager starts disabled. While disabled every operation is a
/// pass-through: [`active`](Self::active) reports `None`, [`with`](Self::with)
/// just calls its function, and [`bind`](Self::bind) captures nothing.
///
/// Cloning a manager yields another handle to the same manager.
#[derive(Clone)]
pub struct ScopeManager {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    gate: RwLock<Gate>,
    substrate: Arc<dyn ForkJoin>,
}

impl ScopeManager {
    /// A disabled manager over a private [`MainLane`].
    pub fn new() -> Self {
        Self::with_substrate(Arc::new(MainLane::new()))
    }

    /// A disabled manager whose branches are supplied by `substrate`.
    pub fn with_substrate(substrate: Arc<dyn ForkJoin>) -> Self {
        Self::from_config(ManagerConfig::default(), substrate)
    }

    pub fn from_config(config: ManagerConfig, substrate: Arc<dyn ForkJoin>) -> Self {
        let manager = Self {
            inner: Arc::new(Inner {
                name: config.name,
                gate: RwLock::new(Gate::Disengaged),
                substrate,
            }),
        };
        if config.start_enabled {
            manager.enable();
        }
        manager
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn substrate(&self) -> &Arc<dyn ForkJoin> {
        &self.inner.substrate
    }

    /// Engages the manager with a fresh root scope. No-op when already enabled.
    pub fn enable(&self) -> &Self {
        let mut gate = self.inner.gate.write();
        if gate.engage() {
            tracing::debug!(manager = %self.inner.name, epoch = ?gate.epoch(), "scope manager enabled");
        }
        self
    }

    /// Disengages the manager. Every scope entered so far, on every branch,
    /// is forgotten; the next [`enable`](Self::enable) starts from a new root.
    pub fn disable(&self) -> &Self {
        if self.inner.gate.write().disengage() {
            tracing::debug!(manager = %self.inner.name, "scope manager disabled");
        }
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.gate.read().epoch().is_some()
    }

    /// The root scope of the current enabled period.
    pub fn root(&self) -> Option<Scope> {
        self.inner.gate.read().root().map(|root| root.scope().clone())
    }

    /// The active scope on the current branch, or `None` while disabled.
    pub fn active(&self) -> Option<Scope> {
        self.active_frame().map(|frame| frame.scope().clone())
    }

    /// Scopes entered on the current branch, innermost first, ending at the
    /// root. Frames already released by the branch that forked this one are
    /// not reachable and are left out.
    pub fn history(&self) -> Vec<Scope> {
        self.active_frame()
            .map(|frame| frame.history())
            .unwrap_or_default()
    }

    /// Makes `scope` active on the current branch until the guard is dropped.
    ///
    /// Returns `None` while disabled.
    pub fn enter(&self, scope: Scope) -> Option<ScopeGuard> {
        let branch = self.inner.substrate.current();
        let previous = branch.top();
        let base = self.inner.gate.read().resolve(previous.clone())?;

        let frame = base.push(scope);
        let depth = frame.depth();
        tracing::trace!(branch = %branch.id(), depth, scope = ?frame.scope(), "entered scope");
        branch.replace_top(Some(frame));
        Some(ScopeGuard::new(branch, previous, depth))
    }

    /// Runs `f` with `scope` active and restores the previous scope afterwards,
    /// whether `f` returns or unwinds.
    ///
    /// Anything `f` schedules through the substrate forks from a slot holding
    /// `scope`, so continuations observe `scope` no matter when they run.
    pub fn with<R>(&self, scope: Scope, f: impl FnOnce() -> R) -> R {
        let _guard = self.enter(scope);
        f()
    }

    /// Captures `scope`, or the active scope when `None`. Returns `None` while
    /// disabled.
    pub fn capture(&self, scope: Option<Scope>) -> Option<Binding> {
        if !self.is_enabled() {
            return None;
        }
        let scope = match scope {
            Some(scope) => scope,
            None => self.active()?,
        };
        Some(Binding::new(self.clone(), scope))
    }

    /// Wraps `target` so that every call runs with the captured scope active,
    /// independent of what is active at the call site.
    pub fn bind<F>(&self, target: F, scope: Option<Scope>) -> Bound<F> {
        let binding = self.capture(scope);
        tracing::trace!(
            callable = std::any::type_name::<F>(),
            scope = ?binding.as_ref().map(Binding::scope),
            "bound callable"
        );
        Bound::new(target, binding)
    }

    /// Hands a handler object the captured scope so the object can route its
    /// own invocations through it. The object is returned as-is otherwise.
    pub fn bind_target<T: Bindable>(&self, mut target: T, scope: Option<Scope>) -> T {
        if let Some(binding) = self.capture(scope) {
            tracing::trace!(handler = std::any::type_name::<T>(), scope = ?binding.scope(), "bound handler");
            target.attach_binding(binding);
        }
        target
    }

    /// Forks the current branch of the substrate.
    pub fn fork(&self) -> Branch {
        self.inner.substrate.fork()
    }

    /// Runs `f` on `branch`.
    pub fn resume<R>(&self, branch: &Branch, f: impl FnOnce() -> R) -> R {
        substrate::resume(&*self.inner.substrate, branch, f)
    }

    pub fn snapshot(&self) -> ManagerSnapshot {
        let branch = self.inner.substrate.current();
        let gate = self.inner.gate.read();
        let frame = gate.resolve(branch.top());
        ManagerSnapshot {
            name: self.inner.name.clone(),
            enabled: gate.epoch().is_some(),
            epoch: gate.epoch(),
            branch: branch.id(),
            parent_branch: branch.parent().map(|parent| parent.id()),
            depth: frame.as_ref().map_or(0, |frame| frame.depth()),
            active: frame.map(|frame| frame.scope().snapshot()),
        }
    }

    fn active_frame(&self) -> Option<Arc<Frame>> {
        let top = self.inner.substrate.current().top();
        self.inner.gate.read().resolve(top)
    }
}

impl Default for ScopeManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ScopeManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeManager")
            .field("name", &self.inner.name)
            .field("epoch", &self.inner.gate.read().epoch())
            .finish()
    }
}
