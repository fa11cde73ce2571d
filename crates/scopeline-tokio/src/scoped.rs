use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use scopeline_runtime::{Binding, Scope, ScopeManager};

/// Future wrapper that re-enters a captured scope around every poll.
///
/// A [`ScopeGuard`](scopeline_runtime::ScopeGuard) cannot be held across an
/// `.await`; wrap the future instead. Created while the manager is disabled,
/// the wrapper is a pass-through.
pub struct Scoped<F> {
    inner: F,
    binding: Option<Binding>,
}

impl<F> Scoped<F> {
    /// Captures `scope`, or the active scope when `None`.
    pub fn new(manager: &ScopeManager, scope: Option<Scope>, inner: F) -> Self {
        Self {
            inner,
            binding: manager.capture(scope),
        }
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.binding.as_ref().map(Binding::scope)
    }
}

impl<F: Future> Future for Scoped<F> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // SAFETY: Scoped is not Unpin over F, and `inner` is never moved out.
        let this = unsafe { self.get_unchecked_mut() };
        let inner = unsafe { Pin::new_unchecked(&mut this.inner) };

        match &this.binding {
            Some(binding) => binding.run(|| inner.poll(cx)),
            None => inner.poll(cx),
        }
    }
}

impl<F> fmt::Debug for Scoped<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scoped")
            .field("inner", &std::any::type_name::<F>())
            .field("binding", &self.binding)
            .finish()
    }
}

/// Shorthand for [`Scoped::new`].
pub fn scoped<F: Future>(manager: &ScopeManager, scope: Option<Scope>, fut: F) -> Scoped<F> {
    Scoped::new(manager, scope, fut)
}
