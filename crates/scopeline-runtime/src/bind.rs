//! Bind-time capture of a scope into callables and handler objects.

use std::fmt;

use scopeline_types::Scope;

use crate::ScopeManager;

/// A scope captured at bind time, ready to be re-entered on every invocation.
#[derive(Clone)]
pub struct Binding {
    manager: ScopeManager,
    scope: Scope,
}

impl Binding {
    pub(crate) fn new(manager: ScopeManager, scope: Scope) -> Self {
        Self { manager, scope }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Runs `f` with the captured scope active.
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        self.manager.with(self.scope.clone(), f)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("manager", &self.manager.name())
            .field("scope", &self.scope)
            .finish()
    }
}

/// Something that can be invoked with an argument tuple.
///
/// Implemented for every `Fn` of up to four arguments, and for [`Bound`]
/// wrappers of those, so a bound callable can be bound again.
pub trait Callable<Args> {
    type Output;

    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_callable {
    ($($arg:ident),*) => {
        impl<Func, Ret, $($arg),*> Callable<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_callable!();
impl_callable!(A);
impl_callable!(A, B);
impl_callable!(A, B, C);
impl_callable!(A, B, C, D);

/// A callable whose invocations run under the scope captured when it was bound.
///
/// The wrapped callable receives exactly the arguments passed to
/// [`Bound::call`]; the captured scope is observable only through
/// [`ScopeManager::active`]. A `Bound` produced while the manager was disabled
/// is a plain pass-through for its whole life.
#[derive(Clone)]
pub struct Bound<F> {
    target: F,
    binding: Option<Binding>,
}

impl<F> Bound<F> {
    pub(crate) fn new(target: F, binding: Option<Binding>) -> Self {
        Self { target, binding }
    }

    pub fn call<Args>(&self, args: Args) -> <F as Callable<Args>>::Output
    where
        F: Callable<Args>,
    {
        match &self.binding {
            Some(binding) => binding.run(|| self.target.invoke(args)),
            None => self.target.invoke(args),
        }
    }

    /// Whether a scope was captured. `false` for pass-through wrappers.
    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn scope(&self) -> Option<&Scope> {
        self.binding.as_ref().map(Binding::scope)
    }

    pub fn get_ref(&self) -> &F {
        &self.target
    }

    pub fn into_inner(self) -> F {
        self.target
    }
}

impl<F, Args> Callable<Args> for Bound<F>
where
    F: Callable<Args>,
{
    type Output = F::Output;

    fn invoke(&self, args: Args) -> Self::Output {
        self.call(args)
    }
}

impl<F> fmt::Debug for Bound<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("target", &std::any::type_name::<F>())
            .field("binding", &self.binding)
            .finish()
    }
}

/// A handler object invoked by some external dispatch mechanism.
///
/// [`ScopeManager::bind_target`] hands the object a [`Binding`], and the object
/// routes its invocation entry point through [`Binding::run`]. Plain data can
/// implement this trait with the default method, which leaves the value
/// untouched.
pub trait Bindable {
    fn attach_binding(&mut self, binding: Binding) {
        let _ = binding;
    }
}
