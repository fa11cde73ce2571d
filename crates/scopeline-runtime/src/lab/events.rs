use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::bind::{Bindable, Binding};

/// An event delivered to the listeners registered for its kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: String,
}

impl Event {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into() }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }
}

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// A handler object whose listeners are invoked by whoever calls
/// [`dispatch`](Self::dispatch).
///
/// Once bound through [`ScopeManager::bind_target`](crate::ScopeManager::bind_target),
/// every listener registered afterwards runs with the bound scope active.
/// Listeners registered before the binding are left as they were.
pub struct EventTarget {
    name: String,
    binding: Option<Binding>,
    listeners: Mutex<Vec<(String, Listener)>>,
}

impl EventTarget {
    /// An unbound target with no listeners.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            binding: None,
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    /// Registers `listener` for events of `kind`. On a bound target the
    /// listener is wrapped so it runs with the bound scope active.
    pub fn add_listener(&self, kind: impl Into<String>, listener: impl Fn(&Event) + Send + Sync + 'static) {
        let listener: Listener = match &self.binding {
            Some(binding) => {
                let binding = binding.clone();
                Arc::new(move |event: &Event| binding.run(|| listener(event)))
            }
            None => Arc::new(listener),
        };
        self.listeners.lock().push((kind.into(), listener));
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Synchronously invokes every listener registered for the event's kind,
    /// in registration order. Returns how many listeners ran.
    pub fn dispatch(&self, event: &Event) -> usize {
        let matching: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(kind, _)| kind == event.kind())
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::trace!(target_name = %self.name, kind = event.kind(), listeners = matching.len(), "dispatching event");
        for listener in &matching {
            listener(event);
        }
        matching.len()
    }
}

impl Bindable for EventTarget {
    fn attach_binding(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }
}

impl fmt::Debug for EventTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTarget")
            .field("name", &self.name)
            .field("bound", &self.binding.is_some())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
