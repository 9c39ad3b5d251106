//! Typed event emitter
//!
//! Listeners are registered per event kind. The set of kinds is a closed
//! enum, so there is no such thing as an unknown event name.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// An event value that knows which kind it is
pub trait Event {
    type Kind: Copy + Eq + Hash + fmt::Debug;

    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventEmitter::on`], used to unregister
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Box<dyn FnMut(&E)>;

pub struct EventEmitter<E: Event> {
    listeners: HashMap<E::Kind, Vec<(ListenerId, Listener<E>)>>,
    next_id: u64,
}

impl<E: Event> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    /// Register `listener` for events of `kind`
    pub fn on<F>(&mut self, kind: E::Kind, listener: F) -> ListenerId
    where
        F: FnMut(&E) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Box::new(listener)));
        id
    }

    /// Unregister a listener. Returns false if it was not registered for `kind`.
    pub fn off(&mut self, kind: E::Kind, id: ListenerId) -> bool {
        let Some(listeners) = self.listeners.get_mut(&kind) else {
            return false;
        };

        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        before != listeners.len()
    }

    /// Call every listener registered for the event's kind, in registration order
    pub fn trigger(&mut self, event: &E) {
        if let Some(listeners) = self.listeners.get_mut(&event.kind()) {
            for (_, listener) in listeners.iter_mut() {
                listener(event);
            }
        }
    }

    pub fn listener_count(&self, kind: E::Kind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    /// Drop every listener
    pub fn dispose(&mut self) {
        self.listeners.clear();
    }
}

impl<E: Event> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventEmitter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<_, _> = self
            .listeners
            .iter()
            .map(|(kind, listeners)| (*kind, listeners.len()))
            .collect();

        f.debug_struct("EventEmitter")
            .field("listeners", &counts)
            .finish()
    }
}
