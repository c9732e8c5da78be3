//! Value-changed observers and their scoped subscription tokens.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Observer<V> = Box<dyn FnMut(&V)>;

trait Detach {
    fn detach(&mut self, id: u64);
}

pub(crate) struct ObserverRegistry<V> {
    next_id: u64,
    observers: Vec<(u64, Observer<V>)>,
    // bookkeeping while observers are taken out for a notification
    notifying: bool,
    added: Vec<(u64, Observer<V>)>,
    removed: Vec<u64>,
}

impl<V> Default for ObserverRegistry<V> {
    fn default() -> Self {
        Self {
            next_id: 0,
            observers: Vec::new(),
            notifying: false,
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<V> ObserverRegistry<V> {
    pub(crate) fn len(&self) -> usize {
        let live = self.observers.len() + self.added.len();
        live.saturating_sub(self.removed.len())
    }
}

impl<V> Detach for ObserverRegistry<V> {
    fn detach(&mut self, id: u64) {
        let before = self.observers.len() + self.added.len();
        self.observers.retain(|(i, _)| *i != id);
        self.added.retain(|(i, _)| *i != id);
        if self.notifying && before == self.observers.len() + self.added.len() {
            self.removed.push(id);
        }
    }
}

/// Shared handle the driver keeps to its observers.
pub(crate) struct Observers<V: 'static>(Rc<RefCell<ObserverRegistry<V>>>);

impl<V: 'static> Default for Observers<V> {
    fn default() -> Self {
        Self(Rc::new(RefCell::new(ObserverRegistry::default())))
    }
}

impl<V: 'static> Observers<V> {
    pub(crate) fn subscribe(&self, observer: Observer<V>) -> Subscription {
        let mut registry = self.0.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        if registry.notifying {
            registry.added.push((id, observer));
        } else {
            registry.observers.push((id, observer));
        }
        let shared: Rc<RefCell<dyn Detach>> = self.0.clone();
        let weak = Rc::downgrade(&shared);
        Subscription {
            id,
            registry: Some(weak),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Call every observer with `value`. Observers may subscribe or drop
    /// their own subscriptions from inside the callback.
    pub(crate) fn notify(&self, value: &V) {
        let mut observers = {
            let mut registry = self.0.borrow_mut();
            if registry.notifying {
                log::warn!("observer notification re-entered; skipped");
                return;
            }
            registry.notifying = true;
            std::mem::take(&mut registry.observers)
        };
        for (id, observer) in observers.iter_mut() {
            if self.0.borrow().removed.contains(id) {
                continue;
            }
            observer(value);
        }
        let mut registry = self.0.borrow_mut();
        let removed = std::mem::take(&mut registry.removed);
        observers.retain(|(id, _)| !removed.contains(id));
        observers.append(&mut registry.added);
        registry.observers = observers;
        registry.notifying = false;
    }
}

/// Token returned by `Driver::subscribe`. Dropping it removes the observer.
#[must_use = "dropping the subscription removes the observer"]
pub struct Subscription {
    id: u64,
    registry: Option<Weak<RefCell<dyn Detach>>>,
}

impl Subscription {
    /// Keep the observer for as long as the driver lives.
    pub fn forget(mut self) {
        self.registry = None;
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.borrow_mut().detach(self.id);
        }
    }
}
