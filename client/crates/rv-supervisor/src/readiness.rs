//! Backend readiness flag with change notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::debug;

type Observer = Arc<dyn Fn(bool) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    observers: Vec<(u64, Observer)>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.observers.iter().any(|(observer_id, _)| *observer_id == id)
    }
}

/// Whether the backend can serve feature requests.
///
/// Observers run synchronously on the thread calling [`set_ready`], in
/// subscription order, and only when the value actually changes. They may
/// unsubscribe themselves (or others) from inside the callback but must not
/// call [`set_ready`].
///
/// [`set_ready`]: ReadinessBroadcaster::set_ready
pub struct ReadinessBroadcaster {
    ready: AtomicBool,
    update_lock: Mutex<()>,
    registry: Arc<Mutex<Registry>>,
}

impl ReadinessBroadcaster {
    pub fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
            update_lock: Mutex::new(()),
            registry: Arc::new(Mutex::new(Registry::default())),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Update the flag. Returns true when the value changed.
    pub fn set_ready(&self, ready: bool) -> bool {
        let _update = self.update_lock.lock().unwrap_or_else(PoisonError::into_inner);

        if self.ready.swap(ready, Ordering::SeqCst) == ready {
            return false;
        }

        debug!("Backend readiness changed to {ready}");

        let snapshot: Vec<(u64, Observer)> = lock_registry(&self.registry)
            .observers
            .iter()
            .map(|(id, observer)| (*id, Arc::clone(observer)))
            .collect();

        for (id, observer) in snapshot {
            // Skip observers removed by an earlier callback in this round.
            if !lock_registry(&self.registry).contains(id) {
                continue;
            }
            observer(ready);
        }

        true
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let mut registry = lock_registry(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        registry.observers.push((id, Arc::new(observer)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
            active: AtomicBool::new(true),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock_registry(&self.registry).observers.len()
    }
}

impl Default for ReadinessBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`ReadinessBroadcaster::subscribe`].
///
/// Dropping it does not unsubscribe.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
    active: AtomicBool,
}

impl Subscription {
    /// Stop receiving notifications. Safe to call more than once.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            lock_registry(&registry)
                .observers
                .retain(|(id, _)| *id != self.id);
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

fn lock_registry(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
