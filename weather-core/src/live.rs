//! Observable slots a view subscribes to.
//!
//! [`LiveState`] keeps the latest value and replays it to every new
//! observer. [`LiveEvent`] hands each value to a single observer and then
//! forgets it.
//!
//! Publishing is expected to happen on the UI context only. Observers run
//! synchronously inside `publish`, outside of the slot's lock, so an
//! observer may call back into the view model.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type ObserverFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Observers<T> {
    next_id: u64,
    entries: Vec<(u64, ObserverFn<T>)>,
}

impl<T> Default for Observers<T> {
    fn default() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }
}

impl<T> Observers<T> {
    fn add(&mut self, f: ObserverFn<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, f));
        id
    }

    fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry, _)| *entry != id);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Registration returned by `observe`. Dropping it stops delivery.
#[must_use = "dropping an Observation unregisters the observer"]
pub struct Observation {
    unregister: Option<Box<dyn FnOnce() + Send>>,
}

impl Observation {
    fn new(unregister: impl FnOnce() + Send + 'static) -> Self {
        Self { unregister: Some(Box::new(unregister)) }
    }

    /// Unregister now instead of at drop.
    pub fn cancel(mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(unregister) = self.unregister.take() {
            unregister();
        }
    }
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation").field("active", &self.unregister.is_some()).finish()
    }
}

struct StateInner<T> {
    value: Option<T>,
    observers: Observers<T>,
}

/// Latest-value-wins slot. New values replace the old one.
pub struct LiveState<T> {
    inner: Arc<Mutex<StateInner<T>>>,
}

impl<T> Clone for LiveState<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Default for LiveState<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(StateInner { value: None, observers: Observers::default() })),
        }
    }
}

impl<T: Clone + Send + 'static> LiveState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<T> {
        lock(&self.inner).value.clone()
    }

    pub fn publish(&self, value: T) {
        let observers: Vec<ObserverFn<T>> = {
            let mut inner = lock(&self.inner);
            inner.value = Some(value.clone());
            inner.observers.entries.iter().map(|(_, f)| Arc::clone(f)).collect()
        };

        for observer in observers {
            observer(&value);
        }
    }

    /// Registers `f`, replaying the current value to it if there is one.
    pub fn observe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Observation {
        let f: ObserverFn<T> = Arc::new(f);
        let (id, current) = {
            let mut inner = lock(&self.inner);
            (inner.observers.add(Arc::clone(&f)), inner.value.clone())
        };

        if let Some(value) = current {
            f(&value);
        }

        let inner = Arc::downgrade(&self.inner);
        Observation::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner).observers.remove(id);
            }
        })
    }

    #[cfg(test)]
    pub(crate) fn observer_count(&self) -> usize {
        lock(&self.inner).observers.entries.len()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LiveState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("LiveState").field("value", &inner.value).finish()
    }
}

struct EventInner<T> {
    pending: Option<T>,
    observers: Observers<T>,
}

/// Single-delivery slot. A value goes to the earliest registered observer;
/// with nobody observing, only the latest value is kept until someone does.
pub struct LiveEvent<T> {
    inner: Arc<Mutex<EventInner<T>>>,
}

impl<T> Clone for LiveEvent<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> Default for LiveEvent<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventInner { pending: None, observers: Observers::default() })),
        }
    }
}

impl<T: Send + 'static> LiveEvent<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, value: T) {
        let observer = {
            let mut inner = lock(&self.inner);
            let first = inner.observers.entries.first().map(|(_, f)| Arc::clone(f));
            match first {
                Some(f) => f,
                None => {
                    inner.pending = Some(value);
                    return;
                }
            }
        };

        observer(&value);
    }

    /// Registers `f`; a pending value is consumed by it right away.
    pub fn observe(&self, f: impl Fn(&T) + Send + Sync + 'static) -> Observation {
        let f: ObserverFn<T> = Arc::new(f);
        let (id, pending) = {
            let mut inner = lock(&self.inner);
            (inner.observers.add(Arc::clone(&f)), inner.pending.take())
        };

        if let Some(value) = pending {
            f(&value);
        }

        let inner = Arc::downgrade(&self.inner);
        Observation::new(move || {
            if let Some(inner) = inner.upgrade() {
                lock(&inner).observers.remove(id);
            }
        })
    }

    /// Consumes the pending value, for hosts that poll instead of observing.
    pub fn take(&self) -> Option<T> {
        lock(&self.inner).pending.take()
    }

    pub fn has_pending(&self) -> bool {
        lock(&self.inner).pending.is_some()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for LiveEvent<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("LiveEvent").field("pending", &inner.pending).finish()
    }
}
