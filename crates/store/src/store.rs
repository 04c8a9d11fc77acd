//! Observable state container.
//!
//! A [`Store`] owns one value and notifies subscribers synchronously on every
//! change. Consumers get a [`Readable`] view; only the owner of the `Store`
//! can write.
//!
//! Notification passes never interleave. A `set` issued while a pass is
//! running (from inside a subscriber, or from another thread) updates the
//! value immediately but is queued for delivery; the thread running the
//! current pass delivers queued values in issue order once it finishes.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
    pending: VecDeque<T>,
    notifying: bool,
}

pub struct Store<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock(&self.inner);
        f.debug_struct("Store")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Clone + Send + 'static> Store<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
                pending: VecDeque::new(),
                notifying: false,
            })),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Registers `callback`, calls it once right away with the current
    /// value, then on every change in registration order.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Callback<T> = Arc::new(callback);

        let (id, current) = {
            let mut inner = lock(&self.inner);
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Arc::clone(&callback)));
            (id, inner.value.clone())
        };

        callback(&current);

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            id,
            release: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).subscribers.retain(|(sid, _)| *sid != id);
                }
            })),
        }
    }

    /// Replaces the value and notifies every subscriber with it.
    pub fn set(&self, value: T) {
        let inner = lock(&self.inner);
        self.publish(inner, value);
    }

    /// Replaces the value with `f(&current)`, computed under the store's
    /// lock. `f` must not call back into this store.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let inner = lock(&self.inner);
        let next = f(&inner.value);
        self.publish(inner, next);
    }

    /// Like [`update`](Self::update), but `None` leaves the value alone and
    /// notifies nobody. Returns whether a new value was published.
    pub fn try_update<F>(&self, f: F) -> bool
    where
        F: FnOnce(&T) -> Option<T>,
    {
        let inner = lock(&self.inner);
        match f(&inner.value) {
            Some(next) => {
                self.publish(inner, next);
                true
            }
            None => false,
        }
    }

    /// Read-only view sharing this store's value and subscribers.
    pub fn readable(&self) -> Readable<T> {
        Readable { store: self.clone() }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).subscribers.len()
    }

    fn publish<'a>(&'a self, mut inner: MutexGuard<'a, Inner<T>>, value: T) {
        inner.value = value.clone();
        inner.pending.push_back(value);
        if inner.notifying {
            return;
        }
        inner.notifying = true;

        while let Some(next) = inner.pending.pop_front() {
            let subscribers = inner.subscribers.clone();
            drop(inner);

            for (id, callback) in subscribers {
                if self.is_subscribed(id) {
                    callback(&next);
                }
            }

            inner = lock(&self.inner);
        }

        inner.notifying = false;
    }

    fn is_subscribed(&self, id: u64) -> bool {
        lock(&self.inner).subscribers.iter().any(|(sid, _)| *sid == id)
    }
}

/// Read-only handle: subscribe and snapshot, nothing else.
pub struct Readable<T> {
    store: Store<T>,
}

impl<T> Clone for Readable<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Readable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Readable").field(&self.store).finish()
    }
}

impl<T: Clone + Send + 'static> Readable<T> {
    pub fn get(&self) -> T {
        self.store.get()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.store.subscribe(callback)
    }
}

/// Handle returned by `subscribe`.
///
/// Dropping it does *not* unsubscribe; call [`unsubscribe`](Self::unsubscribe).
#[must_use = "keep the handle to be able to unsubscribe later"]
pub struct Subscription {
    id: u64,
    release: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Stops notifications to this subscriber only. Also takes effect for a
    /// pass that is already running but hasn't reached this subscriber yet.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}
