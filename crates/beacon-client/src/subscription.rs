//! Callback fan-out with per-callback cancellation handles.

use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc,
        Weak,
    },
};

/// Callback invoked once per received event.
///
/// Callbacks run on the task that received the event and must not block.
pub type EventCallback<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Registrations<T> {
    next_id: u64,
    callbacks: Vec<(u64, EventCallback<T>)>,
}

/// A set of callbacks interested in one event type.
///
/// Callbacks are invoked while the registration list is locked, so once
/// [`Subscription::unsubscribe`] returns the callback is guaranteed not to be
/// running and will never run again. A callback must not subscribe to or
/// unsubscribe from the hub that is invoking it.
pub struct Subscribers<T> {
    inner: Arc<Mutex<Registrations<T>>>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registrations {
                next_id: 0,
                callbacks: Vec::new(),
            })),
        }
    }
}

impl<T: 'static> Subscribers<T> {
    pub fn subscribe(&self, callback: EventCallback<T>) -> Subscription {
        let id = {
            let mut registrations = self.inner.lock();
            let id = registrations.next_id;
            registrations.next_id += 1;
            registrations.callbacks.push((id, callback));
            id
        };

        let registrations: Weak<Mutex<Registrations<T>>> = Arc::downgrade(&self.inner);

        Subscription::new(move || {
            if let Some(registrations) = registrations.upgrade() {
                registrations
                    .lock()
                    .callbacks
                    .retain(|(registered, _)| *registered != id);
            }
        })
    }

    /// Delivers `event` to every live callback, in registration order.
    pub fn publish(&self, event: &T) {
        let registrations = self.inner.lock();
        for (_, callback) in &registrations.callbacks {
            callback(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle for one registered callback. Dropping it unsubscribes.
#[must_use = "dropping a subscription immediately unsubscribes the callback"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle that is not attached to any hub. Useful for collaborators
    /// that never emit a given event.
    pub fn detached() -> Self {
        Self { cancel: None }
    }

    pub fn unsubscribe(mut self) {
        self.cancel_now();
    }

    fn cancel_now(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{
        AtomicU64,
        Ordering,
    };

    fn counting_callback(counter: &Arc<AtomicU64>) -> EventCallback<u64> {
        let counter = counter.clone();
        Box::new(move |value: &u64| {
            counter.fetch_add(*value, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_publish_reaches_every_subscriber() {
        let hub = Subscribers::<u64>::default();
        let first = Arc::new(AtomicU64::new(0));
        let second = Arc::new(AtomicU64::new(0));

        let _a = hub.subscribe(counting_callback(&first));
        let _b = hub.subscribe(counting_callback(&second));

        hub.publish(&3);
        hub.publish(&4);

        assert_eq!(first.load(Ordering::SeqCst), 7);
        assert_eq!(second.load(Ordering::SeqCst), 7);
        assert_eq!(hub.len(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let hub = Subscribers::<u64>::default();
        let kept = Arc::new(AtomicU64::new(0));
        let dropped = Arc::new(AtomicU64::new(0));

        let _kept = hub.subscribe(counting_callback(&kept));
        let removed = hub.subscribe(counting_callback(&dropped));

        hub.publish(&1);
        removed.unsubscribe();
        hub.publish(&1);

        assert_eq!(kept.load(Ordering::SeqCst), 2);
        assert_eq!(dropped.load(Ordering::SeqCst), 1);
        assert_eq!(hub.len(), 1);
    }

    #[test]
    fn test_drop_unsubscribes() {
        let hub = Subscribers::<u64>::default();
        let counter = Arc::new(AtomicU64::new(0));

        {
            let _subscription = hub.subscribe(counting_callback(&counter));
            assert_eq!(hub.len(), 1);
        }

        hub.publish(&5);

        assert!(hub.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_hub_is_harmless() {
        let hub = Subscribers::<u64>::default();
        let counter = Arc::new(AtomicU64::new(0));
        let subscription = hub.subscribe(counting_callback(&counter));

        drop(hub);
        subscription.unsubscribe();
    }

    #[test]
    fn test_detached_subscription() {
        let subscription = Subscription::detached();
        assert_eq!(format!("{subscription:?}"), "Subscription { active: false }");
        subscription.unsubscribe();
    }
}
