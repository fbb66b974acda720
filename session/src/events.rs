use crate::{
    track::{
        Publication,
        TrackDimensions,
        TrackSource,
    },
    transcript::ChatMessage,
};
use derive_more::Debug;
use std::sync::{
    Arc,
    Mutex,
    Weak,
};

/// Everything the transport can tell us about the session.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    TrackPublished {
        source: TrackSource,
        publication: Publication,
    },
    TrackUnpublished {
        source: TrackSource,
    },
    MuteChanged {
        source: TrackSource,
        muted: bool,
    },
    DimensionsChanged {
        source: TrackSource,
        dimensions: TrackDimensions,
    },
    MetadataChanged {
        identity: String,
        metadata: String,
    },
    MessageReceived(ChatMessage),
    Disconnected,
}

type Listener = Box<dyn FnMut(&RoomEvent) + Send>;

#[derive(Debug, Default)]
struct Registry {
    next_id: u64,
    #[debug(skip)]
    listeners: Vec<(u64, Listener)>,
    // Ids disposed while their listener was checked out for dispatch.
    retired: Vec<u64>,
}

/// Synchronous listener registry for transport events.
///
/// `subscribe` returns a [`Subscription`] that unregisters the listener when
/// dropped (or via [`Subscription::dispose`]). Dispatch happens inline on the
/// emitting call in subscription order; listeners may subscribe or dispose
/// from within a callback.
#[derive(Debug, Default, Clone)]
pub struct RoomEvents {
    inner: Arc<Mutex<Registry>>,
}

impl RoomEvents {
    pub fn subscribe(&self, listener: impl FnMut(&RoomEvent) + Send + 'static) -> Subscription {
        let mut registry = self.inner.lock().unwrap();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every registered listener, synchronously. The
    /// listeners are checked out of the registry for the duration of the
    /// dispatch so callbacks can touch the registry without deadlocking.
    pub fn emit(&self, event: &RoomEvent) {
        let mut checked_out = std::mem::take(&mut self.inner.lock().unwrap().listeners);
        for (_, listener) in checked_out.iter_mut() {
            listener(event);
        }

        let mut registry = self.inner.lock().unwrap();
        let retired = std::mem::take(&mut registry.retired);
        let added = std::mem::take(&mut registry.listeners);
        registry.listeners = checked_out
            .into_iter()
            .filter(|(id, _)| !retired.contains(id))
            .chain(added)
            .collect();
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().unwrap().listeners.len()
    }
}

/// Disposer for a registered listener. Dropping it unregisters the listener.
#[derive(Debug)]
#[must_use = "dropping the subscription unregisters the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn dispose(self) {
        // Drop does the work.
    }

    fn unregister(&self) {
        let Some(inner) = self.registry.upgrade() else {
            return;
        };
        let mut registry = inner.lock().unwrap();
        let before = registry.listeners.len();
        registry.listeners.retain(|(id, _)| *id != self.id);
        if registry.listeners.len() == before {
            // Mid-dispatch: the listener is checked out right now.
            registry.retired.push(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    fn counter_listener(counter: Arc<AtomicUsize>) -> impl FnMut(&RoomEvent) + Send {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn listeners_receive_events_in_subscription_order() {
        let events = RoomEvents::default();
        let order = Arc::new(Mutex::new(Vec::new()));

        let first = {
            let order = order.clone();
            events.subscribe(move |_| order.lock().unwrap().push("first"))
        };
        let second = {
            let order = order.clone();
            events.subscribe(move |_| order.lock().unwrap().push("second"))
        };

        events.emit(&RoomEvent::Disconnected);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second"]);

        first.dispose();
        second.dispose();
    }

    #[test]
    fn disposed_listeners_stop_receiving() {
        let events = RoomEvents::default();
        let counter = Arc::new(AtomicUsize::new(0));

        let sub = events.subscribe(counter_listener(counter.clone()));
        events.emit(&RoomEvent::Disconnected);
        sub.dispose();
        events.emit(&RoomEvent::Disconnected);

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(events.listener_count(), 0);
    }

    #[test]
    fn subscribing_from_within_a_callback_does_not_deadlock() {
        let events = RoomEvents::default();
        let counter = Arc::new(AtomicUsize::new(0));

        let late: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let sub = {
            let events_inner = events.clone();
            let counter = counter.clone();
            let late = late.clone();
            events.subscribe(move |_| {
                let mut slot = late.lock().unwrap();
                if slot.is_none() {
                    *slot = Some(events_inner.subscribe(counter_listener(counter.clone())));
                }
            })
        };

        events.emit(&RoomEvent::Disconnected);
        // The listener added during the first dispatch sees later events only.
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        events.emit(&RoomEvent::Disconnected);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        sub.dispose();
    }
}
