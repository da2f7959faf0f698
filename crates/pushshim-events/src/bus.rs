// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Event bus: process-wide publish/subscribe broker keyed by event name.
//
// Delivery rules:
//   * payloads are validated before any subscriber sees them;
//   * subscribers are visited in subscription order, each on its own
//     dispatch context, so only per-subscriber FIFO is guaranteed;
//   * a panicking subscriber is contained and logged, never propagated;
//   * once `cancel` returns, no new delivery to that subscription starts.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::{debug, error, warn};
use uuid::Uuid;

use pushshim_core::catalog::EventName;
use pushshim_core::error::Result;

use crate::dispatch::DispatchContext;
use crate::event::{Event, Payload};
use crate::sdk_event::SdkEvent;

/// What a subscription listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Event(EventName),
    /// Every event in the catalog.
    All,
}

impl Topic {
    fn matches(&self, name: EventName) -> bool {
        match self {
            Self::Event(n) => *n == name,
            Self::All => true,
        }
    }
}

impl From<EventName> for Topic {
    fn from(name: EventName) -> Self {
        Self::Event(name)
    }
}

/// Opaque subscription identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Callback = dyn Fn(&Event) + Send + Sync + 'static;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    callback: Box<Callback>,
    context: DispatchContext,
    active: AtomicBool,
}

impl Subscriber {
    /// Run the callback unless cancelled. A panic is logged and dropped.
    fn deliver(&self, event: &Event) {
        if !self.active.load(Ordering::Acquire) {
            return;
        }
        if catch_unwind(AssertUnwindSafe(|| (self.callback)(event))).is_err() {
            error!(
                subscription = %self.id,
                event = %event.name(),
                "subscriber panicked during delivery"
            );
        }
    }
}

struct BusInner {
    subscribers: Mutex<Vec<Arc<Subscriber>>>,
}

impl BusInner {
    fn subscribers(&self) -> MutexGuard<'_, Vec<Arc<Subscriber>>> {
        // Bookkeeping stays consistent across a poisoned lock: every critical
        // section is a single push, retain or clone.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        before != subscribers.len()
    }
}

/// Handle returned by [`EventBus::subscribe`].
///
/// Dropping the handle does not cancel the subscription.
pub struct Subscription {
    subscriber: Arc<Subscriber>,
    bus: Weak<BusInner>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.subscriber.id)
            .field("topic", &self.subscriber.topic)
            .field("context", &self.subscriber.context.label())
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    /// Identity of this subscription, stable for its lifetime.
    pub fn id(&self) -> SubscriptionId {
        self.subscriber.id
    }

    /// Event name (or wildcard) this subscription listens to.
    pub fn topic(&self) -> Topic {
        self.subscriber.topic
    }

    /// `false` once cancelled.
    pub fn is_active(&self) -> bool {
        self.subscriber.active.load(Ordering::Acquire)
    }

    /// Stop future deliveries. Idempotent, and safe to call from inside the
    /// subscription's own callback.
    pub fn cancel(&self) {
        let was_active = self.subscriber.active.swap(false, Ordering::AcqRel);
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.subscriber.id);
        }
        if was_active {
            debug!(subscription = %self.subscriber.id, "subscription cancelled");
        }
    }
}

/// Publish/subscribe broker. Cloning shares the same subscriber table.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Bus with no subscribers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                subscribers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register a callback for a topic.
    pub fn subscribe<F>(
        &self,
        topic: impl Into<Topic>,
        context: DispatchContext,
        callback: F,
    ) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let subscriber = Arc::new(Subscriber {
            id: SubscriptionId(Uuid::new_v4()),
            topic: topic.into(),
            callback: Box::new(callback),
            context,
            active: AtomicBool::new(true),
        });
        debug!(
            subscription = %subscriber.id,
            topic = ?subscriber.topic,
            context = subscriber.context.label(),
            "subscribed"
        );
        self.inner.subscribers().push(Arc::clone(&subscriber));
        Subscription {
            subscriber,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe by wire name; unknown names fail immediately.
    pub fn subscribe_named<F>(
        &self,
        name: &str,
        context: DispatchContext,
        callback: F,
    ) -> Result<Subscription>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let name: EventName = name.parse()?;
        Ok(self.subscribe(name, context, callback))
    }

    /// Equivalent to [`Subscription::cancel`].
    pub fn cancel(&self, subscription: &Subscription) {
        subscription.cancel();
    }

    /// Deliver an already-validated event. Returns the number of
    /// subscriptions it was dispatched to.
    pub fn publish(&self, event: Event) -> usize {
        let name = event.name();
        let targets: Vec<Arc<Subscriber>> = self
            .inner
            .subscribers()
            .iter()
            .filter(|s| s.topic.matches(name))
            .cloned()
            .collect();

        let event = Arc::new(event);
        let mut dispatched = 0;
        for subscriber in targets {
            match &subscriber.context {
                DispatchContext::Immediate => {
                    subscriber.deliver(&event);
                    dispatched += 1;
                }
                DispatchContext::Queue(queue) => {
                    let job_event = Arc::clone(&event);
                    let job_subscriber = Arc::clone(&subscriber);
                    let queued = queue.dispatch(Box::new(move || {
                        job_subscriber.deliver(&job_event);
                    }));
                    match queued {
                        Ok(()) => dispatched += 1,
                        Err(e) => warn!(
                            subscription = %subscriber.id,
                            event = %name,
                            error = %e,
                            "could not enqueue delivery"
                        ),
                    }
                }
            }
        }
        debug!(event = %name, dispatched, "event published");
        dispatched
    }

    /// Validate `payload` for `name`, then publish.
    pub fn publish_payload(&self, name: EventName, payload: Payload) -> Result<usize> {
        Ok(self.publish(Event::new(name, payload)?))
    }

    /// Resolve a wire name, validate, then publish.
    pub fn publish_named(&self, name: &str, payload: Payload) -> Result<usize> {
        Ok(self.publish(Event::named(name, payload)?))
    }

    /// Lower a typed SDK event and publish it.
    pub fn emit(&self, event: SdkEvent) -> Result<usize> {
        Ok(self.publish(event.into_event()?))
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::DispatchQueue;
    use pushshim_core::catalog::PayloadKey;
    use serde_json::json;
    use std::sync::mpsc;

    fn payload(v: serde_json::Value) -> Payload {
        v.as_object().cloned().unwrap()
    }

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Event) + Send + Sync>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_for_factory = Arc::clone(&log);
        let factory = move |tag: &str| -> Box<dyn Fn(&Event) + Send + Sync> {
            let log = Arc::clone(&log_for_factory);
            let tag = tag.to_owned();
            Box::new(move |event: &Event| {
                log.lock().unwrap().push(format!("{tag}:{}", event.name()));
            })
        };
        (log, factory)
    }

    #[test]
    fn delivers_to_matching_and_wildcard_only() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let token_cb = make("token");
        let all_cb = make("all");
        let other_cb = make("other");
        bus.subscribe(EventName::DeviceTokenReceived, DispatchContext::Immediate, token_cb);
        bus.subscribe(Topic::All, DispatchContext::Immediate, all_cb);
        bus.subscribe(EventName::RegistrationUpdated, DispatchContext::Immediate, other_cb);

        let seen = Arc::new(Mutex::new(None));
        let seen_in_cb = Arc::clone(&seen);
        bus.subscribe(EventName::DeviceTokenReceived, DispatchContext::Immediate, move |e| {
            *seen_in_cb.lock().unwrap() = Some(e.payload().clone());
        });

        let sent = payload(json!({"deviceToken": "abc123"}));
        let count = bus
            .publish_payload(EventName::DeviceTokenReceived, sent.clone())
            .unwrap();
        assert_eq!(count, 3);
        let name = EventName::DeviceTokenReceived;
        assert_eq!(
            *log.lock().unwrap(),
            vec![format!("token:{name}"), format!("all:{name}")]
        );
        assert_eq!(seen.lock().unwrap().as_ref(), Some(&sent));
    }

    #[test]
    fn schema_violation_delivers_nothing() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(Topic::All, DispatchContext::Immediate, make("all"));

        let err = bus
            .publish_payload(
                EventName::MessageReceived,
                payload(json!({"message": {"messageId": "m"}, "bogusKey": true})),
            )
            .unwrap_err();
        assert!(err.is_schema_violation());
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_names_rejected_at_the_boundary() {
        let bus = EventBus::new();
        assert!(bus
            .subscribe_named("com.example.nope", DispatchContext::Immediate, |_| {})
            .is_err());
        assert!(bus.publish_named("com.example.nope", Payload::new()).is_err());
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn subscription_order_is_delivery_order() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(EventName::RegistrationUpdated, DispatchContext::Immediate, make("s1"));
        bus.subscribe(EventName::RegistrationUpdated, DispatchContext::Immediate, make("s2"));
        bus.emit(SdkEvent::RegistrationUpdated {
            internal_id: "id-1".into(),
        })
        .unwrap();
        let log = log.lock().unwrap();
        assert!(log[0].starts_with("s1:"));
        assert!(log[1].starts_with("s2:"));
    }

    #[test]
    fn panicking_subscriber_does_not_block_others() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        bus.subscribe(Topic::All, DispatchContext::Immediate, |_| panic!("observer bug"));
        bus.subscribe(Topic::All, DispatchContext::Immediate, make("after"));
        let count = bus.emit(SdkEvent::Personalized).unwrap();
        assert_eq!(count, 2);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn cancel_is_idempotent_and_stops_delivery() {
        let bus = EventBus::new();
        let (log, make) = recorder();
        let sub = bus.subscribe(Topic::All, DispatchContext::Immediate, make("x"));
        bus.emit(SdkEvent::Depersonalized).unwrap();
        bus.cancel(&sub);
        sub.cancel();
        assert!(!sub.is_active());
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.emit(SdkEvent::Depersonalized).unwrap(), 0);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn cancel_during_in_flight_delivery() {
        let bus = EventBus::new();
        let delivered = Arc::new(Mutex::new(0usize));
        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);

        let counter = Arc::clone(&delivered);
        let sub = bus.subscribe(Topic::All, DispatchContext::Immediate, move |_| {
            entered_tx.send(()).unwrap();
            release_rx.lock().unwrap().recv().unwrap();
            *counter.lock().unwrap() += 1;
        });

        let publisher_bus = bus.clone();
        let publisher = std::thread::spawn(move || {
            publisher_bus.emit(SdkEvent::GeoServiceDidStart).unwrap()
        });

        entered_rx.recv().unwrap();
        sub.cancel();
        release_tx.send(()).unwrap();
        assert_eq!(publisher.join().unwrap(), 1);
        assert_eq!(*delivered.lock().unwrap(), 1);

        assert_eq!(bus.emit(SdkEvent::GeoServiceDidStart).unwrap(), 0);
        assert_eq!(*delivered.lock().unwrap(), 1);
    }

    #[test]
    fn cancel_from_inside_callback() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(0usize));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let hits_cb = Arc::clone(&hits);
        let slot_cb = Arc::clone(&slot);
        let sub = bus.subscribe(Topic::All, DispatchContext::Immediate, move |_| {
            *hits_cb.lock().unwrap() += 1;
            if let Some(me) = slot_cb.lock().unwrap().as_ref() {
                me.cancel();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        bus.emit(SdkEvent::Personalized).unwrap();
        bus.emit(SdkEvent::Personalized).unwrap();
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn queued_delivery_preserves_per_subscriber_fifo() {
        let bus = EventBus::new();
        let queue = DispatchQueue::new("test.bus.fifo").unwrap();
        let counters = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&counters);
        bus.subscribe(
            EventName::InAppChatUnreadCounterUpdated,
            DispatchContext::Queue(queue.clone()),
            move |e| sink.lock().unwrap().push(e.integer(PayloadKey::Counter).unwrap()),
        );

        for counter in 0..20 {
            bus.emit(SdkEvent::InAppChatUnreadCounterUpdated { counter })
                .unwrap();
        }
        queue.flush().await.unwrap();
        assert_eq!(*counters.lock().unwrap(), (0..20).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn queued_panicking_subscriber_keeps_queue_alive() {
        let bus = EventBus::new();
        let queue = DispatchQueue::new("test.bus.panic").unwrap();
        let (log, make) = recorder();
        bus.subscribe(Topic::All, DispatchContext::Queue(queue.clone()), |_| {
            panic!("observer bug")
        });
        bus.subscribe(Topic::All, DispatchContext::Queue(queue.clone()), make("after"));

        assert_eq!(bus.emit(SdkEvent::Personalized).unwrap(), 2);
        queue.flush().await.unwrap();
        assert_eq!(bus.emit(SdkEvent::Depersonalized).unwrap(), 2);
        queue.flush().await.unwrap();
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn queued_delivery_not_started_before_cancel_is_dropped() {
        let bus = EventBus::new();
        let queue = DispatchQueue::new("test.bus.cancel").unwrap();
        let hits = Arc::new(Mutex::new(0usize));
        let sink = Arc::clone(&hits);
        let sub = bus.subscribe(Topic::All, DispatchContext::Queue(queue.clone()), move |_| {
            *sink.lock().unwrap() += 1;
        });

        // The current-thread test runtime has not polled the queue worker yet.
        bus.emit(SdkEvent::Personalized).unwrap();
        sub.cancel();
        bus.emit(SdkEvent::Personalized).unwrap();
        queue.flush().await.unwrap();
        assert_eq!(*hits.lock().unwrap(), 0);
    }
}
