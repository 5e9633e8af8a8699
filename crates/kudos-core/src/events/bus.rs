//! In-process topic-based event bus.
//!
//! Handlers are registered per topic string and invoked synchronously on
//! the emitter's task. Emission is fire-and-forget: handler errors are the
//! handler's problem, and no emitter behavior depends on delivery.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use super::DomainEvent;
use crate::traits::events::EventSink;

/// A registered event handler.
pub type EventHandler = Arc<dyn Fn(&DomainEvent) + Send + Sync>;

/// Topic subscribers can use this to receive every event.
pub const TOPIC_ALL: &str = "*";

/// Simple topic-based publish/subscribe bus.
///
/// Registration order within a topic is preserved. Emitting with no
/// subscribers is a no-op.
#[derive(Default)]
pub struct EventBus {
    /// Handlers keyed by topic.
    handlers: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for a topic. Use [`TOPIC_ALL`] to receive all
    /// events.
    pub fn subscribe<F>(&self, topic: &str, handler: F)
    where
        F: Fn(&DomainEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().expect("event bus lock poisoned");
        handlers
            .entry(topic.to_string())
            .or_default()
            .push(Arc::new(handler));
    }

    /// Number of handlers registered for a topic.
    pub fn subscriber_count(&self, topic: &str) -> usize {
        let handlers = self.handlers.read().expect("event bus lock poisoned");
        handlers.get(topic).map(Vec::len).unwrap_or(0)
    }

    fn dispatch(&self, event: &DomainEvent) {
        let topic = event.topic();
        let matched: Vec<EventHandler> = {
            let handlers = self.handlers.read().expect("event bus lock poisoned");
            handlers
                .get(topic)
                .into_iter()
                .chain(handlers.get(TOPIC_ALL))
                .flatten()
                .cloned()
                .collect()
        };

        debug!(topic, handlers = matched.len(), event_id = %event.id, "Dispatching event");
        for handler in matched {
            handler(event);
        }
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: DomainEvent) {
        self.dispatch(&event);
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let topics = self.handlers.read().expect("event bus lock poisoned");
        f.debug_struct("EventBus")
            .field("topics", &topics.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use uuid::Uuid;

    use super::*;
    use crate::events::{CardEvent, EventPayload};

    fn created_event() -> DomainEvent {
        DomainEvent::new(
            Some(Uuid::new_v4()),
            EventPayload::Card(CardEvent::Created {
                card_id: Uuid::new_v4(),
                owner_id: Uuid::new_v4(),
                kind: "goal_achieved".to_string(),
            }),
        )
    }

    #[test]
    fn test_topic_dispatch() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let seen_clone = Arc::clone(&seen);
        bus.subscribe("card.created", move |e| {
            seen_clone.lock().unwrap().push(e.id);
        });

        let event = created_event();
        let id = event.id;
        bus.emit(event);

        assert_eq!(seen.lock().unwrap().as_slice(), &[id]);
    }

    #[test]
    fn test_wildcard_subscriber_receives_everything() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0usize));

        let count_clone = Arc::clone(&count);
        bus.subscribe(TOPIC_ALL, move |_| {
            *count_clone.lock().unwrap() += 1;
        });

        bus.emit(created_event());
        bus.emit(created_event());

        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let bus = EventBus::new();
        bus.emit(created_event());
        assert_eq!(bus.subscriber_count("card.created"), 0);
    }
}
