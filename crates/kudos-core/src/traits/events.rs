//! Event sink trait for fire-and-forget domain event emission.

use crate::events::DomainEvent;

/// Sink for domain events.
///
/// Emission is fire-and-forget with at-least-once semantics at best; no
/// core behavior may depend on delivery, and implementations must never
/// propagate handler failures to the emitter.
pub trait EventSink: Send + Sync + std::fmt::Debug + 'static {
    /// Emit an event to all interested subscribers.
    fn emit(&self, event: DomainEvent);
}
