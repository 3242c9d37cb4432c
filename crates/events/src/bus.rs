//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Domain flows publish a [`PlatformEvent`] after their primary write
//! succeeds; the notification router subscribes and turns events into
//! notifications. Publishing never fails the caller.

use chrono::{DateTime, Utc};
use collabbridge_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Dot-separated event names. The source entity of each event is noted.
pub mod names {
    /// Source: booking.
    pub const BOOKING_REQUESTED: &str = "booking.requested";
    /// Source: booking.
    pub const BOOKING_ACCEPTED: &str = "booking.accepted";
    /// Source: booking.
    pub const BOOKING_REJECTED: &str = "booking.rejected";
    /// Source: booking. Actor is the cancelling party.
    pub const BOOKING_CANCELLED: &str = "booking.cancelled";
    /// Source: booking.
    pub const BOOKING_COMPLETED: &str = "booking.completed";

    /// Source: application.
    pub const APPLICATION_SUBMITTED: &str = "application.submitted";
    /// Source: application.
    pub const APPLICATION_ACCEPTED: &str = "application.accepted";
    /// Source: application.
    pub const APPLICATION_REJECTED: &str = "application.rejected";

    /// Source: event.
    pub const EVENT_UPDATED: &str = "event.updated";
    /// Source: event.
    pub const EVENT_CANCELLED: &str = "event.cancelled";
    /// Source: event. Published once per event by the reminder scheduler.
    pub const EVENT_REMINDER: &str = "event.reminder";

    /// Source: message. Only published when the recipient does not have
    /// the conversation open.
    pub const MESSAGE_RECEIVED: &str = "message.received";

    /// Source: review.
    pub const REVIEW_CREATED: &str = "review.created";
}

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// A domain event that occurred on the platform.
///
/// Constructed via [`PlatformEvent::new`] and enriched with the builder
/// methods [`with_source`](PlatformEvent::with_source),
/// [`with_actor`](PlatformEvent::with_actor), and
/// [`with_payload`](PlatformEvent::with_payload).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// One of the [`names`] constants.
    pub event_type: String,

    /// Source entity kind (e.g. `"booking"`, `"message"`).
    pub source_entity_type: Option<String>,

    /// Source entity database id.
    pub source_entity_id: Option<DbId>,

    /// User that triggered the event.
    pub actor_user_id: Option<DbId>,

    /// Free-form JSON payload carrying event-specific data.
    pub payload: serde_json::Value,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    /// Create a new event with only the required `event_type`.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            source_entity_type: None,
            source_entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_source(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.source_entity_type = Some(entity_type.into());
        self.source_entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// In-process fan-out event bus, shared as `Arc<EventBus>`.
///
/// ```rust
/// use collabbridge_events::bus::{names, EventBus, PlatformEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(PlatformEvent::new(names::BOOKING_REQUESTED).with_source("booking", 1));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is dropped.
    pub fn publish(&self, event: PlatformEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("Event published with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
