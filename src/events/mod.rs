// Copyright 2025 Cowboy AI, LLC.

//! Stream events for the order dashboard
//!
//! Every event that reaches the reducer is a [`StreamEvent`]: an exhaustive
//! union over order-lifecycle and connection-lifecycle kinds, each carrying a
//! fully populated [`Envelope`]. Producers hand in loosely shaped
//! [`RawEvent`]s; the [`normalize`] module turns those into typed events using
//! the `type` discriminant alone.

pub mod normalize;
pub mod raw;

pub use normalize::{normalize_batch, normalize_event, NormalizedBatch, RejectedEvent};
pub use raw::RawEvent;

use crate::errors::OrdersError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Milliseconds since the Unix epoch
pub type EpochMillis = i64;

/// Identity, wall-clock time and ordering information carried by every event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Stable dedup key
    pub event_id: String,
    /// Wall-clock timestamp
    pub ts: EpochMillis,
    /// Producer sequence number
    pub seq: u64,
}

impl Envelope {
    /// Create an envelope
    pub fn new(event_id: impl Into<String>, ts: EpochMillis, seq: u64) -> Self {
        Self {
            event_id: event_id.into(),
            ts,
            seq,
        }
    }
}

/// The `type` discriminant of a stream event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A new order was placed
    OrderCreated,
    /// Payment succeeded
    PaymentAuthorized,
    /// Payment failed
    PaymentFailed,
    /// Warehouse picked the order
    OrderPicked,
    /// Carrier took the order
    OrderShipped,
    /// Order reached the customer
    OrderDelivered,
    /// Order was cancelled
    OrderCancelled,
    /// Stream connection established
    StreamConnected,
    /// Stream connection lost
    StreamDisconnected,
    /// Producer is retrying the connection
    StreamReconnecting,
    /// Connection restored after a retry
    StreamReconnected,
}

impl EventType {
    /// Every event type, order-lifecycle first
    pub const ALL: [EventType; 11] = [
        EventType::OrderCreated,
        EventType::PaymentAuthorized,
        EventType::PaymentFailed,
        EventType::OrderPicked,
        EventType::OrderShipped,
        EventType::OrderDelivered,
        EventType::OrderCancelled,
        EventType::StreamConnected,
        EventType::StreamDisconnected,
        EventType::StreamReconnecting,
        EventType::StreamReconnected,
    ];

    /// Wire name of this type
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::OrderCreated => "order_created",
            EventType::PaymentAuthorized => "payment_authorized",
            EventType::PaymentFailed => "payment_failed",
            EventType::OrderPicked => "order_picked",
            EventType::OrderShipped => "order_shipped",
            EventType::OrderDelivered => "order_delivered",
            EventType::OrderCancelled => "order_cancelled",
            EventType::StreamConnected => "stream_connected",
            EventType::StreamDisconnected => "stream_disconnected",
            EventType::StreamReconnecting => "stream_reconnecting",
            EventType::StreamReconnected => "stream_reconnected",
        }
    }

    /// Whether this is a connection-lifecycle type
    pub fn is_system(&self) -> bool {
        matches!(
            self,
            EventType::StreamConnected
                | EventType::StreamDisconnected
                | EventType::StreamReconnecting
                | EventType::StreamReconnected
        )
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = OrdersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| OrdersError::UnknownEventType(s.to_string()))
    }
}

/// Payload of an order-lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum OrderEventKind {
    /// Seeds the authoritative order attributes
    #[serde(rename = "order_created", rename_all = "camelCase")]
    Created {
        /// Customer placing the order
        customer_id: String,
        /// Shipping country
        country: String,
        /// Product category
        category: String,
        /// Order value
        amount: f64,
        /// ISO currency code
        currency: String,
        /// Creation time
        created_at: EpochMillis,
    },
    /// Payment succeeded
    #[serde(rename = "payment_authorized", rename_all = "camelCase")]
    PaymentAuthorized {
        /// Authorization time
        authorized_at: EpochMillis,
    },
    /// Payment failed
    #[serde(rename = "payment_failed", rename_all = "camelCase")]
    PaymentFailed {
        /// Failure time
        failed_at: EpochMillis,
        /// Failure reason reported by the payment provider
        reason: String,
    },
    /// Warehouse picked the order
    #[serde(rename = "order_picked", rename_all = "camelCase")]
    Picked {
        /// Pick time
        picked_at: EpochMillis,
    },
    /// Carrier took the order
    #[serde(rename = "order_shipped", rename_all = "camelCase")]
    Shipped {
        /// Ship time
        shipped_at: EpochMillis,
    },
    /// Order reached the customer
    #[serde(rename = "order_delivered", rename_all = "camelCase")]
    Delivered {
        /// Delivery time
        delivered_at: EpochMillis,
    },
    /// Order was cancelled
    #[serde(rename = "order_cancelled", rename_all = "camelCase")]
    Cancelled {
        /// Cancellation time
        cancelled_at: EpochMillis,
        /// Optional cancellation reason
        reason: Option<String>,
    },
}

impl OrderEventKind {
    /// The event type of this payload
    pub fn event_type(&self) -> EventType {
        match self {
            OrderEventKind::Created { .. } => EventType::OrderCreated,
            OrderEventKind::PaymentAuthorized { .. } => EventType::PaymentAuthorized,
            OrderEventKind::PaymentFailed { .. } => EventType::PaymentFailed,
            OrderEventKind::Picked { .. } => EventType::OrderPicked,
            OrderEventKind::Shipped { .. } => EventType::OrderShipped,
            OrderEventKind::Delivered { .. } => EventType::OrderDelivered,
            OrderEventKind::Cancelled { .. } => EventType::OrderCancelled,
        }
    }

    /// The type-specific occurrence time
    pub fn occurred_at(&self) -> EpochMillis {
        match self {
            OrderEventKind::Created { created_at, .. } => *created_at,
            OrderEventKind::PaymentAuthorized { authorized_at } => *authorized_at,
            OrderEventKind::PaymentFailed { failed_at, .. } => *failed_at,
            OrderEventKind::Picked { picked_at } => *picked_at,
            OrderEventKind::Shipped { shipped_at } => *shipped_at,
            OrderEventKind::Delivered { delivered_at } => *delivered_at,
            OrderEventKind::Cancelled { cancelled_at, .. } => *cancelled_at,
        }
    }

    /// Failure or cancellation reason, if the kind carries one
    pub fn reason(&self) -> Option<&str> {
        match self {
            OrderEventKind::PaymentFailed { reason, .. } => Some(reason.as_str()),
            OrderEventKind::Cancelled { reason, .. } => reason.as_deref(),
            _ => None,
        }
    }
}

/// An order-lifecycle event with its envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStreamEvent {
    /// Envelope fields
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Order this event belongs to
    pub order_id: String,
    /// Kind-specific payload
    #[serde(flatten)]
    pub kind: OrderEventKind,
}

impl OrderStreamEvent {
    /// Create an order event
    pub fn new(envelope: Envelope, order_id: impl Into<String>, kind: OrderEventKind) -> Self {
        Self {
            envelope,
            order_id: order_id.into(),
            kind,
        }
    }

    /// The event type
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    /// The type-specific occurrence time
    pub fn occurred_at(&self) -> EpochMillis {
        self.kind.occurred_at()
    }
}

/// Payload of a connection-lifecycle event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemEventKind {
    /// Stream connection established
    #[serde(rename = "stream_connected")]
    Connected {
        /// Occurrence time
        at: EpochMillis,
    },
    /// Stream connection lost
    #[serde(rename = "stream_disconnected")]
    Disconnected {
        /// Occurrence time
        at: EpochMillis,
        /// Why the connection dropped
        reason: Option<String>,
    },
    /// Producer is retrying the connection
    #[serde(rename = "stream_reconnecting")]
    Reconnecting {
        /// Occurrence time
        at: EpochMillis,
        /// Retry attempt number
        attempt: u32,
    },
    /// Connection restored after a retry
    #[serde(rename = "stream_reconnected")]
    Reconnected {
        /// Occurrence time
        at: EpochMillis,
    },
}

impl SystemEventKind {
    /// The event type of this payload
    pub fn event_type(&self) -> EventType {
        match self {
            SystemEventKind::Connected { .. } => EventType::StreamConnected,
            SystemEventKind::Disconnected { .. } => EventType::StreamDisconnected,
            SystemEventKind::Reconnecting { .. } => EventType::StreamReconnecting,
            SystemEventKind::Reconnected { .. } => EventType::StreamReconnected,
        }
    }

    /// Occurrence time
    pub fn at(&self) -> EpochMillis {
        match self {
            SystemEventKind::Connected { at }
            | SystemEventKind::Disconnected { at, .. }
            | SystemEventKind::Reconnecting { at, .. }
            | SystemEventKind::Reconnected { at } => *at,
        }
    }
}

/// A connection-lifecycle event with its envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemStreamEvent {
    /// Envelope fields
    #[serde(flatten)]
    pub envelope: Envelope,
    /// Kind-specific payload
    #[serde(flatten)]
    pub kind: SystemEventKind,
}

/// Any event on the stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StreamEvent {
    /// Order-lifecycle event
    Order(OrderStreamEvent),
    /// Connection-lifecycle event
    System(SystemStreamEvent),
}

impl StreamEvent {
    /// The envelope
    pub fn envelope(&self) -> &Envelope {
        match self {
            StreamEvent::Order(e) => &e.envelope,
            StreamEvent::System(e) => &e.envelope,
        }
    }

    /// Dedup key
    pub fn event_id(&self) -> &str {
        &self.envelope().event_id
    }

    /// Sequence number
    pub fn seq(&self) -> u64 {
        self.envelope().seq
    }

    /// Envelope timestamp
    pub fn ts(&self) -> EpochMillis {
        self.envelope().ts
    }

    /// The event type
    pub fn event_type(&self) -> EventType {
        match self {
            StreamEvent::Order(e) => e.event_type(),
            StreamEvent::System(e) => e.kind.event_type(),
        }
    }

    /// Order identifier for order-lifecycle events
    pub fn order_id(&self) -> Option<&str> {
        match self {
            StreamEvent::Order(e) => Some(e.order_id.as_str()),
            StreamEvent::System(_) => None,
        }
    }

    /// Borrow as an order event
    pub fn as_order(&self) -> Option<&OrderStreamEvent> {
        match self {
            StreamEvent::Order(e) => Some(e),
            StreamEvent::System(_) => None,
        }
    }

    /// Borrow as a system event
    pub fn as_system(&self) -> Option<&SystemStreamEvent> {
        match self {
            StreamEvent::System(e) => Some(e),
            StreamEvent::Order(_) => None,
        }
    }
}

impl From<OrderStreamEvent> for StreamEvent {
    fn from(event: OrderStreamEvent) -> Self {
        StreamEvent::Order(event)
    }
}

impl From<SystemStreamEvent> for StreamEvent {
    fn from(event: SystemStreamEvent) -> Self {
        StreamEvent::System(event)
    }
}
