// Copyright 2025 Cowboy AI, LLC.

//! Producer-side event records
//!
//! A [`RawEvent`] is whatever the producer managed to send: a `type`
//! discriminant plus any subset of envelope and payload fields. Nothing here is
//! trusted until [`normalize_event`](super::normalize_event) has run.

use super::{EpochMillis, EventType};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A loosely shaped event as delivered by the producer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct RawEvent {
    /// Event type discriminant
    #[serde(rename = "type")]
    pub event_type: String,
    /// Legacy identifier
    pub id: Option<String>,
    /// Dedup key
    pub event_id: Option<String>,
    /// Explicit wall-clock timestamp
    pub ts: Option<EpochMillis>,
    /// Producer sequence number; non-positive values are treated as absent
    pub seq: Option<i64>,
    /// Order identifier
    pub order_id: Option<String>,
    /// Customer identifier (order_created)
    pub customer_id: Option<String>,
    /// Shipping country (order_created)
    pub country: Option<String>,
    /// Product category (order_created)
    pub category: Option<String>,
    /// Order value (order_created)
    pub amount: Option<f64>,
    /// Currency code (order_created)
    pub currency: Option<String>,
    /// Creation time (order_created)
    pub created_at: Option<EpochMillis>,
    /// Authorization time (payment_authorized)
    pub authorized_at: Option<EpochMillis>,
    /// Failure time (payment_failed)
    pub failed_at: Option<EpochMillis>,
    /// Pick time (order_picked)
    pub picked_at: Option<EpochMillis>,
    /// Ship time (order_shipped)
    pub shipped_at: Option<EpochMillis>,
    /// Delivery time (order_delivered)
    pub delivered_at: Option<EpochMillis>,
    /// Cancellation time (order_cancelled)
    pub cancelled_at: Option<EpochMillis>,
    /// Occurrence time (connection events)
    pub at: Option<EpochMillis>,
    /// Failure, cancellation or disconnect reason
    pub reason: Option<String>,
    /// Reconnect attempt number
    pub attempt: Option<u32>,
}

impl RawEvent {
    /// Create an empty record of the given type
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type: event_type.as_str().to_string(),
            ..Default::default()
        }
    }

    /// An `order_created` record with all attributes present
    pub fn order_created(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        country: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        created_at: EpochMillis,
    ) -> Self {
        Self {
            order_id: Some(order_id.into()),
            customer_id: Some(customer_id.into()),
            country: Some(country.into()),
            category: Some(category.into()),
            amount: Some(amount),
            currency: Some("USD".to_string()),
            created_at: Some(created_at),
            ..Self::new(EventType::OrderCreated)
        }
    }

    /// A non-creation order record with its type-specific timestamp set
    pub fn order_update(
        event_type: EventType,
        order_id: impl Into<String>,
        at: EpochMillis,
    ) -> Self {
        let mut raw = Self::new(event_type);
        raw.order_id = Some(order_id.into());
        if let Some(slot) = raw.timestamp_slot_mut() {
            *slot = Some(at);
        }
        raw
    }

    /// A connection-lifecycle record
    pub fn system(event_type: EventType, at: EpochMillis) -> Self {
        Self {
            at: Some(at),
            ..Self::new(event_type)
        }
    }

    /// Set the dedup key
    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = Some(event_id.into());
        self
    }

    /// Set the sequence number
    pub fn with_seq(mut self, seq: i64) -> Self {
        self.seq = Some(seq);
        self
    }

    /// Set the explicit timestamp
    pub fn with_ts(mut self, ts: EpochMillis) -> Self {
        self.ts = Some(ts);
        self
    }

    /// Set the reason field
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The type-specific timestamp for `event_type`, chosen by discriminant
    pub fn type_timestamp(&self, event_type: EventType) -> Option<EpochMillis> {
        match event_type {
            EventType::OrderCreated => self.created_at,
            EventType::PaymentAuthorized => self.authorized_at,
            EventType::PaymentFailed => self.failed_at,
            EventType::OrderPicked => self.picked_at,
            EventType::OrderShipped => self.shipped_at,
            EventType::OrderDelivered => self.delivered_at,
            EventType::OrderCancelled => self.cancelled_at,
            EventType::StreamConnected
            | EventType::StreamDisconnected
            | EventType::StreamReconnecting
            | EventType::StreamReconnected => self.at,
        }
    }

    fn timestamp_slot_mut(&mut self) -> Option<&mut Option<EpochMillis>> {
        let event_type: EventType = self.event_type.parse().ok()?;
        Some(match event_type {
            EventType::OrderCreated => &mut self.created_at,
            EventType::PaymentAuthorized => &mut self.authorized_at,
            EventType::PaymentFailed => &mut self.failed_at,
            EventType::OrderPicked => &mut self.picked_at,
            EventType::OrderShipped => &mut self.shipped_at,
            EventType::OrderDelivered => &mut self.delivered_at,
            EventType::OrderCancelled => &mut self.cancelled_at,
            _ => &mut self.at,
        })
    }
}
