// Copyright 2025 Cowboy AI, LLC.

//! Envelope normalization
//!
//! Assigns a canonical id, timestamp and sequence number to every raw event.
//! The `type` discriminant alone decides which payload fields are read.
//!
//! Rules:
//! - `event_id`: `eventId`, then the legacy `id`, then a generated token
//! - `ts`: explicit `ts`, then the type-specific timestamp field
//! - `seq`: the provided value when positive, otherwise `last_seq + 1`
//!
//! A record with no derivable timestamp is rejected instead of being stamped
//! with "now", which would corrupt window math.

use super::{
    EpochMillis, Envelope, EventType, OrderEventKind, OrderStreamEvent, RawEvent, StreamEvent,
    SystemEventKind, SystemStreamEvent,
};
use crate::errors::OrdersError;
use crate::orders::{UNKNOWN_CATEGORY, UNKNOWN_COUNTRY, UNKNOWN_CURRENCY, UNKNOWN_CUSTOMER};
use tracing::warn;
use uuid::Uuid;

/// A raw event that could not be normalized
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedEvent {
    /// Resolved or generated event id
    pub event_id: String,
    /// The raw `type` value
    pub event_type: String,
    /// Why the event was rejected
    pub error: OrdersError,
}

/// Result of normalizing a batch
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBatch {
    /// Events with fully populated envelopes, in input order
    pub events: Vec<StreamEvent>,
    /// Records that could not be normalized
    pub rejected: Vec<RejectedEvent>,
    /// Sequence high-water mark after this batch
    pub last_seq: u64,
}

fn generate_event_id() -> String {
    format!("evt_{}", Uuid::new_v4().simple())
}

/// Normalize one raw event given the current sequence high-water mark
pub fn normalize_event(raw: RawEvent, last_seq: u64) -> Result<StreamEvent, RejectedEvent> {
    let event_id = raw
        .event_id
        .clone()
        .filter(|id| !id.is_empty())
        .or_else(|| raw.id.clone().filter(|id| !id.is_empty()))
        .unwrap_or_else(generate_event_id);

    let reject = |error: OrdersError| RejectedEvent {
        event_id: event_id.clone(),
        event_type: raw.event_type.clone(),
        error,
    };

    let event_type: EventType = raw.event_type.parse().map_err(&reject)?;

    let ts = raw
        .ts
        .or_else(|| raw.type_timestamp(event_type))
        .ok_or_else(|| {
            reject(OrdersError::MissingTimestamp {
                event_type: raw.event_type.clone(),
                event_id: event_id.clone(),
            })
        })?;

    let seq = match raw.seq {
        Some(seq) if seq > 0 => seq as u64,
        _ => last_seq + 1,
    };

    let at = raw.type_timestamp(event_type).unwrap_or(ts);
    let envelope = Envelope::new(event_id.clone(), ts, seq);

    if event_type.is_system() {
        let kind = match event_type {
            EventType::StreamConnected => SystemEventKind::Connected { at },
            EventType::StreamDisconnected => SystemEventKind::Disconnected {
                at,
                reason: raw.reason.clone(),
            },
            EventType::StreamReconnecting => SystemEventKind::Reconnecting {
                at,
                attempt: raw.attempt.unwrap_or(1),
            },
            _ => SystemEventKind::Reconnected { at },
        };
        return Ok(StreamEvent::System(SystemStreamEvent { envelope, kind }));
    }

    let order_id = raw
        .order_id
        .clone()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            reject(OrdersError::MissingOrderId {
                event_type: raw.event_type.clone(),
                event_id: event_id.clone(),
            })
        })?;

    let kind = order_kind(event_type, &raw, at);
    Ok(StreamEvent::Order(OrderStreamEvent::new(envelope, order_id, kind)))
}

fn order_kind(event_type: EventType, raw: &RawEvent, at: EpochMillis) -> OrderEventKind {
    match event_type {
        EventType::OrderCreated => OrderEventKind::Created {
            customer_id: raw
                .customer_id
                .clone()
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
            country: raw
                .country
                .clone()
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            category: raw
                .category
                .clone()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            amount: raw.amount.unwrap_or(0.0),
            currency: raw
                .currency
                .clone()
                .unwrap_or_else(|| UNKNOWN_CURRENCY.to_string()),
            created_at: at,
        },
        EventType::PaymentAuthorized => OrderEventKind::PaymentAuthorized { authorized_at: at },
        EventType::PaymentFailed => OrderEventKind::PaymentFailed {
            failed_at: at,
            reason: raw.reason.clone().unwrap_or_else(|| "unknown".to_string()),
        },
        EventType::OrderPicked => OrderEventKind::Picked { picked_at: at },
        EventType::OrderShipped => OrderEventKind::Shipped { shipped_at: at },
        EventType::OrderDelivered => OrderEventKind::Delivered { delivered_at: at },
        _ => OrderEventKind::Cancelled {
            cancelled_at: at,
            reason: raw.reason.clone(),
        },
    }
}

/// Normalize a batch, threading the sequence cursor through it
///
/// Rejected records do not consume a sequence number.
pub fn normalize_batch(batch: Vec<RawEvent>, last_seq: u64) -> NormalizedBatch {
    let mut cursor = last_seq;
    let mut events = Vec::with_capacity(batch.len());
    let mut rejected = Vec::new();

    for raw in batch {
        match normalize_event(raw, cursor) {
            Ok(event) => {
                cursor = cursor.max(event.seq());
                events.push(event);
            }
            Err(rejection) => {
                warn!(
                    event_id = %rejection.event_id,
                    event_type = %rejection.event_type,
                    error = %rejection.error,
                    "Rejected stream event"
                );
                rejected.push(rejection);
            }
        }
    }

    NormalizedBatch {
        events,
        rejected,
        last_seq: cursor,
    }
}
