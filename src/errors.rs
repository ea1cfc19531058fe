// Copyright 2025 Cowboy AI, LLC.

//! Error types for order stream operations
//!
//! Duplicate delivery, out-of-order arrival and partial events are absorbed by
//! the reducer and never show up here. The only per-event failure is a record
//! that cannot be normalized into an envelope.

use thiserror::Error;

/// Errors that can occur while normalizing, configuring or driving the engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrdersError {
    /// The raw event has no explicit or type-specific timestamp
    #[error("Missing timestamp for {event_type} event {event_id}")]
    MissingTimestamp {
        /// Event type discriminant
        event_type: String,
        /// Event identifier (possibly generated)
        event_id: String,
    },

    /// An order-lifecycle event without an order identifier
    #[error("Missing orderId for {event_type} event {event_id}")]
    MissingOrderId {
        /// Event type discriminant
        event_type: String,
        /// Event identifier (possibly generated)
        event_id: String,
    },

    /// The `type` discriminant is not part of the event union
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected
        reason: String,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// The aggregation actor is no longer running
    #[error("Aggregator channel closed")]
    ChannelClosed,
}

/// Result type for order stream operations
pub type OrdersResult<T> = Result<T, OrdersError>;

impl From<serde_json::Error> for OrdersError {
    fn from(err: serde_json::Error) -> Self {
        OrdersError::SerializationError(err.to_string())
    }
}

impl OrdersError {
    /// Create a configuration error
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        OrdersError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Check if this error rejects a single event rather than the whole call
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            OrdersError::MissingTimestamp { .. }
                | OrdersError::MissingOrderId { .. }
                | OrdersError::UnknownEventType(_)
        )
    }
}
