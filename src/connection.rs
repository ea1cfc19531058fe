// Copyright 2025 Cowboy AI, LLC.

//! Connection status tracking
//!
//! Four states driven solely by connection-lifecycle events. Reconnect timing
//! belongs to the producer; nothing here owns a timer.

use crate::events::{StreamEvent, SystemEventKind};
use crate::state_machine::{EventDrivenState, State};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Reported status of the upstream event stream
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Waiting for the first connection
    #[default]
    Connecting,
    /// Stream is live
    Connected,
    /// Producer is retrying
    Reconnecting,
    /// Stream dropped
    Offline,
}

impl State for ConnectionStatus {
    fn name(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Reconnecting => "reconnecting",
            ConnectionStatus::Offline => "offline",
        }
    }
}

impl EventDrivenState for ConnectionStatus {
    type Input = StreamEvent;

    fn on_input(&self, event: &StreamEvent) -> Self {
        let Some(system) = event.as_system() else {
            return *self;
        };
        match system.kind {
            SystemEventKind::Connected { .. } | SystemEventKind::Reconnected { .. } => {
                ConnectionStatus::Connected
            }
            SystemEventKind::Reconnecting { .. } => ConnectionStatus::Reconnecting,
            SystemEventKind::Disconnected { .. } => ConnectionStatus::Offline,
        }
    }
}

impl ConnectionStatus {
    /// Apply an event, logging when the status changes
    pub fn track(self, event: &StreamEvent) -> Self {
        let next = self.on_input(event);
        if next != self {
            info!(
                from = self.name(),
                to = next.name(),
                event_id = %event.event_id(),
                "Connection status changed"
            );
        }
        next
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
