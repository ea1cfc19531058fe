// Copyright 2025 Cowboy AI, LLC.

//! Single-writer aggregation actor
//!
//! The engine itself is synchronous. When batches arrive from concurrent
//! producers, this actor serializes them: one task owns the
//! [`DashboardState`], applies at most one batch at a time, and publishes an
//! immutable snapshot after each command.

use crate::dashboard::{DashboardEngine, DashboardState};
use crate::errors::{OrdersError, OrdersResult};
use crate::events::{EpochMillis, RawEvent, RejectedEvent};
use anyhow::Context;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A batch handed over by the producer, stamped with its receipt time
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedBatch {
    /// Raw events in arrival order
    pub events: Vec<RawEvent>,
    /// Receipt time, used as `now`
    pub received_at: EpochMillis,
}

impl ReceivedBatch {
    /// Create a batch
    pub fn new(events: Vec<RawEvent>, received_at: EpochMillis) -> Self {
        Self {
            events,
            received_at,
        }
    }
}

/// What happened to one ingested batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchReport {
    /// Events folded in
    pub applied: usize,
    /// Events skipped as already seen
    pub duplicates: usize,
    /// Events that could not be normalized
    pub rejected: Vec<RejectedEvent>,
}

enum Command {
    Ingest {
        batch: ReceivedBatch,
        reply: oneshot::Sender<BatchReport>,
    },
    Reset {
        reply: oneshot::Sender<()>,
    },
}

/// Client side of the aggregation actor
#[derive(Debug, Clone)]
pub struct AggregatorHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<DashboardState>>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Ingest { batch, .. } => f
                .debug_struct("Ingest")
                .field("events", &batch.events.len())
                .field("received_at", &batch.received_at)
                .finish(),
            Command::Reset { .. } => f.write_str("Reset"),
        }
    }
}

impl AggregatorHandle {
    /// Apply a batch and wait until its snapshot is published
    pub async fn ingest(&self, batch: ReceivedBatch) -> OrdersResult<BatchReport> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(Command::Ingest { batch, reply })
            .await
            .map_err(|_| OrdersError::ChannelClosed)?;
        done.await.map_err(|_| OrdersError::ChannelClosed)
    }

    /// Replace the state with an empty one
    pub async fn reset(&self) -> OrdersResult<()> {
        let (reply, done) = oneshot::channel();
        self.commands
            .send(Command::Reset { reply })
            .await
            .map_err(|_| OrdersError::ChannelClosed)?;
        done.await.map_err(|_| OrdersError::ChannelClosed)
    }

    /// Latest published state
    pub fn snapshot(&self) -> Arc<DashboardState> {
        Arc::clone(&self.snapshots.borrow())
    }

    /// Watch for new snapshots
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardState>> {
        self.snapshots.clone()
    }
}

/// Start the actor; it stops once every handle has been dropped
pub fn spawn_aggregator(
    engine: DashboardEngine,
    buffer: usize,
) -> (AggregatorHandle, JoinHandle<()>) {
    let (commands, mut inbox) = mpsc::channel::<Command>(buffer.max(1));
    let initial = engine.reset();
    let (publisher, snapshots) = watch::channel(Arc::new(initial.clone()));

    let task = tokio::spawn(async move {
        info!("Aggregation actor started");
        let mut state = initial;

        while let Some(command) = inbox.recv().await {
            debug!(?command, "Aggregation actor command");
            match command {
                Command::Ingest { batch, reply } => {
                    let outcome = engine.ingest_batch(state, batch.events, batch.received_at);
                    state = outcome.state;
                    publisher.send_replace(Arc::new(state.clone()));
                    let _ = reply.send(BatchReport {
                        applied: outcome.applied,
                        duplicates: outcome.duplicates,
                        rejected: outcome.rejected,
                    });
                }
                Command::Reset { reply } => {
                    state = engine.reset();
                    publisher.send_replace(Arc::new(state.clone()));
                    let _ = reply.send(());
                }
            }
        }

        info!("Aggregation actor stopped");
    });

    (AggregatorHandle { commands, snapshots }, task)
}

/// Producer of raw event batches
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send {
    /// Next batch, or `None` once the source is exhausted
    async fn next_batch(&mut self) -> anyhow::Result<Option<ReceivedBatch>>;
}

/// Replays prerecorded batches
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    batches: VecDeque<ReceivedBatch>,
}

impl ReplaySource {
    /// Create a source that yields `batches` in order
    pub fn new(batches: impl IntoIterator<Item = ReceivedBatch>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EventSource for ReplaySource {
    async fn next_batch(&mut self) -> anyhow::Result<Option<ReceivedBatch>> {
        Ok(self.batches.pop_front())
    }
}

/// Drain `source` into the actor; returns the number of batches forwarded
pub async fn pump<S>(source: &mut S, handle: &AggregatorHandle) -> anyhow::Result<usize>
where
    S: EventSource + ?Sized,
{
    let mut forwarded = 0;
    while let Some(batch) = source
        .next_batch()
        .await
        .context("event source failed")?
    {
        handle
            .ingest(batch)
            .await
            .context("aggregation actor is gone")?;
        forwarded += 1;
    }
    info!(batches = forwarded, "Event source exhausted");
    Ok(forwarded)
}
