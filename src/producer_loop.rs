//! The producer loop: one publish per scheduler tick until shutdown.
//!
//! Each tick runs `next id -> serialize -> publish -> flush` to completion
//! before the loop looks at its inputs again, so at most one publish is ever
//! waiting on its flush. A shutdown request that arrives mid-tick is picked up
//! once the flush returns; it never interrupts one.
//!
//! Every per-tick failure is logged and contained. The identifier consumed by
//! a failed tick is not reused.

use crate::broker::BrokerClient;
use crate::event::{IdGenerator, PaymentEvent};
use crate::kafka::serializer::{EventSerializer, JsonSerializer};
use crate::scheduler::Scheduler;
use crate::shutdown::ShutdownSignal;
use crate::{Error, Result};
use std::time::Duration;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopping,
    Stopped,
}

/// What happened to the event built on one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Published and acknowledged before the flush returned.
    Flushed { id: u64 },
    /// Published, but the flush returned with messages outstanding.
    Pending { id: u64, remaining: usize },
    /// Published, but the flush call itself failed.
    FlushFailed { id: u64 },
    SerializationFailed { id: u64 },
    EnqueueFailed { id: u64 },
}

impl TickOutcome {
    pub fn id(&self) -> u64 {
        match *self {
            TickOutcome::Flushed { id }
            | TickOutcome::Pending { id, .. }
            | TickOutcome::FlushFailed { id }
            | TickOutcome::SerializationFailed { id }
            | TickOutcome::EnqueueFailed { id } => id,
        }
    }

    /// Whether the broker client accepted the event.
    pub fn was_published(&self) -> bool {
        matches!(
            self,
            TickOutcome::Flushed { .. } | TickOutcome::Pending { .. } | TickOutcome::FlushFailed { .. }
        )
    }
}

pub struct ProducerLoop<B, S = JsonSerializer> {
    broker: B,
    serializer: S,
    ids: IdGenerator,
    topic: String,
    flush_timeout: Duration,
    state: LoopState,
}

impl<B: BrokerClient> ProducerLoop<B> {
    pub fn new(broker: B, topic: impl Into<String>, flush_timeout: Duration) -> Self {
        Self::with_serializer(broker, JsonSerializer::new(), topic, flush_timeout)
    }
}

impl<B: BrokerClient, S: EventSerializer> ProducerLoop<B, S> {
    pub fn with_serializer(
        broker: B,
        serializer: S,
        topic: impl Into<String>,
        flush_timeout: Duration,
    ) -> Self {
        Self {
            broker,
            serializer,
            ids: IdGenerator::new(),
            topic: topic.into(),
            flush_timeout,
            state: LoopState::Running,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn ids(&self) -> &IdGenerator {
        &self.ids
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    /// Runs until `shutdown` fires, then closes the broker client.
    ///
    /// When a tick and the shutdown notification are ready together, shutdown
    /// wins and no further publish is issued.
    pub async fn run(&mut self, mut scheduler: Scheduler, mut shutdown: ShutdownSignal) -> Result<()> {
        if self.state != LoopState::Running {
            return Ok(());
        }

        info!(
            topic = %self.topic,
            interval_secs = scheduler.period().as_secs(),
            flush_timeout_ms = self.flush_timeout.as_millis() as u64,
            "Producer loop started"
        );

        while self.state == LoopState::Running {
            tokio::select! {
                biased;

                _ = shutdown.notified() => {
                    info!("Shutdown requested, stopping producer loop");
                    self.state = LoopState::Stopping;
                }
                _ = scheduler.tick() => {
                    let outcome = self.on_tick().await;
                    debug!(
                        id = outcome.id(),
                        published = outcome.was_published(),
                        ?outcome,
                        "Tick complete"
                    );
                }
            }
        }

        let closed = self.broker.close().await;
        self.state = LoopState::Stopped;

        match &closed {
            Ok(()) => info!(last_id = self.ids.current(), "Producer loop stopped"),
            Err(e) => error!("Failed to close broker client: {}", e),
        }
        closed
    }

    pub(crate) async fn on_tick(&mut self) -> TickOutcome {
        let id = self.ids.next();
        let event = PaymentEvent::new(id);

        let payload = match self.serializer.serialize(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!(id, "Failed to serialize payment event: {}", e);
                return TickOutcome::SerializationFailed { id };
            }
        };

        if let Err(e) = self.broker.publish(&self.topic, None, &payload) {
            error!(id, topic = %self.topic, "Failed to publish payment event: {}", e);
            return TickOutcome::EnqueueFailed { id };
        }
        debug!(id, topic = %self.topic, "Payment event enqueued");

        match self.broker.flush(self.flush_timeout).await {
            Ok(0) => {
                info!(id, "Payment event flushed");
                TickOutcome::Flushed { id }
            }
            Ok(remaining) => {
                warn!(id, "{}", Error::FlushTimeout { remaining });
                TickOutcome::Pending { id, remaining }
            }
            Err(e) => {
                warn!(id, "Flush failed: {}", e);
                TickOutcome::FlushFailed { id }
            }
        }
    }
}
