//! The broker seam the producer loop publishes through.
//!
//! [`BrokerClient`] is the narrow capability set the loop needs: enqueue a
//! payload, wait for outstanding acknowledgements, and close. Delivery
//! outcomes do not come back through these calls; they arrive later as
//! [`DeliveryReport`]s on a channel handed out when the client is built.

use crate::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Outcome of one enqueued message, produced asynchronously by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub error: Option<String>,
}

impl DeliveryReport {
    pub fn delivered(topic: impl Into<String>, partition: i32, offset: i64) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset,
            error: None,
        }
    }

    pub fn failed(topic: impl Into<String>, partition: i32, error: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            partition,
            offset: -1,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Enqueues a payload. Success only means the client accepted it; the
    /// delivery outcome is reported later on the delivery report stream.
    fn publish(&self, topic: &str, key: Option<&[u8]>, payload: &[u8]) -> Result<()>;

    /// Waits up to `timeout` for outstanding messages and returns how many
    /// are still unacknowledged.
    async fn flush(&self, timeout: Duration) -> Result<usize>;

    /// Flushes, releases the client and closes the delivery report stream.
    /// Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}
