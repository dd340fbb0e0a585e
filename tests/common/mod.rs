#![allow(dead_code)]

use async_trait::async_trait;
use payment_producer::config::ProducerConfig;
use payment_producer::{BrokerClient, DeliveryReport, Error, PaymentEvent, Result};
use std::env;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Get test configuration from environment variables
pub fn get_test_config() -> ProducerConfig {
    ProducerConfig {
        brokers: env::var("TEST_KAFKA_BROKERS").unwrap_or_else(|_| "localhost:9092".to_string()),
        topic: format!("test_payments_{}", std::process::id()),
        client_id: format!("payment-producer-test-{}", std::process::id()),
        acks: "all".to_string(),
        interval_secs: 1,
        flush_timeout_ms: 15_000,
        report_buffer: 64,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckMode {
    /// Every publish is acknowledged at once.
    Ack,
    /// Nothing is ever acknowledged; flush runs out its timeout.
    Never,
    /// Every publish is rejected by the client.
    Reject,
}

#[derive(Debug, Default)]
pub struct Journal {
    pub attempts: Vec<u64>,
    pub published: Vec<(u64, Instant)>,
    pub flushes: Vec<(usize, Instant)>,
    pub closed_at: Option<Instant>,
}

/// In-memory stand-in for the Kafka client.
pub struct MockBroker {
    mode: AckMode,
    reports: Mutex<Option<mpsc::Sender<DeliveryReport>>>,
    journal: Mutex<Journal>,
}

impl MockBroker {
    pub fn new(mode: AckMode) -> (Self, mpsc::Receiver<DeliveryReport>) {
        let (tx, rx) = mpsc::channel(64);
        let broker = Self {
            mode,
            reports: Mutex::new(Some(tx)),
            journal: Mutex::new(Journal::default()),
        };
        (broker, rx)
    }

    pub fn attempts(&self) -> Vec<u64> {
        self.journal.lock().unwrap().attempts.clone()
    }

    pub fn published_ids(&self) -> Vec<u64> {
        self.journal.lock().unwrap().published.iter().map(|(id, _)| *id).collect()
    }

    pub fn published_at(&self) -> Vec<Instant> {
        self.journal.lock().unwrap().published.iter().map(|(_, at)| *at).collect()
    }

    pub fn flushes(&self) -> Vec<(usize, Instant)> {
        self.journal.lock().unwrap().flushes.clone()
    }

    pub fn closed_at(&self) -> Option<Instant> {
        self.journal.lock().unwrap().closed_at
    }
}

#[async_trait]
impl BrokerClient for MockBroker {
    fn publish(&self, topic: &str, key: Option<&[u8]>, payload: &[u8]) -> Result<()> {
        assert!(key.is_none(), "producer must leave partitioning to the broker");

        let event: PaymentEvent = serde_json::from_slice(payload)?;
        let mut journal = self.journal.lock().unwrap();
        journal.attempts.push(event.id);

        if self.mode == AckMode::Reject {
            return Err(Error::Enqueue {
                topic: topic.to_string(),
                reason: "Local: Queue full".to_string(),
            });
        }

        let offset = journal.published.len() as i64;
        journal.published.push((event.id, Instant::now()));

        if self.mode == AckMode::Ack {
            if let Some(tx) = self.reports.lock().unwrap().as_ref() {
                tx.try_send(DeliveryReport::delivered(topic, 0, offset))
                    .expect("report channel full");
            }
        }
        Ok(())
    }

    async fn flush(&self, timeout: Duration) -> Result<usize> {
        let remaining = match self.mode {
            AckMode::Never => {
                tokio::time::sleep(timeout).await;
                self.journal.lock().unwrap().published.len()
            }
            AckMode::Ack | AckMode::Reject => 0,
        };
        self.journal
            .lock()
            .unwrap()
            .flushes
            .push((remaining, Instant::now()));
        Ok(remaining)
    }

    async fn close(&mut self) -> Result<()> {
        self.reports.lock().unwrap().take();
        self.journal.lock().unwrap().closed_at.get_or_insert_with(Instant::now);
        Ok(())
    }
}
