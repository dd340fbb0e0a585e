use crate::broker::{BrokerClient, DeliveryReport};
use crate::config::ProducerConfig;
use crate::kafka::delivery::DeliveryContext;
use crate::{Error, Result};
use async_trait::async_trait;
use rdkafka::producer::{BaseRecord, Producer, ThreadedProducer};
use rdkafka::ClientConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

type Inner = ThreadedProducer<DeliveryContext>;

pub struct KafkaBroker {
    producer: Option<Arc<Inner>>,
    close_timeout: Duration,
}

impl KafkaBroker {
    /// Builds the producer and returns it with the receiving end of its
    /// delivery report stream.
    pub fn connect(config: &ProducerConfig) -> Result<(Self, mpsc::Receiver<DeliveryReport>)> {
        let (tx, rx) = mpsc::channel(config.report_buffer.max(1));

        let producer: Inner = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("client.id", &config.client_id)
            .set("acks", &config.acks)
            .create_with_context(DeliveryContext::new(tx))
            .map_err(Error::Kafka)?;

        info!(
            brokers = %config.brokers,
            client_id = %config.client_id,
            acks = %config.acks,
            "Kafka producer created"
        );

        let broker = Self {
            producer: Some(Arc::new(producer)),
            close_timeout: config.flush_timeout(),
        };
        Ok((broker, rx))
    }

    fn producer(&self) -> Result<&Arc<Inner>> {
        self.producer.as_ref().ok_or(Error::Closed)
    }
}

#[async_trait]
impl BrokerClient for KafkaBroker {
    fn publish(&self, topic: &str, key: Option<&[u8]>, payload: &[u8]) -> Result<()> {
        let mut record: BaseRecord<'_, [u8], [u8]> = BaseRecord::to(topic).payload(payload);
        if let Some(key) = key {
            record = record.key(key);
        }

        self.producer()?
            .send(record)
            .map_err(|(e, _)| Error::Enqueue {
                topic: topic.to_string(),
                reason: e.to_string(),
            })
    }

    #[instrument(skip(self))]
    async fn flush(&self, timeout: Duration) -> Result<usize> {
        let producer = Arc::clone(self.producer()?);

        // librdkafka's flush blocks the calling thread
        let remaining = tokio::task::spawn_blocking(move || {
            if let Err(e) = producer.flush(timeout) {
                debug!("Flush returned early: {}", e);
            }
            producer.in_flight_count()
        })
        .await?;

        Ok(remaining.max(0) as usize)
    }

    async fn close(&mut self) -> Result<()> {
        let Some(producer) = self.producer.take() else {
            return Ok(());
        };
        let timeout = self.close_timeout;

        let remaining = tokio::task::spawn_blocking(move || {
            if let Err(e) = producer.flush(timeout) {
                debug!("Flush on close returned early: {}", e);
            }
            let remaining = producer.in_flight_count();
            // Last reference: dropping it stops the polling thread and the
            // delivery report sender with it.
            drop(producer);
            remaining
        })
        .await?;

        info!(remaining, "Kafka producer closed");
        Ok(())
    }
}
