mod common;

use payment_producer::kafka::{DeliveryReportListener, KafkaBroker};
use payment_producer::{BrokerClient, PaymentEvent, ProducerLoop, Scheduler, ShutdownController};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use std::time::Duration;
use tokio::time::timeout;
use tracing::info;

#[tokio::test]
#[ignore] // Run with: cargo test --test integration_test -- --ignored
async fn test_end_to_end_publish() {
    tracing_subscriber::fmt()
        .with_env_filter("payment_producer=debug,rdkafka=info")
        .try_init()
        .ok();

    let config = common::get_test_config();
    let (broker, reports) = KafkaBroker::connect(&config).expect("Failed to create producer");
    let listener = DeliveryReportListener::spawn(reports);

    let (controller, signal) = ShutdownController::new();
    let mut producer = ProducerLoop::new(broker, config.topic.clone(), config.flush_timeout());
    let scheduler = Scheduler::new(config.interval());
    let producer_handle = tokio::spawn(async move {
        let result = producer.run(scheduler, signal).await;
        (producer, result)
    });

    // Three one-second ticks
    tokio::time::sleep(Duration::from_millis(3_500)).await;
    controller.trigger();

    let (producer, result) = producer_handle.await.unwrap();
    result.unwrap();
    let last_id = producer.ids().current();
    info!("Producer stopped after id {}", last_id);

    let stats = listener.await.unwrap();
    assert_eq!(stats.delivered, last_id);
    assert_eq!(stats.failed, 0);

    let consumer = create_test_consumer(&config.brokers, &config.topic).await;
    let mut received = Vec::new();

    let timeout_duration = Duration::from_secs(10);
    let start = tokio::time::Instant::now();

    while (received.len() as u64) < last_id && start.elapsed() < timeout_duration {
        if let Ok(Ok(message)) = timeout(Duration::from_secs(1), consumer.recv()).await {
            assert!(message.key().is_none());
            if let Some(payload) = message.payload() {
                let event: PaymentEvent = serde_json::from_slice(payload).unwrap();
                assert_eq!(payload, format!("{{\"id\":{}}}", event.id).as_bytes());
                received.push(event.id);
            }
        }
    }

    let expected: Vec<u64> = (1..=last_id).collect();
    received.sort_unstable();
    assert_eq!(received, expected);
}

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_delivery_reports_carry_offsets() {
    let config = common::get_test_config();
    let (mut broker, mut reports) = KafkaBroker::connect(&config).unwrap();

    broker.publish(&config.topic, None, b"{\"id\":1}").unwrap();
    assert_eq!(broker.flush(config.flush_timeout()).await.unwrap(), 0);

    let report = timeout(Duration::from_secs(5), reports.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(report.is_success());
    assert_eq!(report.topic, config.topic);
    assert!(report.offset >= 0);

    broker.close().await.unwrap();
    assert!(reports.recv().await.is_none());
}

async fn create_test_consumer(brokers: &str, topic: &str) -> StreamConsumer {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", format!("test_consumer_{}", std::process::id()))
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "false")
        .create()
        .expect("Failed to create consumer");

    consumer
        .subscribe(&[topic])
        .expect("Failed to subscribe to topic");

    consumer
}
