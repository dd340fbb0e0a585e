use anyhow::Context;
use payment_producer::kafka::{DeliveryReportListener, KafkaBroker};
use payment_producer::{ProducerConfig, ProducerLoop, Scheduler, ShutdownController};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")));

    info!("Starting payment-producer");

    let config = ProducerConfig::from_env().context("failed to load configuration")?;

    info!(
        kafka_brokers = %config.brokers,
        kafka_topic = %config.topic,
        kafka_client_id = %config.client_id,
        kafka_acks = %config.acks,
        interval_secs = config.interval_secs,
        "Configuration summary"
    );

    let (broker, reports) = match KafkaBroker::connect(&config) {
        Ok(pair) => pair,
        Err(e) => {
            error!("Failed to create Kafka producer: {}", e);
            std::process::exit(1);
        }
    };

    let listener = DeliveryReportListener::spawn(reports);

    let (controller, shutdown) = ShutdownController::new();
    let signals = controller.listen_for_os_signals();

    let mut producer = ProducerLoop::new(broker, config.topic.clone(), config.flush_timeout());
    producer
        .run(Scheduler::new(config.interval()), shutdown)
        .await
        .context("producer loop failed to shut down cleanly")?;

    signals.abort();
    let stats = listener.await.context("delivery report listener panicked")?;

    info!(
        delivered = stats.delivered,
        failed = stats.failed,
        "payment-producer stopped"
    );
    Ok(())
}

fn init_logging(json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("payment_producer=info,warn"));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}
