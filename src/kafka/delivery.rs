use crate::broker::DeliveryReport;
use crate::Error;
use rdkafka::client::ClientContext;
use rdkafka::message::Message;
use rdkafka::producer::{DeliveryResult, ProducerContext};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Producer context that forwards librdkafka delivery callbacks onto a
/// bounded channel.
///
/// The callback runs on librdkafka's polling thread, so it never blocks: if
/// the channel is full the report is logged and dropped.
pub struct DeliveryContext {
    reports: mpsc::Sender<DeliveryReport>,
}

impl DeliveryContext {
    pub fn new(reports: mpsc::Sender<DeliveryReport>) -> Self {
        Self { reports }
    }
}

impl ClientContext for DeliveryContext {}

impl ProducerContext for DeliveryContext {
    type DeliveryOpaque = ();

    fn delivery(&self, delivery_result: &DeliveryResult<'_>, _opaque: Self::DeliveryOpaque) {
        let report = to_report(delivery_result);

        match self.reports.try_send(report) {
            Ok(()) => {}
            Err(TrySendError::Full(report)) => {
                warn!(
                    topic = %report.topic,
                    partition = report.partition,
                    offset = report.offset,
                    "Delivery report channel full, dropping report"
                );
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Delivery report listener gone, dropping report");
            }
        }
    }
}

fn to_report(result: &DeliveryResult<'_>) -> DeliveryReport {
    match result {
        Ok(message) => {
            DeliveryReport::delivered(message.topic(), message.partition(), message.offset())
        }
        Err((e, message)) => {
            DeliveryReport::failed(message.topic(), message.partition(), e.to_string())
        }
    }
}

/// Totals observed by a [`DeliveryReportListener`] over its lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    pub delivered: u64,
    pub failed: u64,
}

impl DeliveryStats {
    pub fn total(&self) -> u64 {
        self.delivered + self.failed
    }
}

/// Drains delivery reports until the stream closes.
///
/// Failed deliveries are logged and not retried; the message is lost.
pub struct DeliveryReportListener {
    reports: mpsc::Receiver<DeliveryReport>,
    stats: DeliveryStats,
}

impl DeliveryReportListener {
    pub fn new(reports: mpsc::Receiver<DeliveryReport>) -> Self {
        Self {
            reports,
            stats: DeliveryStats::default(),
        }
    }

    pub fn spawn(reports: mpsc::Receiver<DeliveryReport>) -> JoinHandle<DeliveryStats> {
        tokio::spawn(Self::new(reports).run())
    }

    pub async fn run(mut self) -> DeliveryStats {
        debug!("Delivery report listener started");

        while let Some(report) = self.reports.recv().await {
            self.handle(&report);
        }

        info!(
            delivered = self.stats.delivered,
            failed = self.stats.failed,
            "Delivery report stream closed"
        );
        self.stats
    }

    fn handle(&mut self, report: &DeliveryReport) {
        match &report.error {
            None => {
                self.stats.delivered += 1;
                info!(
                    topic = %report.topic,
                    partition = report.partition,
                    offset = report.offset,
                    "Delivered message"
                );
            }
            Some(reason) => {
                self.stats.failed += 1;
                let err = Error::Delivery {
                    topic: report.topic.clone(),
                    partition: report.partition,
                    reason: reason.clone(),
                };
                error!("{}, message lost", err);
            }
        }
    }
}
