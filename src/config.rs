use crate::{Error, Result};
use config::Environment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment prefix for every producer setting, e.g. `KAFKA_BROKERS`.
pub const ENV_PREFIX: &str = "KAFKA";

/// Longest accepted publish interval (one day).
pub const MAX_INTERVAL_SECS: u64 = 86_400;

/// Longest accepted flush timeout (five minutes).
pub const MAX_FLUSH_TIMEOUT_MS: u64 = 300_000;

/// Acks settings that wait for every in-sync replica.
const ALL_REPLICA_ACKS: [&str; 2] = ["all", "-1"];

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProducerConfig {
    #[serde(default = "default_brokers")]
    pub brokers: String,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default = "default_client_id")]
    pub client_id: String,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
    #[serde(default = "default_report_buffer")]
    pub report_buffer: usize,
}

impl ProducerConfig {
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    pub fn load(source: Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(source.prefix_separator("_").try_parsing(true))
            .build()?;

        let config: ProducerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.brokers.split(',').all(|b| b.trim().is_empty()) {
            return Err(Error::Config("broker list is empty".to_string()));
        }
        if self.topic.trim().is_empty() {
            return Err(Error::Config("topic is empty".to_string()));
        }
        if !ALL_REPLICA_ACKS.contains(&self.acks.trim()) {
            return Err(Error::Config(format!(
                "acks must be 'all' (or '-1'), got '{}'",
                self.acks
            )));
        }
        if self.interval_secs == 0 || self.interval_secs > MAX_INTERVAL_SECS {
            return Err(Error::Config(format!(
                "publish interval must be between 1 and {} seconds, got {}",
                MAX_INTERVAL_SECS, self.interval_secs
            )));
        }
        if self.flush_timeout_ms > MAX_FLUSH_TIMEOUT_MS {
            return Err(Error::Config(format!(
                "flush timeout must be at most {} ms, got {}",
                MAX_FLUSH_TIMEOUT_MS, self.flush_timeout_ms
            )));
        }
        if self.report_buffer == 0 {
            return Err(Error::Config("delivery report buffer must be positive".to_string()));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            topic: default_topic(),
            client_id: default_client_id(),
            acks: default_acks(),
            interval_secs: default_interval_secs(),
            flush_timeout_ms: default_flush_timeout_ms(),
            report_buffer: default_report_buffer(),
        }
    }
}

fn default_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_topic() -> String {
    "payments".to_string()
}

fn default_client_id() -> String {
    "payment-producer".to_string()
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_interval_secs() -> u64 {
    30
}

fn default_flush_timeout_ms() -> u64 {
    15_000
}

fn default_report_buffer() -> usize {
    1024
}
