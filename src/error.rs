//! Error types and result handling for payment-producer.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! Only construction errors are fatal to the process. Everything raised while
//! handling a single tick is logged by the producer loop and then dropped.
//!
//! # Example
//!
//! ```rust
//! use payment_producer::{Error, Result};
//!
//! fn enqueue() -> Result<()> {
//!     Err(Error::Enqueue {
//!         topic: "payments".to_string(),
//!         reason: "Local: Queue full".to_string(),
//!     })
//! }
//!
//! match enqueue() {
//!     Ok(()) => println!("Enqueued"),
//!     Err(Error::Enqueue { topic, reason }) => eprintln!("Skipping tick for {}: {}", topic, reason),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for payment-producer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration source could not be read or deserialized.
    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] config::ConfigError),

    /// Kafka client error, typically while constructing the producer.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// JSON serialization error when encoding an event.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The client refused to enqueue a message (e.g. local queue full).
    #[error("Failed to enqueue message for topic '{topic}': {reason}")]
    Enqueue {
        /// Topic the message was addressed to
        topic: String,
        /// Reason reported by the client
        reason: String,
    },

    /// The broker reported a delivery failure for an enqueued message.
    #[error("Delivery to '{topic}' [{partition}] failed: {reason}")]
    Delivery {
        /// Topic the message was addressed to
        topic: String,
        /// Partition chosen for the message, -1 if unassigned
        partition: i32,
        /// Reason reported by the broker
        reason: String,
    },

    /// Flush returned with messages still outstanding.
    #[error("Flush timed out with {remaining} message(s) outstanding")]
    FlushTimeout {
        /// Messages not yet acknowledged when the flush returned
        remaining: usize,
    },

    /// A blocking task panicked or was cancelled.
    #[error("Task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// The broker client was used after it was closed.
    #[error("Broker client is closed")]
    Closed,
}

/// A convenient Result type alias for payment-producer operations.
///
/// This is equivalent to `std::result::Result<T, payment_producer::Error>`.
pub type Result<T> = std::result::Result<T, Error>;
