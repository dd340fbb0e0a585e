pub mod broker;
pub mod config;
pub mod error;
pub mod event;
pub mod producer_loop;
pub mod scheduler;
pub mod shutdown;

pub mod kafka;

pub use broker::{BrokerClient, DeliveryReport};
pub use config::ProducerConfig;
pub use error::{Error, Result};
pub use event::{IdGenerator, PaymentEvent};
pub use producer_loop::{LoopState, ProducerLoop, TickOutcome};
pub use scheduler::Scheduler;
pub use shutdown::{ShutdownController, ShutdownSignal};
