use crate::{event::PaymentEvent, Result};

/// Encodes a [`PaymentEvent`] into the bytes published to the broker.
pub trait EventSerializer: Send + Sync {
    fn serialize(&self, event: &PaymentEvent) -> Result<Vec<u8>>;
}

/// Compact JSON, e.g. `{"id":5}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl EventSerializer for JsonSerializer {
    fn serialize(&self, event: &PaymentEvent) -> Result<Vec<u8>> {
        serde_json::to_vec(event).map_err(Into::into)
    }
}
