pub mod delivery;
pub mod producer;
pub mod serializer;


pub use delivery::{DeliveryContext, DeliveryReportListener, DeliveryStats};
pub use producer::KafkaBroker;
pub use serializer::{EventSerializer, JsonSerializer};
