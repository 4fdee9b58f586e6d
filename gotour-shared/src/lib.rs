pub mod pii;
pub mod types;

pub use pii::Masked;
pub use types::{BookingType, Money, ResourceType};
