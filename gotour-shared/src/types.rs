use serde::{Deserialize, Serialize};
use std::fmt;

/// Whole Vietnamese dong. The backend never uses minor units.
pub type Money = u64;

/// Kinds of resource the booking workflow can reserve.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Tour,
    Hotel,
}

/// Discriminator the payment service uses to find the booking a payment
/// belongs to. Flight bookings are created elsewhere but share the same
/// payment endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Tour,
    Hotel,
    Flight,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Tour => "tour",
            BookingType::Hotel => "hotel",
            BookingType::Flight => "flight",
        }
    }
}

impl fmt::Display for BookingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ResourceType> for BookingType {
    fn from(value: ResourceType) -> Self {
        match value {
            ResourceType::Tour => BookingType::Tour,
            ResourceType::Hotel => BookingType::Hotel,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Tour => f.write_str("tour"),
            ResourceType::Hotel => f.write_str("hotel"),
        }
    }
}
