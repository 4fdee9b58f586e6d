use gotour_core::{within, AvailabilityQuery, InventoryService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const UNAVAILABLE_MESSAGE: &str =
    "The selected option is no longer available. Please choose other dates or options.";
pub const UNVERIFIED_MESSAGE: &str = "We could not verify availability right now. Please try again.";

/// Outcome of an availability check, split by what the user should do next.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum AvailabilityVerdict {
    Available,
    /// Business answer: change the selection.
    Unavailable { message: String },
    /// Could not get an answer: retry.
    Unverified { message: String },
}

impl AvailabilityVerdict {
    pub fn is_available(&self) -> bool {
        matches!(self, AvailabilityVerdict::Available)
    }
}

/// Asks the inventory service, bounded by a timeout. Holds no state between
/// calls.
pub struct AvailabilityChecker {
    inventory: Arc<dyn InventoryService>,
    timeout: Duration,
}

impl AvailabilityChecker {
    pub fn new(inventory: Arc<dyn InventoryService>, timeout: Duration) -> Self {
        Self { inventory, timeout }
    }

    pub async fn check(&self, query: &AvailabilityQuery) -> AvailabilityVerdict {
        match within(self.timeout, self.inventory.check_availability(query)).await {
            Ok(result) if result.available => {
                tracing::debug!(
                    "{} {} / {} available for {} guests",
                    query.resource_type,
                    query.resource_id,
                    query.sub_resource_id,
                    query.party_size.total()
                );
                AvailabilityVerdict::Available
            }
            Ok(result) => {
                tracing::info!(
                    "{} {} / {} unavailable: {:?}",
                    query.resource_type,
                    query.resource_id,
                    query.sub_resource_id,
                    result.message
                );
                AvailabilityVerdict::Unavailable {
                    message: result
                        .message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| UNAVAILABLE_MESSAGE.to_string()),
                }
            }
            Err(error) => {
                tracing::warn!("Availability check for {} failed: {}", query.resource_id, error);
                AvailabilityVerdict::Unverified {
                    message: UNVERIFIED_MESSAGE.to_string(),
                }
            }
        }
    }
}
