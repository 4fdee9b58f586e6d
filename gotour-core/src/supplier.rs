use async_trait::async_trait;
use gotour_shared::ResourceType;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::booking::{BookingDates, PartySize};
use crate::ServiceResult;

/// What the inventory service is asked before a booking is committed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub resource_type: ResourceType,
    pub resource_id: String,
    /// Room type id for hotels, tour date id for tours.
    pub sub_resource_id: String,
    pub dates: BookingDates,
    pub party_size: PartySize,
    /// Rooms for hotels, people for tours.
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResult {
    pub available: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl AvailabilityResult {
    pub fn available() -> Self {
        Self { available: true, message: None }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self { available: false, message: Some(message.into()) }
    }
}

/// Live inventory. Answers are never cached by callers: capacity can be
/// consumed by other bookings between two checks.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn check_availability(&self, query: &AvailabilityQuery) -> ServiceResult<AvailabilityResult>;
}

/// Scripted inventory: answers from a queue, then falls back to "available".
#[derive(Default)]
pub struct MockInventoryService {
    calls: AtomicUsize,
    script: Mutex<Vec<ServiceResult<AvailabilityResult>>>,
}

impl MockInventoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer; queued answers are served in insertion order.
    pub async fn respond_with(&self, answer: ServiceResult<AvailabilityResult>) {
        self.script.lock().await.insert(0, answer);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryService for MockInventoryService {
    async fn check_availability(&self, query: &AvailabilityQuery) -> ServiceResult<AvailabilityResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            "Mock availability check for {} {} / {}",
            query.resource_type,
            query.resource_id,
            query.sub_resource_id
        );

        match self.script.lock().await.pop() {
            Some(answer) => answer,
            None => Ok(AvailabilityResult::available()),
        }
    }
}
