use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::booking::{BookingCreated, BookingPayload, BookingStatus};
use crate::resource::{Hotel, Tour};
use crate::{ServiceError, ServiceResult};

/// Read-only tours/hotels API
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    async fn tour(&self, id: &str) -> ServiceResult<Tour>;

    async fn hotel(&self, id: &str) -> ServiceResult<Hotel>;
}

/// Booking creation on the backend
#[async_trait]
pub trait BookingService: Send + Sync {
    /// Create a booking record on behalf of the token's owner.
    /// `Err(ServiceError::Rejected)` carries the backend's message when it
    /// answered `success: false`.
    async fn create(&self, payload: &BookingPayload, token: &str) -> ServiceResult<BookingCreated>;
}

/// Catalog held in memory, seeded up front.
#[derive(Default)]
pub struct InMemoryCatalog {
    tours: HashMap<String, Tour>,
    hotels: HashMap<String, Hotel>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tour(mut self, tour: Tour) -> Self {
        self.tours.insert(tour.id.clone(), tour);
        self
    }

    pub fn with_hotel(mut self, hotel: Hotel) -> Self {
        self.hotels.insert(hotel.id.clone(), hotel);
        self
    }
}

#[async_trait]
impl ResourceCatalog for InMemoryCatalog {
    async fn tour(&self, id: &str) -> ServiceResult<Tour> {
        self.tours
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("tour {}", id)))
    }

    async fn hotel(&self, id: &str) -> ServiceResult<Hotel> {
        self.hotels
            .get(id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("hotel {}", id)))
    }
}

/// Booking service that keeps what it was sent. Supports an artificial delay
/// so tests can overlap two submissions.
#[derive(Default)]
pub struct MockBookingService {
    calls: AtomicUsize,
    delay_ms: AtomicU64,
    failures: Mutex<Vec<ServiceError>>,
    created: Mutex<Vec<(String, BookingPayload)>>,
}

impl MockBookingService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    pub async fn fail_next(&self, error: ServiceError) {
        self.failures.lock().await.push(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Bookings that were actually created, with their ids.
    pub async fn created(&self) -> Vec<(String, BookingPayload)> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl BookingService for MockBookingService {
    async fn create(&self, payload: &BookingPayload, token: &str) -> ServiceResult<BookingCreated> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        if token.is_empty() {
            return Err(ServiceError::Unauthorized("missing token".to_string()));
        }

        if let Some(error) = self.failures.lock().await.pop() {
            return Err(error);
        }

        let id = format!("bk_{}", Uuid::new_v4().simple());
        self.created.lock().await.push((id.clone(), payload.clone()));

        Ok(BookingCreated {
            id,
            status: BookingStatus::Pending,
            total_price: Some(payload.total_price()),
        })
    }
}
