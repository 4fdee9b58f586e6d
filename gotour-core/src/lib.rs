pub mod booking;
pub mod identity;
pub mod payment;
pub mod repository;
pub mod resource;
pub mod supplier;

pub use booking::{
    BookingCreated, BookingDates, BookingPayload, BookingStatus, ContactDetails,
    HotelBookingPayload, PartySize, StayDates, TourBookingPayload,
};
pub use identity::{AuthProvider, AuthSession, BearerAuthProvider, StaticAuthProvider, UserProfile};
pub use payment::{PaymentMethod, PaymentRecord, PaymentRequest, PaymentService, PaymentStatus};
pub use repository::{BookingService, ResourceCatalog};
pub use resource::{Hotel, Resource, RoomType, Tour, TourDate};
pub use supplier::{AvailabilityQuery, AvailabilityResult, InventoryService};

/// Failure of a call to one of the remote collaborators (catalog, inventory,
/// booking, payment).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    /// The backend answered, but with `success: false`.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl ServiceError {
    /// Transport-level failures the user can simply retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::Network(_) | ServiceError::Timeout(_) | ServiceError::Malformed(_)
        )
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Run a collaborator call with an upper bound; running out of time is a
/// [`ServiceError::Timeout`].
pub async fn within<T, F>(timeout: std::time::Duration, call: F) -> ServiceResult<T>
where
    F: std::future::Future<Output = ServiceResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or_else(|_| Err(ServiceError::Timeout(timeout.as_millis() as u64)))
}
