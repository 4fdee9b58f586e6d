use async_trait::async_trait;
use gotour_core::{BookingCreated, BookingPayload, BookingService, ServiceResult};

use crate::client::BackendClient;

/// Creates bookings on behalf of the signed-in user. Tours and hotels live
/// behind different endpoints.
pub struct HttpBookingService {
    client: BackendClient,
}

impl HttpBookingService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn path_for(payload: &BookingPayload) -> &'static str {
        match payload {
            BookingPayload::Tour(_) => "/api/bookings",
            BookingPayload::Hotel(_) => "/api/hotel-bookings",
        }
    }
}

#[async_trait]
impl BookingService for HttpBookingService {
    async fn create(&self, payload: &BookingPayload, token: &str) -> ServiceResult<BookingCreated> {
        let created: BookingCreated = self
            .client
            .post(Self::path_for(payload), payload, Some(token))
            .await?;

        tracing::info!(
            "Backend created {} booking {} for {}",
            payload.resource_type(),
            created.id,
            payload.resource_id()
        );
        Ok(created)
    }
}
