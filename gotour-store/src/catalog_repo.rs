use async_trait::async_trait;
use gotour_core::{Hotel, ResourceCatalog, ServiceResult, Tour};

use crate::client::BackendClient;

/// Tours and hotels served by `/api/tours` and `/api/hotels`.
pub struct HttpResourceCatalog {
    client: BackendClient,
}

impl HttpResourceCatalog {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResourceCatalog for HttpResourceCatalog {
    async fn tour(&self, id: &str) -> ServiceResult<Tour> {
        self.client.get(&format!("/api/tours/{}", id)).await
    }

    async fn hotel(&self, id: &str) -> ServiceResult<Hotel> {
        self.client.get(&format!("/api/hotels/{}", id)).await
    }
}
