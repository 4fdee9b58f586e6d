use async_trait::async_trait;
use gotour_core::{PaymentRecord, PaymentRequest, PaymentService, PaymentStatus, ServiceResult};
use serde::Deserialize;

use crate::client::BackendClient;

#[derive(Deserialize)]
struct StatusData {
    status: PaymentStatus,
}

/// SePay payments created through the backend.
pub struct HttpPaymentService {
    client: BackendClient,
}

impl HttpPaymentService {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PaymentService for HttpPaymentService {
    async fn create_payment(&self, request: &PaymentRequest) -> ServiceResult<PaymentRecord> {
        self.client.post("/api/payments/sepay/create", request, None).await
    }

    async fn payment_status(&self, payment_id: &str) -> ServiceResult<PaymentStatus> {
        let data: StatusData = self
            .client
            .get(&format!("/api/payments/{}/status", payment_id))
            .await?;
        Ok(data.status)
    }
}
