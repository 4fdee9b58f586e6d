use gotour_core::{
    within, PaymentRecord, PaymentRequest, PaymentService, PaymentStatus, ServiceResult,
};
use std::sync::Arc;
use std::time::Duration;

use crate::models::BookingReceipt;

/// Payment calls for bookings that already exist. Never creates or touches
/// the booking itself.
pub struct PaymentOrchestrator {
    payments: Arc<dyn PaymentService>,
    timeout: Duration,
}

impl PaymentOrchestrator {
    pub fn new(payments: Arc<dyn PaymentService>, timeout: Duration) -> Self {
        Self { payments, timeout }
    }

    /// Initialize a payment for a freshly created booking
    pub async fn initialize_payment(&self, receipt: &BookingReceipt) -> ServiceResult<PaymentRecord> {
        self.pay(PaymentRequest {
            booking_id: receipt.id.clone(),
            booking_type: receipt.booking_type,
            amount: receipt.total_price,
            payment_method: receipt.payment_method,
        })
        .await
    }

    /// Manual "pay now" for a booking whose first payment attempt failed
    pub async fn pay(&self, request: PaymentRequest) -> ServiceResult<PaymentRecord> {
        match within(self.timeout, self.payments.create_payment(&request)).await {
            Ok(record) => {
                tracing::info!(
                    "Payment {} created for {} booking {} ({} VND)",
                    record.id,
                    request.booking_type,
                    request.booking_id,
                    request.amount
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!("Payment creation for booking {} failed: {}", request.booking_id, e);
                Err(e)
            }
        }
    }

    /// Poll the gateway status of a payment
    pub async fn refresh_status(&self, payment_id: &str) -> ServiceResult<PaymentStatus> {
        within(self.timeout, self.payments.payment_status(payment_id)).await
    }
}
