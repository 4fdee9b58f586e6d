use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use gotour_core::{PaymentMethod, PaymentRecord, PaymentRequest, PaymentStatus};
use gotour_shared::{BookingType, Money};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct RetryPaymentRequest {
    pub booking_type: BookingType,
    pub amount: Money,
    #[serde(default = "default_method")]
    pub payment_method: PaymentMethod,
}

fn default_method() -> PaymentMethod {
    PaymentMethod::Sepay
}

#[derive(Debug, Serialize)]
pub struct PaymentStatusResponse {
    pub payment_id: String,
    pub status: PaymentStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings/{booking_id}/payments", post(retry_payment))
        .route("/v1/payments/{payment_id}/status", get(payment_status))
}

/// "Pay now" for a booking that was confirmed without a payment. Only a new
/// payment is created; the booking is never re-submitted.
async fn retry_payment(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    Json(req): Json<RetryPaymentRequest>,
) -> Result<(StatusCode, Json<PaymentRecord>), AppError> {
    if req.amount == 0 {
        return Err(AppError::ValidationError("amount must be positive".to_string()));
    }

    let record = state
        .payments
        .pay(PaymentRequest {
            booking_id,
            booking_type: req.booking_type,
            amount: req.amount,
            payment_method: req.payment_method,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}

async fn payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Result<Json<PaymentStatusResponse>, AppError> {
    let status = state.payments.refresh_status(&payment_id).await?;
    Ok(Json(PaymentStatusResponse { payment_id, status }))
}
