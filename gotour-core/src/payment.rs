use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use gotour_shared::{BookingType, Money};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{ServiceError, ServiceResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Sepay,
    BankTransfer,
    Cash,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Sepay => "sepay",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sepay" => Ok(PaymentMethod::Sepay),
            "bank_transfer" | "bank-transfer" => Ok(PaymentMethod::BankTransfer),
            "cash" => Ok(PaymentMethod::Cash),
            other => Err(format!("unsupported payment method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub booking_id: String,
    pub booking_type: BookingType,
    pub amount: Money,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub booking_id: String,
    pub booking_type: BookingType,
    pub amount: Money,
    pub status: PaymentStatus,
    #[serde(default)]
    pub checkout_url: Option<String>,
    #[serde(default)]
    pub qr_code_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Payment gateway collaborator (SePay behind the backend).
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Create a payment for a booking that already exists server-side
    async fn create_payment(&self, request: &PaymentRequest) -> ServiceResult<PaymentRecord>;

    /// Poll the gateway status of a payment
    async fn payment_status(&self, payment_id: &str) -> ServiceResult<PaymentStatus>;
}

/// In-process payment service used by tests and the `mock` backend.
#[derive(Default)]
pub struct MockPaymentService {
    calls: AtomicUsize,
    failures: Mutex<Vec<ServiceError>>,
    created: Mutex<Vec<PaymentRecord>>,
}

impl MockPaymentService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an error returned by the next `create_payment` call.
    pub async fn fail_next(&self, error: ServiceError) {
        self.failures.lock().await.push(error);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn created(&self) -> Vec<PaymentRecord> {
        self.created.lock().await.clone()
    }
}

#[async_trait]
impl PaymentService for MockPaymentService {
    async fn create_payment(&self, request: &PaymentRequest) -> ServiceResult<PaymentRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(error) = self.failures.lock().await.pop() {
            return Err(error);
        }

        let id = format!("pay_{}", Uuid::new_v4().simple());
        let record = PaymentRecord {
            checkout_url: Some(format!("https://pay.example.test/checkout/{}", id)),
            qr_code_url: None,
            id,
            booking_id: request.booking_id.clone(),
            booking_type: request.booking_type,
            amount: request.amount,
            status: PaymentStatus::Pending,
            expires_at: Some(Utc::now() + Duration::minutes(15)),
        };

        self.created.lock().await.push(record.clone());
        Ok(record)
    }

    async fn payment_status(&self, payment_id: &str) -> ServiceResult<PaymentStatus> {
        self.created
            .lock()
            .await
            .iter()
            .find(|p| p.id == payment_id)
            .map(|p| p.status)
            .ok_or_else(|| ServiceError::NotFound(payment_id.to_string()))
    }
}
