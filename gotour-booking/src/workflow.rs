use chrono::NaiveDate;
use gotour_catalog::{
    load_resource, AvailabilityChecker, AvailabilityVerdict, CatalogError, PriceBreakdown,
    PricingCalculator, PricingConfig,
};
use gotour_core::{
    within, AuthProvider, BookingService, InventoryService, PaymentRecord, PaymentService,
    Resource, ResourceCatalog, ServiceError,
};
use gotour_shared::{BookingType, ResourceType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::form::{BookingFormState, FormError};
use crate::models::{Adjustment, BookingReceipt, Field, FieldErrors, Step};
use crate::orchestrator::PaymentOrchestrator;
use crate::steps::{StepIndicatorModel, StepView};

pub const AUTH_REQUIRED_MESSAGE: &str = "Please sign in to complete your booking.";

/// Why the workflow stopped at a step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorReason {
    Validation { errors: FieldErrors },
    Unavailable { message: String },
    Network { message: String },
    AuthRequired,
    Rejected { message: String },
}

impl ErrorReason {
    pub fn message(&self) -> String {
        match self {
            ErrorReason::Validation { errors } => errors
                .values()
                .next()
                .cloned()
                .unwrap_or_else(|| "Please check the highlighted fields.".to_string()),
            ErrorReason::Unavailable { message }
            | ErrorReason::Network { message }
            | ErrorReason::Rejected { message } => message.clone(),
            ErrorReason::AuthRequired => AUTH_REQUIRED_MESSAGE.to_string(),
        }
    }

    fn from_submission(error: &ServiceError) -> Self {
        match error {
            ServiceError::Rejected(message) => ErrorReason::Rejected { message: message.clone() },
            ServiceError::NotFound(what) => ErrorReason::Rejected {
                message: format!("{} is no longer offered", what),
            },
            ServiceError::Unauthorized(_) => ErrorReason::AuthRequired,
            ServiceError::Network(_) | ServiceError::Timeout(_) | ServiceError::Malformed(_) => {
                ErrorReason::Network {
                    message: "We could not reach the booking service. Your details are kept, please try again."
                        .to_string(),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WorkflowState {
    Editing { step: Step },
    /// Behaves like `Editing` at `step`.
    Errored { step: Step, reason: ErrorReason },
    Submitting,
    AwaitingPayment { booking: BookingReceipt },
    Confirmed {
        booking: BookingReceipt,
        payment: Option<PaymentRecord>,
        /// Set when the booking exists but its payment could not be created.
        notice: Option<String>,
    },
    Exited,
}

impl WorkflowState {
    /// Step the indicator shows for this state.
    pub fn step(&self) -> Step {
        match self {
            WorkflowState::Editing { step } | WorkflowState::Errored { step, .. } => *step,
            WorkflowState::Submitting => Step::LAST_EDITABLE,
            WorkflowState::AwaitingPayment { .. } | WorkflowState::Confirmed { .. } => Step::Confirmation,
            WorkflowState::Exited => Step::Details,
        }
    }

    /// Step the user may edit, if any.
    pub fn editable_step(&self) -> Option<Step> {
        match self {
            WorkflowState::Editing { step } | WorkflowState::Errored { step, .. } => Some(*step),
            _ => None,
        }
    }

    /// Nothing further can happen to the workflow.
    pub fn is_finished(&self) -> bool {
        matches!(self, WorkflowState::Confirmed { .. } | WorkflowState::Exited)
    }

    pub fn name(&self) -> &'static str {
        match self {
            WorkflowState::Editing { .. } => "editing",
            WorkflowState::Errored { .. } => "errored",
            WorkflowState::Submitting => "submitting",
            WorkflowState::AwaitingPayment { .. } => "awaiting_payment",
            WorkflowState::Confirmed { .. } => "confirmed",
            WorkflowState::Exited => "exited",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("A request for this booking is already in progress")]
    Ignored,

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: &'static str, action: &'static str },

    #[error("Field {field} belongs to {step}, which has not been reached")]
    StepNotReached { field: Field, step: Step },

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Remote collaborators a workflow talks to.
#[derive(Clone)]
pub struct WorkflowServices {
    pub inventory: Arc<dyn InventoryService>,
    pub bookings: Arc<dyn BookingService>,
    pub payments: Arc<dyn PaymentService>,
}

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Upper bound for each remote call
    pub request_timeout: Duration,
    pub pricing: PricingConfig,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            pricing: PricingConfig::default(),
        }
    }
}

/// Everything a client needs to render the current screen.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowSnapshot {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub resource_name: String,
    #[serde(flatten)]
    pub state: WorkflowState,
    pub current_step: Step,
    pub steps: Vec<StepView>,
    pub values: BTreeMap<Field, String>,
    pub errors: FieldErrors,
    pub nights: Option<u32>,
    pub price: PriceBreakdown,
}

struct Inner {
    state: WorkflowState,
    form: BookingFormState,
    /// A confirm or payment call is between its two lock sections.
    in_flight: bool,
}

/// One booking session: the form, its state machine and the collaborators
/// used to submit it.
///
/// The state lock is never held across a remote call. Remote work is
/// bracketed by `in_flight`; calls arriving meanwhile get
/// [`WorkflowError::Ignored`].
pub struct BookingWorkflow {
    inner: Mutex<Inner>,
    availability: AvailabilityChecker,
    bookings: Arc<dyn BookingService>,
    payments: PaymentOrchestrator,
    auth: Arc<dyn AuthProvider>,
    timeout: Duration,
}

impl BookingWorkflow {
    pub fn new(
        resource: Resource,
        services: WorkflowServices,
        auth: Arc<dyn AuthProvider>,
        config: WorkflowConfig,
        today: NaiveDate,
    ) -> Self {
        let form = BookingFormState::new(resource, PricingCalculator::new(config.pricing), today);

        Self {
            inner: Mutex::new(Inner {
                state: WorkflowState::Editing { step: Step::Details },
                form,
                in_flight: false,
            }),
            availability: AvailabilityChecker::new(services.inventory, config.request_timeout),
            bookings: services.bookings,
            payments: PaymentOrchestrator::new(services.payments, config.request_timeout),
            auth,
            timeout: config.request_timeout,
        }
    }

    /// Load the resource and start at the details step.
    pub async fn open(
        catalog: &dyn ResourceCatalog,
        resource_type: ResourceType,
        resource_id: &str,
        services: WorkflowServices,
        auth: Arc<dyn AuthProvider>,
        config: WorkflowConfig,
        today: NaiveDate,
    ) -> Result<Self, WorkflowError> {
        let loaded = within(config.request_timeout, async {
            Ok(load_resource(catalog, resource_type, resource_id).await)
        })
        .await
        .map_err(CatalogError::Service)?;

        let resource = loaded?;
        Ok(Self::new(resource, services, auth, config, today))
    }

    pub async fn state(&self) -> WorkflowState {
        self.inner.lock().await.state.clone()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        let inner = self.inner.lock().await;
        let resource = inner.form.resource();
        let step = inner.state.step();

        WorkflowSnapshot {
            resource_type: resource.resource_type(),
            resource_id: resource.id().to_string(),
            resource_name: resource.name().to_string(),
            state: inner.state.clone(),
            current_step: step,
            steps: StepIndicatorModel::for_step(step).steps(),
            values: inner.form.values().clone(),
            errors: inner.form.errors().clone(),
            nights: inner.form.nights(),
            price: inner.form.price(),
        }
    }

    /// Edit a field on the current or an earlier step.
    pub async fn set_field(&self, field: Field, value: String) -> Result<Vec<Adjustment>, WorkflowError> {
        let mut inner = self.inner.lock().await;
        let step = editable(&inner, "edit fields")?;

        if field.step() > step {
            return Err(WorkflowError::StepNotReached { field, step: field.step() });
        }

        Ok(inner.form.set_field(field, value)?)
    }

    pub async fn advance(&self) -> Result<WorkflowState, WorkflowError> {
        let session = self.auth.session().await;
        let mut inner = self.inner.lock().await;
        let step = editable(&inner, "advance")?;

        let next = match step.next() {
            Some(next) if step < Step::LAST_EDITABLE => next,
            _ => {
                return Err(WorkflowError::InvalidTransition {
                    from: "on the last step",
                    action: "advance",
                })
            }
        };

        let report = inner.form.validate_step(step);
        if !report.valid {
            tracing::debug!("Step {} has {} invalid fields", step, report.errors.len());
            inner.state = WorkflowState::Errored {
                step,
                reason: ErrorReason::Validation { errors: report.errors },
            };
            return Ok(inner.state.clone());
        }

        if next == Step::ContactInfo {
            if let Some(user) = session.user.as_ref().filter(|_| session.is_authenticated) {
                inner.form.prefill_contact(user);
            }
        }

        tracing::info!("Advanced {} -> {}", step, next);
        inner.state = WorkflowState::Editing { step: next };
        Ok(inner.state.clone())
    }

    pub async fn back(&self) -> Result<WorkflowState, WorkflowError> {
        let mut inner = self.inner.lock().await;
        let step = editable(&inner, "go back")?;

        inner.state = match step.previous() {
            Some(previous) => WorkflowState::Editing { step: previous },
            None => {
                tracing::info!("Booking workflow exited from {}", step);
                WorkflowState::Exited
            }
        };
        Ok(inner.state.clone())
    }

    /// Validate, check availability, then create the booking. At most one
    /// booking call runs per workflow at a time.
    pub async fn confirm(&self) -> Result<WorkflowState, WorkflowError> {
        let session = self.auth.session().await;

        let (draft, token) = {
            let mut inner = self.inner.lock().await;
            if inner.in_flight {
                return Err(WorkflowError::Ignored);
            }

            let step = editable(&inner, "confirm")?;
            if step != Step::LAST_EDITABLE {
                return Err(WorkflowError::InvalidTransition {
                    from: "before the payment step",
                    action: "confirm",
                });
            }

            let draft = match inner.form.to_draft() {
                Ok(draft) => draft,
                Err(report) => {
                    let failing = report.first_failing_step().unwrap_or(step);
                    tracing::info!("Confirmation blocked by invalid fields on {}", failing);
                    inner.state = WorkflowState::Errored {
                        step: failing,
                        reason: ErrorReason::Validation { errors: report.errors },
                    };
                    return Ok(inner.state.clone());
                }
            };

            let Some(token) = session.bearer().map(str::to_string) else {
                tracing::info!("Confirmation requires sign-in");
                inner.state = WorkflowState::Errored {
                    step,
                    reason: ErrorReason::AuthRequired,
                };
                return Ok(inner.state.clone());
            };

            inner.in_flight = true;
            inner.state = WorkflowState::Submitting;
            (draft, token)
        };

        let verdict = self.availability.check(&draft.availability_query()).await;
        let reason = match verdict {
            AvailabilityVerdict::Available => None,
            AvailabilityVerdict::Unavailable { message } => Some(ErrorReason::Unavailable { message }),
            AvailabilityVerdict::Unverified { message } => Some(ErrorReason::Network { message }),
        };
        if let Some(reason) = reason {
            return Ok(self.settle(WorkflowState::Errored { step: Step::Details, reason }).await);
        }

        let payload = draft.payload();
        let state = match within(self.timeout, self.bookings.create(&payload, &token)).await {
            Ok(created) => {
                tracing::info!(
                    "Booking {} created for {} {} ({} VND)",
                    created.id,
                    draft.resource_type,
                    draft.resource_id,
                    draft.price.total
                );
                WorkflowState::AwaitingPayment {
                    booking: BookingReceipt {
                        id: created.id,
                        booking_type: BookingType::from(draft.resource_type),
                        status: created.status,
                        total_price: created.total_price.unwrap_or(draft.price.total),
                        payment_method: draft.payment_method,
                    },
                }
            }
            Err(e) => {
                tracing::warn!("Booking submission for {} failed: {}", draft.resource_id, e);
                WorkflowState::Errored {
                    step: Step::LAST_EDITABLE,
                    reason: ErrorReason::from_submission(&e),
                }
            }
        };

        Ok(self.settle(state).await)
    }

    /// Request the payment for the created booking. A failure still lands on
    /// `Confirmed`, with a notice naming the existing booking.
    pub async fn create_payment(&self) -> Result<WorkflowState, WorkflowError> {
        let booking = {
            let mut inner = self.inner.lock().await;
            if inner.in_flight {
                return Err(WorkflowError::Ignored);
            }
            let WorkflowState::AwaitingPayment { booking } = &inner.state else {
                return Err(WorkflowError::InvalidTransition {
                    from: inner.state.name(),
                    action: "create a payment",
                });
            };
            let booking = booking.clone();
            inner.in_flight = true;
            booking
        };

        let state = match self.payments.initialize_payment(&booking).await {
            Ok(payment) => WorkflowState::Confirmed {
                booking,
                payment: Some(payment),
                notice: None,
            },
            Err(e) => {
                tracing::warn!("Booking {} confirmed without payment: {}", booking.id, e);
                let notice = format!(
                    "Your booking {} is confirmed, but we could not start the payment. You can pay later from your bookings.",
                    booking.id
                );
                WorkflowState::Confirmed {
                    booking,
                    payment: None,
                    notice: Some(notice),
                }
            }
        };

        Ok(self.settle(state).await)
    }

    /// Abandon the session. Editing sessions exit; a submission or pending
    /// payment cannot be abandoned.
    pub async fn discard(&self) -> Result<(), WorkflowError> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            WorkflowState::Submitting | WorkflowState::AwaitingPayment { .. } => {
                Err(WorkflowError::InvalidTransition {
                    from: inner.state.name(),
                    action: "discard the session",
                })
            }
            WorkflowState::Editing { .. } | WorkflowState::Errored { .. } => {
                tracing::info!("Booking workflow discarded while {}", inner.state.name());
                inner.state = WorkflowState::Exited;
                Ok(())
            }
            WorkflowState::Confirmed { .. } | WorkflowState::Exited => Ok(()),
        }
    }

    async fn settle(&self, state: WorkflowState) -> WorkflowState {
        let mut inner = self.inner.lock().await;
        inner.in_flight = false;
        tracing::info!("Booking workflow is now {}", state.name());
        inner.state = state;
        inner.state.clone()
    }
}

fn editable(inner: &Inner, action: &'static str) -> Result<Step, WorkflowError> {
    if inner.in_flight {
        return Err(WorkflowError::Ignored);
    }
    inner.state.editable_step().ok_or(WorkflowError::InvalidTransition {
        from: inner.state.name(),
        action,
    })
}
