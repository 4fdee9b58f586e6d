pub mod form;
pub mod models;
pub mod orchestrator;
pub mod steps;
pub mod workflow;

pub use form::{BookingFormState, FormError};
pub use models::{
    Adjustment, BookingDraft, BookingReceipt, Field, FieldErrors, Step, ValidationReport,
};
pub use orchestrator::PaymentOrchestrator;
pub use steps::{StepIndicatorModel, StepStatus, StepView};
pub use workflow::{
    BookingWorkflow, ErrorReason, WorkflowConfig, WorkflowError, WorkflowServices,
    WorkflowSnapshot, WorkflowState,
};
