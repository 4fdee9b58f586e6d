use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gotour_booking::WorkflowError;
use gotour_catalog::CatalogError;
use gotour_core::ServiceError;
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UnprocessableError(String),
    UpstreamError(String),
    Anyhow(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::UpstreamError(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let msg = err.to_string();
        match err {
            WorkflowError::Ignored | WorkflowError::InvalidTransition { .. } => AppError::ConflictError(msg),
            WorkflowError::StepNotReached { .. } | WorkflowError::Form(_) => AppError::ValidationError(msg),
            WorkflowError::Catalog(catalog) => catalog.into(),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Service(service) => service.into(),
            other => AppError::UnprocessableError(other.to_string()),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let msg = err.to_string();
        match err {
            ServiceError::NotFound(_) => AppError::NotFoundError(msg),
            ServiceError::Rejected(_) | ServiceError::Unauthorized(_) => AppError::UnprocessableError(msg),
            ServiceError::Network(_) | ServiceError::Timeout(_) | ServiceError::Malformed(_) => {
                AppError::UpstreamError(msg)
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Anyhow(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Anyhow(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: impl Into<AppError>) -> StatusCode {
        err.into().into_response().status()
    }

    #[test]
    fn test_workflow_errors_map_to_status() {
        assert_eq!(status(WorkflowError::Ignored), StatusCode::CONFLICT);
        assert_eq!(
            status(WorkflowError::Catalog(CatalogError::MissingPrice("tour t1".into()))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(WorkflowError::Catalog(CatalogError::Service(ServiceError::NotFound("hotel h9".into())))),
            StatusCode::NOT_FOUND
        );
        assert_eq!(status(ServiceError::Timeout(10_000)), StatusCode::BAD_GATEWAY);
    }
}
