use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use gotour_booking::{Adjustment, BookingWorkflow, Field, WorkflowSnapshot};
use gotour_core::{AuthProvider, BearerAuthProvider, UserProfile};
use gotour_shared::ResourceType;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    error::AppError,
    middleware::BearerToken,
    state::{self, AppState, Session},
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub resource_type: ResourceType,
    pub resource_id: String,
    /// Profile of the signed-in user, used to prefill contact details
    #[serde(default)]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Deserialize)]
pub struct SetFieldRequest {
    pub field: Field,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: Uuid,
    #[serde(flatten)]
    pub snapshot: WorkflowSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SetFieldResponse {
    pub adjustments: Vec<Adjustment>,
    #[serde(flatten)]
    pub session: SessionResponse,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/sessions", post(create_session))
        .route("/v1/sessions/{id}", get(get_session).delete(delete_session))
        .route("/v1/sessions/{id}/fields", put(set_field))
        .route("/v1/sessions/{id}/advance", post(advance))
        .route("/v1/sessions/{id}/back", post(back))
        .route("/v1/sessions/{id}/confirm", post(confirm))
        .route("/v1/sessions/{id}/payment", post(create_payment))
}

async fn create_session(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let auth = Arc::new(BearerAuthProvider::new());
    if let Some(token) = token {
        auth.sign_in(token, req.user).await;
    }

    let workflow = BookingWorkflow::open(
        state.catalog.as_ref(),
        req.resource_type,
        &req.resource_id,
        state.services.clone(),
        auth.clone() as Arc<dyn AuthProvider>,
        state.workflow.clone(),
        state::today(),
    )
    .await?;

    let session_id = Uuid::new_v4();
    let session = Arc::new(Session { workflow: Arc::new(workflow), auth });
    state.sessions.write().await.insert(session_id, session.clone());

    tracing::info!("Session {} opened for {} {}", session_id, req.resource_type, req.resource_id);
    Ok((StatusCode::CREATED, Json(respond(session_id, &session).await)))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, &id).await?;
    Ok(Json(respond(id, &session).await))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    // Held across the check so no request can pick the session up meanwhile
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get(&id)
        .cloned()
        .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))?;

    session.workflow.discard().await?;
    sessions.remove(&id);
    tracing::info!("Session {} discarded", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn set_field(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    token: BearerToken,
    Json(req): Json<SetFieldRequest>,
) -> Result<Json<SetFieldResponse>, AppError> {
    let session = authorized(&state, &id, token).await?;
    let adjustments = session.workflow.set_field(req.field, req.value).await?;

    Ok(Json(SetFieldResponse {
        adjustments,
        session: respond(id, &session).await,
    }))
}

async fn advance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    token: BearerToken,
) -> Result<Json<SessionResponse>, AppError> {
    let session = authorized(&state, &id, token).await?;
    session.workflow.advance().await?;
    Ok(Json(respond(id, &session).await))
}

async fn back(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, &id).await?;
    session.workflow.back().await?;
    Ok(Json(finish(&state, id, &session).await))
}

async fn confirm(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    token: BearerToken,
) -> Result<Json<SessionResponse>, AppError> {
    let session = authorized(&state, &id, token).await?;

    // Detached so a dropped connection cannot cut a submission in half
    let workflow = session.workflow.clone();
    tokio::spawn(async move { workflow.confirm().await }).await??;

    Ok(Json(respond(id, &session).await))
}

async fn create_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>, AppError> {
    let session = find(&state, &id).await?;

    let workflow = session.workflow.clone();
    tokio::spawn(async move { workflow.create_payment().await }).await??;

    Ok(Json(finish(&state, id, &session).await))
}

async fn find(state: &AppState, id: &Uuid) -> Result<Arc<Session>, AppError> {
    state
        .session(id)
        .await
        .ok_or_else(|| AppError::NotFoundError(format!("Session {} not found", id)))
}

/// Look up the session and forward a freshly presented bearer token.
async fn authorized(state: &AppState, id: &Uuid, token: BearerToken) -> Result<Arc<Session>, AppError> {
    let session = find(state, id).await?;
    if let BearerToken(Some(token)) = token {
        let user = session.auth.session().await.user;
        session.auth.sign_in(token, user).await;
    }
    Ok(session)
}

/// Build the response, then drop the session once its workflow is over.
async fn finish(state: &AppState, session_id: Uuid, session: &Session) -> SessionResponse {
    let response = respond(session_id, session).await;
    if response.snapshot.state.is_finished() {
        state.sessions.write().await.remove(&session_id);
        tracing::info!("Session {} closed as {}", session_id, response.snapshot.state.name());
    }
    response
}

async fn respond(session_id: Uuid, session: &Session) -> SessionResponse {
    SessionResponse {
        session_id,
        snapshot: session.workflow.snapshot().await,
    }
}
