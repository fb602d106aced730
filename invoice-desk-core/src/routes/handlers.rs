use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    Form,
};
use tracing::error;
use uuid::Uuid;

use crate::actions::{self, ActionOutcome, SignInOutcome};
use crate::error::AppError;
use crate::models::{FormState, Invoice};
use crate::routes::AppState;
use crate::validation::form_from_pairs;

impl IntoResponse for ActionOutcome {
    fn into_response(self) -> Response {
        match self {
            ActionOutcome::Redirect { to } => Redirect::to(to).into_response(),
            ActionOutcome::Completed(state) => (StatusCode::OK, Json(state)).into_response(),
            ActionOutcome::Invalid(state) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response()
            }
            ActionOutcome::Failed(state) => {
                (StatusCode::INTERNAL_SERVER_ERROR, Json(state)).into_response()
            }
        }
    }
}

/// Health check endpoint.
///
/// Returns a simple JSON response indicating the server is running.
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "invoice-desk",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Database health check endpoint.
pub async fn db_health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    state.store.ping().await.map_err(|e| {
        error!("Database health check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "database": "connected"
    })))
}

/// `GET /dashboard/invoices`
pub async fn list_invoices(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>, AppError> {
    Ok(Json(state.queries.list_invoices().await?))
}

/// `GET /dashboard/invoices/:id`
pub async fn fetch_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Invoice>, AppError> {
    Ok(Json(state.queries.fetch_invoice(id).await?))
}

/// `POST /dashboard/invoices`
pub async fn create_invoice(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> ActionOutcome {
    state.invoices.create_invoice(&form_from_pairs(fields)).await
}

/// `POST /dashboard/invoices/:id/edit`
pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Form(fields): Form<HashMap<String, String>>,
) -> ActionOutcome {
    state.invoices.update_invoice(id, &form_from_pairs(fields)).await
}

/// `POST /dashboard/invoices/:id/delete`
pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<Uuid>) -> ActionOutcome {
    state.invoices.delete_invoice(id).await
}

/// `POST /login`
///
/// Sets the session cookie and redirects on success. Rejections are
/// rendered as a form message; anything else is a server error.
pub async fn authenticate(
    State(state): State<AppState>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let outcome = actions::authenticate(state.identity.as_ref(), &form_from_pairs(fields)).await?;

    let response = match outcome {
        SignInOutcome::SignedIn {
            session,
            redirect_to,
        } => {
            let cookie = state.sessions.cookie(&session.token);
            ([(header::SET_COOKIE, cookie)], Redirect::to(redirect_to)).into_response()
        }
        SignInOutcome::Rejected(message) => {
            (StatusCode::UNAUTHORIZED, Json(FormState::message(message))).into_response()
        }
    };

    Ok(response)
}
