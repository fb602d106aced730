pub mod handlers;


use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::actions::{InvoiceActions, InvoiceQueries};
use crate::auth::{require_session, IdentityProvider, SessionKeys};
use crate::store::InvoiceStore;

/// Application state containing shared resources.
///
/// Holds the store, the action executor and the identity provider that
/// route handlers need.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn InvoiceStore>,
    pub invoices: Arc<InvoiceActions>,
    pub queries: InvoiceQueries,
    pub identity: Arc<dyn IdentityProvider>,
    pub sessions: SessionKeys,
}

/// Creates the main application router.
///
/// Dashboard routes require a session; health checks and sign-in are
/// public.
pub fn create_router(state: AppState) -> Router {
    let dashboard = Router::new()
        .route(
            "/dashboard/invoices",
            get(handlers::list_invoices).post(handlers::create_invoice),
        )
        .route("/dashboard/invoices/:id", get(handlers::fetch_invoice))
        .route("/dashboard/invoices/:id/edit", post(handlers::update_invoice))
        .route("/dashboard/invoices/:id/delete", post(handlers::delete_invoice))
        .route_layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            require_session,
        ));

    Router::new()
        // Public routes
        .route("/health", get(handlers::health_check))
        .route("/health/db", get(handlers::db_health_check))
        .route("/login", post(handlers::authenticate))
        .merge(dashboard)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
