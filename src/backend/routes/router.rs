/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. API routes (auth, users, projects, tickets, sprints, profiles)
 * 2. Fallback: JSON 404 under `/api`, otherwise static files when a
 *    `static_dir` is configured
 *
 * Every request is logged by `TraceLayer`.
 */

use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Router,
};
use tower::ServiceExt;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

pub const ROUTE_NOT_FOUND_MESSAGE: &str = "Route not found";

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_api_routes(Router::new(), &app_state);

    router
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Unmatched requests
async fn fallback(State(app_state): State<AppState>, request: Request) -> Response {
    let is_api = request.uri().path().starts_with("/api");

    let static_dir = app_state.config.server.static_dir.as_ref().filter(|_| !is_api);
    if let Some(dir) = static_dir {
        return match ServeDir::new(dir).oneshot(request).await {
            Ok(response) => response.into_response(),
            Err(never) => match never {},
        };
    }

    BackendError::not_found(ROUTE_NOT_FOUND_MESSAGE).into_response()
}
