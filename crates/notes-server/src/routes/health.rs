//! Health check endpoint.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;
use crate::urls::{RouteName, RouteTable};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Whether the notes table exists.
    pub schema: bool,
}

/// GET /health - Health check endpoint.
async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let schema = notes_store::schema::is_schema_initialized(state.store().pool()).await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        schema,
    }))
}

/// Build health check routes.
pub fn routes(urls: &RouteTable) -> Router<AppState> {
    Router::new().route(urls.pattern(RouteName::Health), get(health_check))
}
