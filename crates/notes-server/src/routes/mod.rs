//! Route definitions.
//!
//! Paths come from the [`RouteTable`](crate::urls::RouteTable) held in the
//! state, so the router and every redirect agree on them.

pub mod health;
pub mod notes;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the complete router with all routes.
pub fn build_router(state: AppState) -> Router {
    let urls = state.urls().clone();
    Router::new()
        .merge(health::routes(&urls))
        .merge(notes::routes(&urls))
        .merge(users::routes(&urls))
        .with_state(state)
}
