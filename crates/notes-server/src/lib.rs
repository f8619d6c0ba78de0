//! notes-server: HTTP server for the notes application
//!
//! This crate provides:
//! - Note pages (list, add, edit, delete, detail) guarded by ownership
//! - Cookie session authentication with login, logout and signup
//! - A named route table used for routing and redirects
//! - JSON render envelopes for pages and JSON error bodies
//!
//! # Architecture
//!
//! The server is built on Axum with a middleware stack for:
//! - Request tracing and logging
//! - Request ID generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_server::{app, AppState, ServerConfig};
//! use notes_store::{Store, StoreConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let router = app(AppState::new(store, config));
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod render;
pub mod routes;
pub mod state;
pub mod urls;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::request_id::{propagate_request_id, request_id_layer};

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
pub use urls::{RouteName, RouteTable};

// Re-export dependent crates
pub use notes_core;
pub use notes_store;

/// The full application: routes plus the request middleware stack.
pub fn app(state: AppState) -> Router {
    routes::build_router(state)
        .layer(axum::middleware::from_fn(propagate_request_id))
        .layer(request_id_layer())
        .layer(TraceLayer::new_for_http())
}
