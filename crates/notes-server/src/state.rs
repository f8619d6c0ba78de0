//! Application state shared across handlers.

use std::sync::Arc;

use notes_store::{NoteService, Store};

use crate::config::ServerConfig;
use crate::urls::RouteTable;

/// Application state shared across all handlers.
///
/// This is cloneable and can be extracted in handlers using `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Note operations over the database store.
    service: Arc<NoteService>,
    /// Server configuration.
    config: Arc<ServerConfig>,
    /// Named routes.
    urls: Arc<RouteTable>,
}

impl AppState {
    /// Create new application state with the default route table.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self::with_routes(store, config, RouteTable::default())
    }

    pub fn with_routes(store: Store, config: ServerConfig, urls: RouteTable) -> Self {
        let service = NoteService::new(store, config.notes_per_page);
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            urls: Arc::new(urls),
        }
    }

    /// Get a reference to the note service.
    pub fn notes(&self) -> &NoteService {
        &self.service
    }

    /// Get a reference to the database store.
    pub fn store(&self) -> &Store {
        self.service.store()
    }

    /// Get a reference to the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get a reference to the route table.
    pub fn urls(&self) -> &RouteTable {
        &self.urls
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("port", &self.config.port)
            .field("notes_per_page", &self.config.notes_per_page)
            .field("urls", &self.urls)
            .finish_non_exhaustive()
    }
}
