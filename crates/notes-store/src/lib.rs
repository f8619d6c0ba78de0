//! notes-store: Storage layer for the notes application
//!
//! This crate provides:
//! - SQLite storage for notes and user accounts
//! - Migration management
//! - Type-safe database operations via sqlx
//! - `NoteService`, which applies the access and slug policies from
//!   `notes-core` on top of the store
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{NoteService, Store, StoreConfig};
//! use notes_core::{Actor, NoteForm};
//!
//! let store = Store::connect(StoreConfig::from_env()?).await?;
//! let service = NoteService::new(store, 10);
//!
//! let note = service.add(&Actor::User(user_id), form).await?;
//! let page = service.list(&Actor::User(user_id), None).await?;
//! ```

pub mod error;
pub mod models;
pub mod schema;
pub mod service;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use models::*;
pub use service::NoteService;
pub use store::{Store, StoreConfig};

// Re-export notes-core for downstream crates
pub use notes_core;
