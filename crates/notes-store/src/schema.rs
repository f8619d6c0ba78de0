//! Schema definitions and migration utilities.
//!
//! The SQL lives in `migrations/` at the workspace root and is embedded at
//! compile time. Every statement is `IF NOT EXISTS`, so running the
//! migrations again is a no-op.

use sqlx::SqlitePool;

use crate::error::{StoreError, StoreResult};

/// Embedded migration SQL for user accounts (001_users.sql).
pub const USERS_MIGRATION: &str = include_str!("../../../migrations/001_users.sql");

/// Embedded migration SQL for notes (002_notes.sql).
pub const NOTES_MIGRATION: &str = include_str!("../../../migrations/002_notes.sql");

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_users.sql", USERS_MIGRATION),
    ("002_notes.sql", NOTES_MIGRATION),
];

/// Run all migrations against the database.
///
/// # Errors
///
/// Returns an error if any migration fails to execute.
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    tracing::info!("Running database migrations...");

    for (name, sql) in MIGRATIONS {
        tracing::debug!("Running migration ({})...", name);
        sqlx::raw_sql(sql)
            .execute(pool)
            .await
            .map_err(|e| StoreError::MigrationError(format!("{} failed: {}", name, e)))?;
    }

    tracing::info!("Migrations completed successfully");
    Ok(())
}

/// Check if the schema has been initialized.
///
/// Returns true if the `notes` table exists.
pub async fn is_schema_initialized(pool: &SqlitePool) -> StoreResult<bool> {
    let result: (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM sqlite_master
            WHERE type = 'table' AND name = 'notes'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(result.0)
}
