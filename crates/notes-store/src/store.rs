//! Main store implementation for database operations.
//!
//! The `Store` type provides the CRUD operations for notes and users.
//! It performs no access control; see [`crate::service::NoteService`].

use std::str::FromStr;

use chrono::Utc;
use notes_core::{DuplicateSlugError, NewNote, Note, NoteChanges, NoteId, UserId};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::error::{StoreError, StoreResult};
use crate::models::{NewUser, NoteRow, UserRow};
use crate::schema;

/// Configuration for connecting to the database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to maintain.
    pub min_connections: u32,
    /// Run migrations on connect.
    pub run_migrations: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://notes.db".to_string(),
            max_connections: 5,
            min_connections: 1,
            run_migrations: true,
        }
    }
}

impl StoreConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads:
    /// - `DATABASE_URL` - Required database connection string
    /// - `DATABASE_MAX_CONNECTIONS` - Optional, defaults to 5
    /// - `DATABASE_MIN_CONNECTIONS` - Optional, defaults to 1
    /// - `DATABASE_RUN_MIGRATIONS` - Optional, defaults to true
    pub fn from_env() -> StoreResult<Self> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| {
            StoreError::ConfigError("DATABASE_URL environment variable not set".to_string())
        })?;

        let max_connections = std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let min_connections = std::env::var("DATABASE_MIN_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(1);

        let run_migrations = std::env::var("DATABASE_RUN_MIGRATIONS")
            .ok()
            .map(|s| s.to_lowercase() != "false" && s != "0")
            .unwrap_or(true);

        Ok(Self {
            database_url,
            max_connections,
            min_connections,
            run_migrations,
        })
    }

    /// A private in-memory database.
    ///
    /// Every SQLite connection to `:memory:` opens a separate database, so the
    /// pool is pinned to a single connection that is never recycled.
    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            run_migrations: true,
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

/// Database store for notes and user accounts.
#[derive(Debug, Clone)]
pub struct Store {
    pool: SqlitePool,
}

/// The constraint message fragment SQLite reports for `notes.slug`.
const SLUG_CONSTRAINT: &str = "notes.slug";

/// The constraint message fragment SQLite reports for `users.username`.
const USERNAME_CONSTRAINT: &str = "users.username";

/// Whether `err` is a unique-constraint violation on `constraint`.
fn violates_unique(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(constraint),
        _ => false,
    }
}

impl Store {
    /// Connect to the database with the given configuration.
    ///
    /// Optionally runs migrations if `config.run_migrations` is true.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        tracing::info!("Connecting to database...");

        let options = SqliteConnectOptions::from_str(&config.database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections);
        if config.is_in_memory() {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        tracing::info!("Connected to database");

        if config.run_migrations {
            schema::run_migrations(&pool).await?;
        }

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ==================== User Operations ====================

    /// Insert a new user.
    pub async fn insert_user(&self, user: &NewUser) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, password_hash, is_active, created)
            VALUES (?, ?, ?, 1, ?)
            RETURNING id, username, password_hash, is_active, created
            "#,
        )
        .bind(user.id.0)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates_unique(&e, USERNAME_CONSTRAINT) {
                StoreError::UsernameTaken(user.username.clone())
            } else {
                StoreError::Database(e)
            }
        })
    }

    /// Get a user by ID.
    pub async fn get_user_by_id(&self, id: UserId) -> StoreResult<UserRow> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_active, created
            FROM users WHERE id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::UserNotFound(id))
    }

    /// Get a user by username.
    pub async fn get_user_by_username(&self, username: &str) -> StoreResult<Option<UserRow>> {
        Ok(sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, password_hash, is_active, created
            FROM users WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?)
    }

    /// Mark a user inactive; they can no longer log in.
    pub async fn deactivate_user(&self, id: UserId) -> StoreResult<()> {
        let result = sqlx::query("UPDATE users SET is_active = 0 WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::UserNotFound(id));
        }
        Ok(())
    }

    // ==================== Note Operations ====================

    /// Insert a new note.
    ///
    /// The `UNIQUE` constraint on `slug` is the final arbiter of uniqueness:
    /// of two concurrent inserts with the same slug exactly one succeeds, the
    /// other gets [`StoreError::DuplicateSlug`].
    pub async fn insert_note(&self, note: &NewNote) -> StoreResult<Note> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, NoteRow>(
            r#"
            INSERT INTO notes (id, title, text, slug, author_id, created, updated)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, text, slug, author_id, created, updated
            "#,
        )
        .bind(note.id.0)
        .bind(&note.title)
        .bind(&note.text)
        .bind(&note.slug)
        .bind(note.author.0)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if violates_unique(&e, SLUG_CONSTRAINT) {
                StoreError::DuplicateSlug(DuplicateSlugError::new(note.slug.clone()))
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(row.into())
    }

    /// Check whether any note uses `slug`.
    pub async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let result: (bool,) = sqlx::query_as(r#"SELECT EXISTS (SELECT 1 FROM notes WHERE slug = ?)"#)
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }

    /// Get a note by ID.
    pub async fn get_note(&self, id: NoteId) -> StoreResult<Note> {
        sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, text, slug, author_id, created, updated
            FROM notes WHERE id = ?
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .map(Note::from)
        .ok_or(StoreError::NoteIdNotFound(id))
    }

    /// Find a note by slug, whoever owns it.
    pub async fn find_note_by_slug(&self, slug: &str) -> StoreResult<Option<Note>> {
        Ok(sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, text, slug, author_id, created, updated
            FROM notes WHERE slug = ?
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .map(Note::from))
    }

    /// List an author's notes in insertion order.
    pub async fn list_notes_for_author(
        &self,
        author: UserId,
        limit: u32,
        offset: u64,
    ) -> StoreResult<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT id, title, text, slug, author_id, created, updated
            FROM notes
            WHERE author_id = ?
            ORDER BY rowid
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(author.0)
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    /// Count an author's notes.
    pub async fn count_notes_for_author(&self, author: UserId) -> StoreResult<u64> {
        let count: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM notes WHERE author_id = ?"#)
            .bind(author.0)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count.0).unwrap_or_default())
    }

    /// Count all notes.
    pub async fn count_notes(&self) -> StoreResult<u64> {
        let count: (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM notes"#)
            .fetch_one(&self.pool)
            .await?;

        Ok(u64::try_from(count.0).unwrap_or_default())
    }

    /// Replace a note's title and text. The slug is left untouched.
    pub async fn update_note(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<Note> {
        sqlx::query_as::<_, NoteRow>(
            r#"
            UPDATE notes SET title = ?, text = ?, updated = ?
            WHERE id = ?
            RETURNING id, title, text, slug, author_id, created, updated
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.text)
        .bind(Utc::now())
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?
        .map(Note::from)
        .ok_or(StoreError::NoteIdNotFound(id))
    }

    /// Delete a note.
    pub async fn delete_note(&self, id: NoteId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NoteIdNotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> Store {
        Store::connect(StoreConfig::in_memory()).await.unwrap()
    }

    async fn user(store: &Store, name: &str) -> UserId {
        store
            .insert_user(&NewUser::new(name, "!"))
            .await
            .unwrap()
            .user_id()
    }

    #[test]
    fn test_config_default() {
        let config = StoreConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.min_connections, 1);
        assert!(config.run_migrations);
        assert!(!config.is_in_memory());
        assert!(StoreConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_insert_and_get_note() {
        let store = store().await;
        let author = user(&store, "Автор").await;

        let new = NewNote::new("Заголовок", "Текст", "zagolovok", author);
        let inserted = store.insert_note(&new).await.unwrap();
        assert_eq!(inserted.id, new.id);
        assert_eq!(inserted.author, author);

        let by_id = store.get_note(new.id).await.unwrap();
        assert_eq!(by_id, inserted);
        let by_slug = store.find_note_by_slug("zagolovok").await.unwrap();
        assert_eq!(by_slug, Some(inserted));
        assert!(store.slug_exists("zagolovok").await.unwrap());
        assert!(!store.slug_exists("other").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slug_rejected_across_authors() {
        let store = store().await;
        let first = user(&store, "first").await;
        let second = user(&store, "second").await;

        store
            .insert_note(&NewNote::new("a", "a", "new_slug", first))
            .await
            .unwrap();
        let err = store
            .insert_note(&NewNote::new("b", "b", "new_slug", second))
            .await
            .unwrap_err();

        match err {
            StoreError::DuplicateSlug(e) => assert_eq!(e.slug, "new_slug"),
            other => panic!("expected DuplicateSlug, got {other:?}"),
        }
        assert_eq!(store.count_notes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let store = store().await;
        user(&store, "reader").await;
        let err = store
            .insert_user(&NewUser::new("reader", "!"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "reader"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_ordered_and_paged() {
        let store = store().await;
        let author = user(&store, "author").await;
        let other = user(&store, "other").await;

        for i in 0..5 {
            store
                .insert_note(&NewNote::new(format!("n{i}"), "t", format!("slug-{i}"), author))
                .await
                .unwrap();
        }
        store
            .insert_note(&NewNote::new("x", "t", "foreign", other))
            .await
            .unwrap();

        assert_eq!(store.count_notes_for_author(author).await.unwrap(), 5);

        let first = store.list_notes_for_author(author, 3, 0).await.unwrap();
        let slugs: Vec<_> = first.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, ["slug-0", "slug-1", "slug-2"]);

        let rest = store.list_notes_for_author(author, 3, 3).await.unwrap();
        let slugs: Vec<_> = rest.iter().map(|n| n.slug.as_str()).collect();
        assert_eq!(slugs, ["slug-3", "slug-4"]);

        let again = store.list_notes_for_author(author, 3, 0).await.unwrap();
        assert_eq!(first, again);
    }

    #[tokio::test]
    async fn test_update_keeps_slug() {
        let store = store().await;
        let author = user(&store, "author").await;
        let note = store
            .insert_note(&NewNote::new("old", "old text", "keep-me", author))
            .await
            .unwrap();

        let updated = store
            .update_note(
                note.id,
                &NoteChanges {
                    title: "new".into(),
                    text: "new text".into(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "keep-me");
        assert_eq!(updated.text, "new text");
        assert!(updated.updated >= note.updated);
    }

    #[tokio::test]
    async fn test_delete_note() {
        let store = store().await;
        let author = user(&store, "author").await;
        let note = store
            .insert_note(&NewNote::new("t", "t", "gone", author))
            .await
            .unwrap();

        store.delete_note(note.id).await.unwrap();
        assert!(matches!(
            store.get_note(note.id).await,
            Err(StoreError::NoteIdNotFound(_))
        ));
        assert!(matches!(
            store.delete_note(note.id).await,
            Err(StoreError::NoteIdNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_deactivate_user() {
        let store = store().await;
        let id = user(&store, "sleepy").await;
        store.deactivate_user(id).await.unwrap();
        assert!(!store.get_user_by_id(id).await.unwrap().is_active);
        assert!(matches!(
            store.deactivate_user(UserId::new()).await,
            Err(StoreError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_concurrent_inserts_same_slug_one_wins() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("notes.db").display());
        let store = Store::connect(StoreConfig {
            database_url: url,
            max_connections: 4,
            min_connections: 1,
            run_migrations: true,
        })
        .await
        .unwrap();
        let a = user(&store, "a").await;
        let b = user(&store, "b").await;

        let first = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_note(&NewNote::new("a", "a", "new_slug", a))
                    .await
            })
        };
        let second = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_note(&NewNote::new("b", "b", "new_slug", b))
                    .await
            })
        };

        let results = [first.await.unwrap(), second.await.unwrap()];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let duplicates = results
            .iter()
            .filter(|r| matches!(r, Err(StoreError::DuplicateSlug(_))))
            .count();
        assert_eq!(ok, 1);
        assert_eq!(duplicates, 1);
        assert_eq!(store.count_notes().await.unwrap(), 1);
    }
}
