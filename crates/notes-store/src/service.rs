//! Note service: the CRUD operations behind the note pages.
//!
//! Each operation runs the access policy first and then talks to the
//! [`Store`]. Note-scoped operations look the note up by slug and answer
//! `NoteNotFound` both when it does not exist and when it belongs to someone
//! else.

use notes_core::access::{self, Actor, Operation};
use notes_core::{
    DuplicateSlugError, NewNote, Note, NoteChanges, NoteForm, Page, Paginator, SlugChoice, UserId,
};

use crate::error::{StoreError, StoreResult};
use crate::store::Store;

/// CRUD orchestration over notes, with ownership enforced.
#[derive(Debug, Clone)]
pub struct NoteService {
    store: Store,
    paginator: Paginator,
}

impl NoteService {
    /// Create a service listing `per_page` notes per page.
    pub fn new(store: Store, per_page: u32) -> Self {
        Self {
            store,
            paginator: Paginator::new(per_page),
        }
    }

    /// Get reference to the underlying store.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn paginator(&self) -> Paginator {
        self.paginator
    }

    /// The authenticated user behind `actor`, for operations that are not
    /// note-scoped.
    fn require_user(actor: &Actor, operation: Operation) -> StoreResult<UserId> {
        access::check(actor, operation, None)
            .into_result()
            .map_err(|_| StoreError::Unauthenticated)?;
        actor.user_id().ok_or(StoreError::Unauthenticated)
    }

    /// Fetch the note behind `slug` if `actor` may perform `operation` on it.
    async fn authorized_note(
        &self,
        actor: &Actor,
        operation: Operation,
        slug: &str,
    ) -> StoreResult<Note> {
        // Anonymous callers are turned away before anything is looked up.
        let note = if actor.is_authenticated() {
            self.store.find_note_by_slug(slug).await?
        } else {
            None
        };

        access::check(actor, operation, note.as_ref())
            .into_result()
            .map_err(|denial| {
                tracing::debug!(slug = %slug, ?operation, ?denial, "Note access denied");
                StoreError::from_denial(denial, slug)
            })?;

        note.ok_or_else(|| StoreError::NoteNotFound(slug.to_string()))
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// One page of the actor's own notes, oldest first.
    ///
    /// `page` is the raw `?page=` value.
    pub async fn list(&self, actor: &Actor, page: Option<&str>) -> StoreResult<Page<Note>> {
        let author = Self::require_user(actor, Operation::List)?;

        let count = self.store.count_notes_for_author(author).await?;
        let number = self.paginator.validate_number(page, count)?;
        let notes = self
            .store
            .list_notes_for_author(author, self.paginator.per_page(), self.paginator.offset(number))
            .await?;

        Ok(self.paginator.page(notes, number, count))
    }

    /// Create a note owned by the actor.
    ///
    /// A supplied slug is checked against existing notes first. A derived
    /// slug goes straight to the store, whose unique constraint still applies.
    pub async fn add(&self, actor: &Actor, form: NoteForm) -> StoreResult<Note> {
        let author = Self::require_user(actor, Operation::Add)?;

        let slug = SlugChoice::resolve(form.slug.as_deref(), &form.title);
        if slug.needs_uniqueness_check() && self.store.slug_exists(slug.as_str()).await? {
            tracing::warn!(slug = %slug.as_str(), "Slug already taken");
            return Err(DuplicateSlugError::new(slug.into_string()).into());
        }

        let new_note = NewNote::new(form.title, form.text, slug.into_string(), author);
        let note = self.store.insert_note(&new_note).await.inspect_err(|e| {
            if let StoreError::DuplicateSlug(dup) = e {
                tracing::warn!(slug = %dup.slug, "Slug taken at insert");
            }
        })?;

        tracing::info!(note_id = %note.id, slug = %note.slug, author = %author, "Note created");
        Ok(note)
    }

    /// A note the actor owns.
    pub async fn detail(&self, actor: &Actor, slug: &str) -> StoreResult<Note> {
        self.authorized_note(actor, Operation::Detail, slug).await
    }

    /// A note the actor may edit, for prefilling the edit form.
    pub async fn editable(&self, actor: &Actor, slug: &str) -> StoreResult<Note> {
        self.authorized_note(actor, Operation::Edit, slug).await
    }

    /// A note the actor may delete, for the confirmation page.
    pub async fn deletable(&self, actor: &Actor, slug: &str) -> StoreResult<Note> {
        self.authorized_note(actor, Operation::Delete, slug).await
    }

    /// Replace title and text of the actor's note. Any slug in the form is
    /// ignored.
    pub async fn edit(&self, actor: &Actor, slug: &str, form: NoteForm) -> StoreResult<Note> {
        let note = self.authorized_note(actor, Operation::Edit, slug).await?;

        let changes = NoteChanges {
            title: form.title,
            text: form.text,
        };
        let updated = self.store.update_note(note.id, &changes).await?;

        tracing::info!(note_id = %updated.id, slug = %updated.slug, "Note updated");
        Ok(updated)
    }

    /// Remove the actor's note.
    pub async fn delete(&self, actor: &Actor, slug: &str) -> StoreResult<()> {
        let note = self.authorized_note(actor, Operation::Delete, slug).await?;
        self.store.delete_note(note.id).await?;

        tracing::info!(note_id = %note.id, slug = %note.slug, "Note deleted");
        Ok(())
    }
}
