//! notes-core: Core types and policies for the notes application
//!
//! This crate provides:
//! - The `Note` entity and its identifier types
//! - Slug policy: transliteration-aware slug derivation and validation
//! - Access policy: who may see or change which note
//! - Form schema: explicit field tables for the note and account forms
//! - Pagination arithmetic for the list view
//!
//! Nothing here touches storage or HTTP; `notes-store` and `notes-server`
//! compose these pieces.

pub mod access;
pub mod form;
pub mod pagination;
pub mod slug;
pub mod types;

pub use access::{AccessDecision, Actor, Denial, Operation};
pub use form::{
    CleanedData, FieldKind, FieldSpec, FormErrors, FormSchema, FormView, NoteForm, LOGIN_FORM,
    NOTE_FORM, SIGNUP_FORM,
};
pub use pagination::{Page, PageError, Paginator};
pub use slug::{slugify, DuplicateSlugError, SlugChoice, SLUG_MAX_LENGTH, WARNING};
pub use types::{NewNote, Note, NoteChanges, NoteId, UserId};
