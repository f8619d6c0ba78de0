//! Note pages: home, list, add, success, detail, edit, delete.
//!
//! Everything but the home page requires a session; anonymous requests are
//! redirected to the login page by the [`CurrentUser`] extractor before any
//! note is looked up. Notes of other users answer 404.

use std::collections::BTreeMap;

use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};

use notes_core::{FormErrors, FormView, NOTE_FORM, Note, NoteForm, Page};
use notes_store::StoreError;

use crate::auth::{CurrentUser, MaybeUser};
use crate::error::ApiResult;
use crate::render::{
    DELETE_TEMPLATE, DETAIL_TEMPLATE, FORM_TEMPLATE, HOME_TEMPLATE, LIST_TEMPLATE, Render,
    SUCCESS_TEMPLATE, found,
};
use crate::state::AppState;
use crate::urls::{RouteName, RouteTable};

// ============================================================================
// Page contexts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HomeContext {
    pub user: Option<CurrentUser>,
}

/// Context of the list page: the page's notes under `object_list` plus the
/// page counters.
#[derive(Debug, Serialize)]
pub struct ListContext {
    #[serde(flatten)]
    pub page: Page<Note>,
    pub is_paginated: bool,
}

/// Context of the add and edit pages.
#[derive(Debug, Serialize)]
pub struct FormContext {
    pub form: FormView,
    /// The note being edited; absent on the add page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
}

#[derive(Debug, Serialize)]
pub struct NoteContext {
    pub note: Note,
}

#[derive(Debug, Serialize)]
pub struct EmptyContext {}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
}

fn form_page(
    data: &BTreeMap<String, String>,
    errors: FormErrors,
    note: Option<Note>,
) -> Render<FormContext> {
    Render::new(
        FORM_TEMPLATE,
        FormContext {
            form: NOTE_FORM.bind(data, errors),
            note,
        },
    )
}

fn success(state: &AppState) -> Response {
    found(state.urls().reverse(RouteName::Success, &[]))
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET / - public landing page.
async fn home(MaybeUser(user): MaybeUser) -> Render<HomeContext> {
    Render::new(HOME_TEMPLATE, HomeContext { user })
}

/// GET /notes/?page=N - the user's own notes, in creation order.
async fn list(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<ListQuery>,
) -> ApiResult<Render<ListContext>> {
    let page = state
        .notes()
        .list(&user.actor(), query.page.as_deref())
        .await?;

    Ok(Render::new(
        LIST_TEMPLATE,
        ListContext {
            is_paginated: page.is_paginated(),
            page,
        },
    ))
}

/// GET /add/ - empty note form.
async fn add_page(_user: CurrentUser) -> Render<FormContext> {
    Render::new(
        FORM_TEMPLATE,
        FormContext {
            form: NOTE_FORM.blank(),
            note: None,
        },
    )
}

/// POST /add/ - create a note, or re-render the form with errors.
async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Form(data): Form<BTreeMap<String, String>>,
) -> ApiResult<Response> {
    let form = match NoteForm::from_data(&data) {
        Ok(form) => form,
        Err(errors) => {
            tracing::debug!(?errors, "Note form rejected");
            return Ok(form_page(&data, errors, None).into_response());
        }
    };

    match state.notes().add(&user.actor(), form).await {
        Ok(_) => Ok(success(&state)),
        Err(StoreError::DuplicateSlug(e)) => {
            let errors = FormErrors::single("slug", e.to_string());
            Ok(form_page(&data, errors, None).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /done/ - shown after a successful change.
async fn done(_user: CurrentUser) -> Render<EmptyContext> {
    Render::new(SUCCESS_TEMPLATE, EmptyContext {})
}

/// GET /note/{slug}/
async fn detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Render<NoteContext>> {
    let note = state.notes().detail(&user.actor(), &slug).await?;
    Ok(Render::new(DETAIL_TEMPLATE, NoteContext { note }))
}

/// GET /edit/{slug}/ - form prefilled with the note.
async fn edit_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Render<FormContext>> {
    let note = state.notes().editable(&user.actor(), &slug).await?;
    let initial = NoteForm {
        title: note.title.clone(),
        text: note.text.clone(),
        slug: Some(note.slug.clone()),
    };
    Ok(form_page(&initial.to_data(), FormErrors::new(), Some(note)))
}

/// POST /edit/{slug}/ - update title and text.
async fn edit(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
    Form(data): Form<BTreeMap<String, String>>,
) -> ApiResult<Response> {
    let actor = user.actor();
    let note = state.notes().editable(&actor, &slug).await?;

    let form = match NoteForm::from_data(&data) {
        Ok(form) => form,
        Err(errors) => {
            tracing::debug!(slug = %slug, ?errors, "Note form rejected");
            return Ok(form_page(&data, errors, Some(note)).into_response());
        }
    };

    state.notes().edit(&actor, &slug, form).await?;
    Ok(success(&state))
}

/// GET /delete/{slug}/ - confirmation page.
async fn delete_page(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Render<NoteContext>> {
    let note = state.notes().deletable(&user.actor(), &slug).await?;
    Ok(Render::new(DELETE_TEMPLATE, NoteContext { note }))
}

/// POST or DELETE /delete/{slug}/
async fn delete(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<Response> {
    state.notes().delete(&user.actor(), &slug).await?;
    Ok(success(&state))
}

/// Build note routes.
pub fn routes(urls: &RouteTable) -> Router<AppState> {
    Router::new()
        .route(urls.pattern(RouteName::Home), get(home))
        .route(urls.pattern(RouteName::List), get(list))
        .route(urls.pattern(RouteName::Add), get(add_page).post(add))
        .route(urls.pattern(RouteName::Success), get(done))
        .route(urls.pattern(RouteName::Detail), get(detail))
        .route(urls.pattern(RouteName::Edit), get(edit_page).post(edit))
        .route(
            urls.pattern(RouteName::Delete),
            get(delete_page).post(delete).delete(delete),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use notes_core::{Paginator, UserId};

    fn note(slug: &str) -> Note {
        let now = chrono::Utc::now();
        Note {
            id: notes_core::NoteId::new(),
            title: "Заголовок".into(),
            text: "Текст".into(),
            slug: slug.into(),
            author: UserId::new(),
            created: now,
            updated: now,
        }
    }

    #[test]
    fn test_list_context_flattens_page() {
        let page = Paginator::new(1).page(vec![note("a")], 1, 2);
        let context = ListContext {
            is_paginated: page.is_paginated(),
            page,
        };
        let value = serde_json::to_value(&context).unwrap();
        assert_eq!(value["object_list"][0]["slug"], "a");
        assert_eq!(value["num_pages"], 2);
        assert_eq!(value["is_paginated"], true);
    }

    #[test]
    fn test_add_form_context_has_no_note() {
        let context = FormContext {
            form: NOTE_FORM.blank(),
            note: None,
        };
        let value = serde_json::to_value(&context).unwrap();
        assert!(value.get("note").is_none());
        assert_eq!(value["form"]["fields"][0]["name"], "title");
    }
}
