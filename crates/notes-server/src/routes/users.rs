//! Account pages: login, logout, signup.

use std::collections::BTreeMap;

use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use notes_core::{FormErrors, FormView, LOGIN_FORM, SIGNUP_FORM};
use notes_store::{NewUser, StoreError};

use crate::auth::{self, MaybeUser};
use crate::error::ApiResult;
use crate::render::{LOGIN_TEMPLATE, LOGOUT_TEMPLATE, Render, SIGNUP_TEMPLATE, found};
use crate::state::AppState;
use crate::urls::{RouteName, RouteTable};

pub const INVALID_LOGIN_MESSAGE: &str = "Пожалуйста, введите правильные имя пользователя и пароль. Оба поля могут быть чувствительны к регистру.";
pub const INACTIVE_MESSAGE: &str = "Эта учетная запись отключена.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Введенные пароли не совпадают.";
pub const USERNAME_TAKEN_MESSAGE: &str = "Пользователь с таким именем уже существует.";

// ============================================================================
// Page contexts
// ============================================================================

#[derive(Debug, Serialize)]
pub struct LoginContext {
    pub form: FormView,
    /// Where to go after logging in.
    pub next: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupContext {
    pub form: FormView,
}

#[derive(Debug, Serialize)]
pub struct LogoutContext {}

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

fn login_page(
    data: &BTreeMap<String, String>,
    errors: FormErrors,
    next: Option<String>,
) -> Render<LoginContext> {
    Render::new(
        LOGIN_TEMPLATE,
        LoginContext {
            form: LOGIN_FORM.bind(data, errors),
            next,
        },
    )
}

fn signup_page(data: &BTreeMap<String, String>, errors: FormErrors) -> Render<SignupContext> {
    Render::new(
        SIGNUP_TEMPLATE,
        SignupContext {
            form: SIGNUP_FORM.bind(data, errors),
        },
    )
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET /auth/login/?next=...
async fn login_form(Query(query): Query<NextQuery>) -> Render<LoginContext> {
    login_page(&BTreeMap::new(), FormErrors::new(), query.next)
}

/// POST /auth/login/ - check credentials and start a session.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<NextQuery>,
    Form(data): Form<BTreeMap<String, String>>,
) -> ApiResult<Response> {
    let next = data
        .get("next")
        .cloned()
        .filter(|n| !n.is_empty())
        .or(query.next);

    let mut cleaned = match LOGIN_FORM.clean(&data) {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(login_page(&data, errors, next).into_response()),
    };
    let username = cleaned.take("username").unwrap_or_default();
    let password = cleaned.take("password").unwrap_or_default();

    let user = state.store().get_user_by_username(&username).await?;
    let user = match user {
        Some(user) if auth::verify_password(&password, &user.password_hash) => user,
        _ => {
            tracing::warn!(username = %username, "Failed login attempt");
            let mut errors = FormErrors::new();
            errors.add_non_field(INVALID_LOGIN_MESSAGE);
            return Ok(login_page(&data, errors, next).into_response());
        }
    };

    if !user.is_active {
        tracing::warn!(username = %username, "Login to deactivated account");
        let mut errors = FormErrors::new();
        errors.add_non_field(INACTIVE_MESSAGE);
        return Ok(login_page(&data, errors, next).into_response());
    }

    let config = state.config();
    let token = auth::create_token(
        user.user_id(),
        &user.username,
        &config.session_secret,
        config.session_expiry_hours,
    )?;

    tracing::info!(user_id = %user.id, username = %user.username, "User logged in");

    let target = next
        .filter(|n| RouteTable::is_local(n))
        .unwrap_or_else(|| state.urls().reverse(RouteName::Home, &[]));
    Ok((jar.add(auth::session_cookie(token)), found(target)).into_response())
}

/// GET or POST /auth/logout/ - end the session.
async fn logout(MaybeUser(user): MaybeUser, jar: CookieJar) -> impl IntoResponse {
    if let Some(user) = user {
        tracing::info!(user_id = %user.user_id, "User logged out");
    }
    (
        jar.remove(auth::removal_cookie()),
        Render::new(LOGOUT_TEMPLATE, LogoutContext {}),
    )
}

/// GET /auth/signup/
async fn signup_form() -> Render<SignupContext> {
    signup_page(&BTreeMap::new(), FormErrors::new())
}

/// POST /auth/signup/ - create an account, then send the user to log in.
async fn signup(
    State(state): State<AppState>,
    Form(data): Form<BTreeMap<String, String>>,
) -> ApiResult<Response> {
    let mut cleaned = match SIGNUP_FORM.clean(&data) {
        Ok(cleaned) => cleaned,
        Err(errors) => return Ok(signup_page(&data, errors).into_response()),
    };
    let username = cleaned.take("username").unwrap_or_default();
    let password = cleaned.take("password1").unwrap_or_default();

    if cleaned.get("password2") != Some(password.as_str()) {
        let errors = FormErrors::single("password2", PASSWORD_MISMATCH_MESSAGE);
        return Ok(signup_page(&data, errors).into_response());
    }

    let password_hash = auth::hash_password(&password)?;
    match state
        .store()
        .insert_user(&NewUser::new(username, password_hash))
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, username = %user.username, "User signed up");
            Ok(found(state.urls().reverse(RouteName::Login, &[])))
        }
        Err(StoreError::UsernameTaken(name)) => {
            tracing::warn!(username = %name, "Signup with taken username");
            let errors = FormErrors::single("username", USERNAME_TAKEN_MESSAGE);
            Ok(signup_page(&data, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Build account routes.
pub fn routes(urls: &RouteTable) -> Router<AppState> {
    Router::new()
        .route(urls.pattern(RouteName::Login), get(login_form).post(login))
        .route(urls.pattern(RouteName::Logout), get(logout).post(logout))
        .route(urls.pattern(RouteName::Signup), get(signup_form).post(signup))
}
