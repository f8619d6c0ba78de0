//! Shared fixtures for the server integration tests.
//!
//! Each test gets its own in-memory database and drives the router
//! in-process. Sessions are minted directly for users created in the store,
//! without going through the login page.

#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::Value;
use tower::ServiceExt;

use notes_core::{Actor, Note, NoteForm, UserId};
use notes_server::{AppState, RouteName, ServerConfig, app, auth};
use notes_store::{NewUser, Store, StoreConfig};

pub const SECRET: &str = "integration-test-secret";
pub const PER_PAGE: u32 = 10;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn template(&self) -> String {
        self.json()["template"]
            .as_str()
            .unwrap_or_default()
            .to_string()
    }

    pub fn context(&self) -> Value {
        self.json()["context"].clone()
    }

    /// Errors rendered for `field` of the page's form.
    pub fn form_errors(&self, field: &str) -> Vec<String> {
        self.context()["form"]["errors"][field]
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .filter_map(|e| e.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// `name=value` of the session cookie set by this response, if any.
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&format!("{}=", auth::SESSION_COOKIE)))
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_page_size(PER_PAGE).await
}

pub async fn spawn_app_with_page_size(per_page: u32) -> TestApp {
    let store = Store::connect(StoreConfig::in_memory())
        .await
        .expect("in-memory store");
    let mut config = ServerConfig::new("sqlite::memory:", SECRET);
    config.notes_per_page = per_page;

    let state = AppState::new(store, config);
    TestApp {
        router: app(state.clone()),
        state,
    }
}

impl TestApp {
    /// A user without a usable password.
    pub async fn create_user(&self, username: &str) -> UserId {
        self.state
            .store()
            .insert_user(&NewUser::new(username, "!"))
            .await
            .expect("insert user")
            .user_id()
    }

    /// Cookie header value logging `user` in.
    pub fn login_as(&self, user: UserId) -> String {
        let token = auth::create_token(user, "test", SECRET, 1).expect("token");
        format!("{}={}", auth::SESSION_COOKIE, token)
    }

    pub async fn create_note(&self, author: UserId, title: &str, slug: Option<&str>) -> Note {
        let form = NoteForm {
            title: title.to_string(),
            text: "Текст".to_string(),
            slug: slug.map(str::to_string),
        };
        self.state
            .notes()
            .add(&Actor::User(author), form)
            .await
            .expect("create note")
    }

    pub async fn note_count(&self) -> u64 {
        self.state.store().count_notes().await.expect("count notes")
    }

    pub fn url(&self, name: RouteName, args: &[&str]) -> String {
        self.state.urls().reverse(name, args)
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, cookie, None).await
    }

    pub async fn delete(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, cookie, None).await
    }

    pub async fn post_form(
        &self,
        uri: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let body = serde_urlencoded::to_string(fields).expect("encode form");
        self.send(Method::POST, uri, cookie, Some(body)).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        form: Option<String>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let body = match form {
            Some(form) => {
                builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
                Body::from(form)
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
