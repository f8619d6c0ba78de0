//! Page responses.
//!
//! A page is answered with a JSON render envelope naming the template and
//! carrying its context; drawing HTML is left to whatever consumes it.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;

pub const HOME_TEMPLATE: &str = "notes/home.html";
pub const LIST_TEMPLATE: &str = "notes/list.html";
pub const FORM_TEMPLATE: &str = "notes/form.html";
pub const SUCCESS_TEMPLATE: &str = "notes/success.html";
pub const DETAIL_TEMPLATE: &str = "notes/detail.html";
pub const DELETE_TEMPLATE: &str = "notes/delete.html";
pub const LOGIN_TEMPLATE: &str = "registration/login.html";
pub const LOGOUT_TEMPLATE: &str = "registration/logout.html";
pub const SIGNUP_TEMPLATE: &str = "registration/signup.html";

/// A rendered page: template name plus context.
#[derive(Debug, Serialize)]
pub struct Render<C> {
    pub template: &'static str,
    pub context: C,
}

impl<C: Serialize> Render<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self { template, context }
    }
}

impl<C: Serialize> IntoResponse for Render<C> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `302 Found` to `location`.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.into())]).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_envelope_shape() {
        let page = Render::new(HOME_TEMPLATE, serde_json::json!({"user": null}));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["template"], "notes/home.html");
        assert!(value["context"]["user"].is_null());
        assert_eq!(page.into_response().status(), StatusCode::OK);
    }

    #[test]
    fn test_found() {
        let response = found("/done/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/done/");
    }
}
