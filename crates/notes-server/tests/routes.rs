//! Page availability and redirects for anonymous users, readers and authors.

mod common;

use axum::http::StatusCode;
use common::spawn_app;
use notes_server::RouteName;

#[tokio::test]
async fn test_anon_public_pages_availability() {
    let app = spawn_app().await;

    for name in [RouteName::Home, RouteName::Login, RouteName::Signup] {
        let response = app.get(&app.url(name, &[]), None).await;
        assert_eq!(response.status, StatusCode::OK, "{name}");
    }
}

#[tokio::test]
async fn test_pages_availability_for_author() {
    let app = spawn_app().await;
    let author = app.create_user("Лев Толстой").await;
    let note = app.create_note(author, "Заголовок", None).await;
    let cookie = app.login_as(author);

    for name in [RouteName::Detail, RouteName::Edit, RouteName::Delete] {
        let response = app.get(&app.url(name, &[&note.slug]), Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{name}");
    }
}

#[tokio::test]
async fn test_pages_availability_for_auth_user() {
    let app = spawn_app().await;
    let reader = app.create_user("Читатель простой").await;
    let cookie = app.login_as(reader);

    for name in [RouteName::List, RouteName::Add, RouteName::Success] {
        let response = app.get(&app.url(name, &[]), Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{name}");
    }
}

#[tokio::test]
async fn test_redirect_for_anonymous_client() {
    let app = spawn_app().await;
    let author = app.create_user("Лев Толстой").await;
    let note = app.create_note(author, "Заголовок", None).await;
    let login = app.url(RouteName::Login, &[]);

    // The note id is not a route parameter; the redirect happens regardless.
    for arg in [note.slug.clone(), note.id.to_string()] {
        for name in [RouteName::Edit, RouteName::Delete] {
            let url = app.url(name, &[&arg]);
            let response = app.get(&url, None).await;
            assert_eq!(response.status, StatusCode::FOUND, "{name}");
            assert_eq!(
                response.location(),
                Some(format!("{login}?next={url}").as_str())
            );
        }
    }
}

#[tokio::test]
async fn test_anonymous_redirects_from_every_protected_page() {
    let app = spawn_app().await;

    for name in [RouteName::List, RouteName::Add, RouteName::Success, RouteName::Detail] {
        let url = app.url(name, &["whatever"]);
        let response = app.get(&url, None).await;
        assert_eq!(response.status, StatusCode::FOUND, "{name}");
        assert!(response.location().unwrap().starts_with("/auth/login/?next="));
    }
}

#[tokio::test]
async fn test_redirect_keeps_query_string() {
    let app = spawn_app().await;

    let response = app.get("/notes/?page=2", None).await;
    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(
        response.location(),
        Some("/auth/login/?next=/notes/%3Fpage%3D2")
    );
}

#[tokio::test]
async fn test_success_url_after_edit() {
    let app = spawn_app().await;
    let author = app.create_user("Лев Толстой").await;
    let note = app.create_note(author, "Заголовок", None).await;
    let cookie = app.login_as(author);

    let response = app
        .post_form(
            &app.url(RouteName::Edit, &[&note.slug]),
            Some(&cookie),
            &[("title", "Новый заголовок"), ("text", "Новый текст")],
        )
        .await;

    assert_eq!(response.status, StatusCode::FOUND);
    assert_eq!(response.location(), Some("/done/"));
}

#[tokio::test]
async fn test_pages_availability_for_authenticated_reader() {
    let app = spawn_app().await;
    let author = app.create_user("Лев Толстой").await;
    let reader = app.create_user("Читатель простой").await;
    let note = app.create_note(author, "Заголовок", None).await;
    let cookie = app.login_as(reader);

    for name in [RouteName::List, RouteName::Add] {
        let response = app.get(&app.url(name, &[]), Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::OK, "{name}");
    }

    for name in [RouteName::Edit, RouteName::Delete, RouteName::Detail] {
        let response = app.get(&app.url(name, &[&note.slug]), Some(&cookie)).await;
        assert_eq!(response.status, StatusCode::NOT_FOUND, "{name}");
        assert_eq!(response.json()["error"]["code"], "NOT_FOUND");
    }
}

#[tokio::test]
async fn test_missing_note_is_not_found() {
    let app = spawn_app().await;
    let author = app.create_user("Автор").await;
    let cookie = app.login_as(author);

    let response = app
        .get(&app.url(RouteName::Detail, &["no-such-note"]), Some(&cookie))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_request_id() {
    let app = spawn_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["status"], "ok");
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_invalid_session_is_anonymous() {
    let app = spawn_app().await;

    let response = app.get("/add/", Some("sessionid=not-a-token")).await;
    assert_eq!(response.status, StatusCode::FOUND);

    let response = app.get("/", Some("sessionid=not-a-token")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.context()["user"].is_null());
}

#[tokio::test]
async fn test_deactivated_user_is_anonymous() {
    let app = spawn_app().await;
    let user = app.create_user("Бывший").await;
    let cookie = app.login_as(user);
    app.state.store().deactivate_user(user).await.unwrap();

    let response = app.get("/notes/", Some(&cookie)).await;
    assert_eq!(response.status, StatusCode::FOUND);
}
