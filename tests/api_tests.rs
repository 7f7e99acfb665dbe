//! End-to-end HTTP tests: requests go through the full router, middleware
//! included, against a seeded in-memory store.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{Duration, Utc};
use recipe_box::auth::{TokenKeys, TOKEN_HEADER};
use recipe_box::router;
use serde_json::Value;
use tower::ServiceExt;

use common::*;

async fn app(debug: bool) -> Router {
    router(test_state(debug).await)
}

fn token() -> String {
    TokenKeys::new(SECRET).issue().unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, form: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(TOKEN_HEADER, token);
    }
    match form {
        Some(form) => builder
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// Authentication
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_login_issues_usable_token() {
    let app = app(false).await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/login/",
            None,
            Some("username=chef&password=mise+en+place"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(&app, request(Method::GET, "/recipes/full/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials_alike() {
    let app = app(false).await;

    let wrong_password = send(
        &app,
        request(Method::POST, "/login/", None, Some("username=chef&password=nope")),
    )
    .await;
    assert_eq!(wrong_password.status(), StatusCode::FORBIDDEN);
    let wrong_password = body_text(wrong_password).await;

    let unknown_user = send(
        &app,
        request(Method::POST, "/login/", None, Some("username=ghost&password=nope")),
    )
    .await;
    assert_eq!(unknown_user.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(unknown_user).await, wrong_password);
}

#[tokio::test]
async fn test_private_route_without_token_is_unauthorized() {
    let app = app(false).await;

    let response = send(&app, request(Method::GET, "/recipe/1/", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, request(Method::GET, "/recipe/1/", Some("  "), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_and_malformed_tokens_differ() {
    let app = app(false).await;

    let expired = TokenKeys::new(SECRET)
        .issue_expiring_at((Utc::now() - Duration::minutes(5)).timestamp())
        .unwrap();
    let response = send(&app, request(Method::GET, "/recipes/full/", Some(&expired), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response).await.contains("expired"));

    let response = send(
        &app,
        request(Method::GET, "/recipes/full/", Some("not-a-token"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let forged = TokenKeys::new("another secret").issue().unwrap();
    let response = send(&app, request(Method::GET, "/recipes/full/", Some(&forged), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_public_routes_ignore_tokens() {
    let app = app(false).await;

    for uri in ["/recipes/", "/labels/", "/recipe/1/labels/", "/label/10/recipes/"] {
        let response = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = send(
        &app,
        request(Method::GET, "/recipes/", Some("garbage"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ═══════════════════════════════════════════════════════════════════════════
// Recipes
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_recipe_summaries_omit_bodies() {
    let app = app(false).await;

    let summaries = body_json(send(&app, request(Method::GET, "/recipes/", None, None)).await).await;
    let summaries = summaries.as_array().unwrap();
    assert_eq!(summaries.len(), 5);
    assert!(summaries[0].get("body").is_none());
    assert_eq!(summaries[0]["totalTime"], 30);
    assert_eq!(summaries[0]["activeTime"], 10);

    let token = token();
    let full =
        body_json(send(&app, request(Method::GET, "/recipes/full/", Some(&token), None)).await)
            .await;
    assert!(full[0]["body"].is_string());
    assert!(full[0]["labels"].is_array());
}

#[tokio::test]
async fn test_recipe_crud_status_codes() {
    let app = app(false).await;
    let token = token();

    let response = send(
        &app,
        request(
            Method::POST,
            "/recipe/",
            Some(&token),
            Some("title=Chili&body=Beans&activeTime=20&totalTime=120"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["title"], "Chili");
    assert_eq!(created["deleted"], false);

    let response = send(
        &app,
        request(
            Method::PUT,
            &format!("/recipe/{id}/"),
            Some(&token),
            Some("title=Green+Chili&body=Beans&activeTime=20&totalTime=100"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let fetched = body_json(
        send(&app, request(Method::GET, &format!("/recipe/{id}/"), Some(&token), None)).await,
    )
    .await;
    assert_eq!(fetched["title"], "Green Chili");
    assert_eq!(fetched["totalTime"], 100);

    let response = send(
        &app,
        request(Method::DELETE, &format!("/recipe/{id}/"), Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let fetched = body_json(
        send(&app, request(Method::GET, &format!("/recipe/{id}/"), Some(&token), None)).await,
    )
    .await;
    assert_eq!(fetched["deleted"], true);

    let response = send(
        &app,
        request(Method::PUT, &format!("/recipe/{id}/restore"), Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request(Method::DELETE, &format!("/recipe/{id}/hard"), Some(&token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request(Method::GET, &format!("/recipe/{id}/"), Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_recipe_validation_errors() {
    let app = app(false).await;
    let token = token();

    let response = send(
        &app,
        request(
            Method::POST,
            "/recipe/",
            Some(&token),
            Some("title=Chili&body=Beans&activeTime=soon&totalTime=120"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "activeTime must be an integer");

    let response = send(
        &app,
        request(
            Method::POST,
            "/recipe/",
            Some(&token),
            Some("title=&body=Beans&activeTime=1&totalTime=2"),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "title is required");
}

#[tokio::test]
async fn test_paths_match_with_or_without_trailing_slash() {
    let app = app(true).await;
    let token = token();

    for uri in ["/recipes", "/labels", "/recipe/1/labels", "/label/10/recipes"] {
        let response = send(&app, request(Method::GET, uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "{uri}");
    }

    let response = send(&app, request(Method::GET, "/recipe/1", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], 1);

    let response = send(&app, request(Method::PUT, "/note/1/flag/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request(Method::GET, "/debug/getToken", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request(Method::GET, "/recipe/1", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_non_integer_ids_are_bad_requests() {
    let app = app(false).await;
    let token = token();

    let response = send(&app, request(Method::GET, "/recipe/abc/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "recipe ID must be an integer");

    let response = send(&app, request(Method::GET, "/label/xyz/recipes/", None, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "label ID must be an integer");

    let response = send(&app, request(Method::PUT, "/note/n1/flag", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ═══════════════════════════════════════════════════════════════════════════
// Labels and tagging
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_add_label_reports_creation() {
    let app = app(false).await;
    let token = token();

    let response = send(&app, request(Method::PUT, "/label/Grilling", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["name"], "grilling");

    let response = send(&app, request(Method::PUT, "/label/grilling", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], created["id"]);
}

#[tokio::test]
async fn test_tagging_is_idempotent() {
    let app = app(false).await;
    let token = token();

    let response = send(&app, request(Method::PUT, "/recipe/2/label/9", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(&app, request(Method::PUT, "/recipe/2/label/9", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let labels = body_json(send(&app, request(Method::GET, "/recipe/2/labels/", None, None)).await).await;
    assert_eq!(labels.as_array().unwrap().len(), 3);

    let response = send(&app, request(Method::DELETE, "/recipe/2/label/9", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&app, request(Method::PUT, "/recipe/2/label/999", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════════════════════
// Notes
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_note_endpoints() {
    let app = app(false).await;
    let token = token();

    let notes = body_json(send(&app, request(Method::GET, "/recipe/1/notes/", Some(&token), None)).await).await;
    assert_eq!(notes.as_array().unwrap().len(), 2);
    assert_eq!(notes[1]["flagged"], true);

    let response = send(
        &app,
        request(Method::POST, "/recipe/1/note/", Some(&token), Some("text=Rest+the+dough")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let note = body_json(response).await;
    assert_eq!(note["recipeId"], 1);
    let note_id = note["id"].as_i64().unwrap();

    for (method, uri, form) in [
        (Method::PUT, format!("/note/{note_id}"), Some("text=Rest+overnight")),
        (Method::PUT, format!("/note/{note_id}/flag"), None),
        (Method::PUT, format!("/note/{note_id}/unflag"), None),
        (Method::DELETE, format!("/note/{note_id}"), None),
    ] {
        let response = send(&app, request(method, &uri, Some(&token), form)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT, "{uri}");
    }

    let response = send(&app, request(Method::PUT, "/note/999/flag", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_notes_for_missing_recipe() {
    let app = app(false).await;
    let token = token();

    let response = send(&app, request(Method::GET, "/recipe/999/notes/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(
        &app,
        request(Method::POST, "/recipe/999/note/", Some(&token), Some("text=hello")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ═══════════════════════════════════════════════════════════════════════════
// Debug routes
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_debug_routes_forbidden_outside_debug() {
    let app = app(false).await;

    for (method, uri) in [
        (Method::GET, "/debug/getToken/"),
        (Method::GET, "/debug/checkToken/"),
        (Method::POST, "/debug/hash/"),
    ] {
        let response = send(&app, request(method, uri, None, None)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }
}

#[tokio::test]
async fn test_debug_token_round_trip() {
    let app = app(true).await;

    let token = body_json(send(&app, request(Method::GET, "/debug/getToken/", None, None)).await)
        .await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = send(&app, request(Method::GET, "/debug/checkToken/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request(Method::GET, "/debug/checkToken/", Some("junk"), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, request(Method::GET, "/debug/checkToken/", None, None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_debug_hash_verifies() {
    let app = app(true).await;

    let response = send(
        &app,
        request(Method::POST, "/debug/hash/", None, Some("password=hunter2")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let hash = body_json(response).await["hash"].as_str().unwrap().to_string();
    assert!(bcrypt::verify("hunter2", &hash).unwrap());
}

#[tokio::test]
async fn test_debug_mode_adds_error_detail() {
    let token = token();

    let quiet = app(false).await;
    let response = send(&quiet, request(Method::GET, "/recipes/full/", Some("bad.token.here"), None)).await;
    assert_eq!(body_text(response).await, "invalid auth token");

    let verbose = app(true).await;
    let response = send(&verbose, request(Method::GET, "/recipes/full/", Some("bad.token.here"), None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.starts_with("invalid auth token: "));

    let response = send(&verbose, request(Method::GET, "/recipes/full/", Some(&token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
