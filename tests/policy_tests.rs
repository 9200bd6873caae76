mod common;

use axum::http::Method;
use board_api::{
    auth::{self, ROLE_ADMIN, ROLE_USER},
    policy::{Access, required_access},
    repository::Repository,
};
use common::{client, login, signup, spawn_app};

// --- Policy Table Evaluation (first match wins) ---

#[test]
fn options_requests_are_public_on_any_path() {
    assert_eq!(
        required_access(&Method::OPTIONS, "/api/posts"),
        Access::Public
    );
    assert_eq!(required_access(&Method::OPTIONS, "/anything"), Access::Public);
    assert_eq!(required_access(&Method::OPTIONS, "/login"), Access::Public);
}

#[test]
fn authentication_namespace_and_login_are_public() {
    assert_eq!(
        required_access(&Method::POST, "/api/auth/signup"),
        Access::Public
    );
    assert_eq!(required_access(&Method::POST, "/login"), Access::Public);
}

#[test]
fn board_namespace_requires_user_or_admin() {
    let expected = Access::AnyRole(&[ROLE_USER, ROLE_ADMIN]);
    assert_eq!(required_access(&Method::GET, "/api/posts"), expected);
    assert_eq!(required_access(&Method::POST, "/api/posts"), expected);
    assert_eq!(required_access(&Method::PUT, "/api/posts/42"), expected);
    assert_eq!(required_access(&Method::DELETE, "/api/posts/42"), expected);
}

#[test]
fn any_other_path_requires_some_authenticated_session() {
    assert_eq!(required_access(&Method::GET, "/health"), Access::Authenticated);
    assert_eq!(required_access(&Method::POST, "/logout"), Access::Authenticated);
    // Pattern boundaries: a sibling path that merely shares the prefix string
    // does not inherit the board rule.
    assert_eq!(
        required_access(&Method::GET, "/api/postscript"),
        Access::Authenticated
    );
}

// --- Gate Behavior Over HTTP ---

#[tokio::test]
async fn unauthenticated_board_request_gets_structured_401() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/api/posts", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Unauthorized");
    assert!(
        body["message"].as_str().is_some_and(|m| !m.is_empty()),
        "cause message should be present"
    );
}

#[tokio::test]
async fn cors_preflight_passes_without_credentials() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/posts", app.address))
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:3000")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );
}

#[tokio::test]
async fn bare_options_request_is_never_rejected_by_the_gate() {
    let app = spawn_app().await;
    // No pre-flight headers, no session: the gate must still wave it through.
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/api/posts", app.address))
        .send()
        .await
        .unwrap();

    assert_ne!(response.status(), 401);
    assert_ne!(response.status(), 403);
}

#[tokio::test]
async fn session_without_board_role_is_forbidden() {
    let app = spawn_app().await;

    // An account with a role outside {USER, ADMIN} can only exist by direct
    // seeding; signup always grants ROLE_USER.
    let guest_role = app.repo.create_role("ROLE_GUEST").await.unwrap();
    let hash = auth::hash_password("guest").unwrap();
    app.repo
        .create_user("guest", &hash, guest_role.id)
        .await
        .unwrap();

    let client = client();
    let response = login(&client, &app.address, "guest", "guest").await;
    assert_eq!(response.status(), 200, "login itself accepts any valid account");

    let response = client
        .get(format!("{}/api/posts", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden");
}

#[tokio::test]
async fn health_probe_sits_behind_the_catch_all_rule() {
    let app = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let client = client();
    signup(&client, &app.address, "probe", "pw").await;
    login(&client, &app.address, "probe", "pw").await;

    let response = client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}
