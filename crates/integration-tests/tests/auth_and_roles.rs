//! Login, sessions and role gates over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use waterline_integration_tests::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health_needs_no_session() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "ok");

    let (status, _) = app.get("/health/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_and_me() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;

    let (status, body) = app.get("/api/auth/me", Some(&engr)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "engr");
    assert_eq!(body["role"], "engr");
}

#[tokio::test]
async fn test_bad_credentials_are_generic() {
    let app = TestApp::new().await;

    let wrong_password = json!({ "username": "admin", "password": "not-the-password" });
    let unknown_user = json!({ "username": "ghost", "password": PASSWORD });

    for body in [wrong_password, unknown_user] {
        let (status, response) = app
            .send(
                axum::http::Method::POST,
                "/api/auth/login",
                None,
                Some(&body),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["error"], "invalid username or password");
    }
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = TestApp::new().await;
    for uri in ["/api/auth/me", "/api/inventory", "/api/shapes", "/api/audit-logs"] {
        let (status, body) = app.get(uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = TestApp::new().await;
    let viewer = app.login("viewer").await;

    let (status, _) = app.post("/api/auth/logout", &viewer, &json!({})).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/auth/me", Some(&viewer)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gates() {
    let app = TestApp::new().await;
    let engr = app.login("engr").await;
    let viewer = app.login("viewer").await;

    // Catalog writes are admin only
    let (status, _) = app
        .post("/api/catalog/suppliers", &engr, &json!({ "name": "Acme Pipes" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Map writes are open to engineers but not to plain users
    let shape = json!({
        "kind": "marker",
        "geojson": { "type": "Feature", "geometry": { "type": "Point", "coordinates": [125.6, 7.1] }, "properties": {} },
        "title": "Valve 12"
    });
    let (status, _) = app.post("/api/shapes", &viewer, &shape).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.post("/api/shapes", &engr, &shape).await;
    assert_eq!(status, StatusCode::CREATED);

    // Reads are open to everyone logged in
    let (status, body) = app.get("/api/shapes", Some(&viewer)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    // Account management and the audit trail are admin only
    let (status, _) = app.get("/api/users", Some(&engr)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.get("/api/audit-logs", Some(&viewer)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_manages_users() {
    let app = TestApp::new().await;
    let admin = app.login("admin").await;

    let (status, created) = app
        .post(
            "/api/users",
            &admin,
            &json!({
                "username": "Clerk.Two",
                "full_name": "Second Clerk",
                "password": "long-enough-password",
                "role": "user"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["username"], "clerk.two");
    assert!(created.get("password_hash").is_none());

    let clerk = app.login("clerk.two").await;
    let (status, _) = app.get("/api/auth/me", Some(&clerk)).await;
    assert_eq!(status, StatusCode::OK);

    // Deleting the account invalidates its session
    let (status, _) = app
        .delete(&format!("/api/users/{}", clerk.user_id), &admin)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = app.get("/api/auth/me", Some(&clerk)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Admins cannot delete themselves
    let (status, body) = app
        .delete(&format!("/api/users/{}", admin.user_id), &admin)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}
