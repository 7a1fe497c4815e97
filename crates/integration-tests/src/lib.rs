//! HTTP-level test harness for the Waterline API.
//!
//! [`TestApp`] drives the real router in process: handlers, services and
//! session handling are production code, storage is the in-memory store and
//! sessions live in a `tower_sessions::MemoryStore`. No database or network
//! is needed.
//!
//! ```rust,ignore
//! let app = TestApp::new().await;
//! let admin = app.login("admin").await;
//! let (status, body) = app.get("/api/users", Some(&admin)).await;
//! ```

use std::sync::LazyLock;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use waterline_core::{UserId, UserRole, Username};
use waterline_server::models::NewUser;
use waterline_server::routes;
use waterline_server::services::users::hash_password;
use waterline_server::state::AppState;
use waterline_server::store::UserStore;
use waterline_server::store::memory::InMemoryStore;

/// Password shared by every seeded account.
pub const PASSWORD: &str = "correct-horse-battery";

static PASSWORD_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password(PASSWORD).expect("hash test password"));

/// Seeded accounts: (username, role).
pub const USERS: [(&str, UserRole); 3] = [
    ("admin", UserRole::Admin),
    ("engr", UserRole::Engr),
    ("viewer", UserRole::User),
];

/// An in-process instance of the API.
pub struct TestApp {
    router: Router,
}

/// Session cookie of a logged-in user.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    cookie: String,
}

impl TestApp {
    /// Build the app with the [`USERS`] accounts seeded.
    ///
    /// # Panics
    ///
    /// Panics if seeding fails.
    pub async fn new() -> Self {
        let store = InMemoryStore::new();
        for (username, role) in USERS {
            store
                .insert_user(&NewUser {
                    username: Username::parse(username).expect("valid username"),
                    full_name: format!("Test {username}"),
                    password_hash: PASSWORD_HASH.clone(),
                    role,
                })
                .await
                .expect("seed user");
        }

        let sessions = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        let router = routes::app(AppState::new(store)).layer(sessions);
        Self { router }
    }

    /// Log in as a seeded user.
    ///
    /// # Panics
    ///
    /// Panics if the login is rejected or no cookie is set.
    pub async fn login(&self, username: &str) -> Session {
        let response = self
            .router
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(&json!({ "username": username, "password": PASSWORD })),
            ))
            .await
            .expect("router is infallible");
        assert_eq!(response.status(), StatusCode::OK, "login as {username}");

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .expect("session cookie")
            .to_string();
        let (_, body) = read_json(response).await;
        let user_id = body["id"].as_i64().and_then(|id| i32::try_from(id).ok()).expect("user id");

        Session {
            user_id: UserId::new(user_id),
            cookie,
        }
    }

    /// Send a request and return the status and JSON body.
    ///
    /// An empty body reads as `Null`; a non-JSON body as a string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        session: Option<&Session>,
        body: Option<&Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(json_request(method, uri, session, body)).await;
        read_json(response).await
    }

    /// Send a prepared request and return the raw response.
    pub async fn raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn get(&self, uri: &str, session: Option<&Session>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, session, None).await
    }

    pub async fn post(&self, uri: &str, session: &Session, body: &Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(session), Some(body)).await
    }

    pub async fn put(&self, uri: &str, session: &Session, body: &Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(session), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, session: &Session) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(session), None).await
    }
}

/// Build a request carrying the session cookie and an optional JSON body.
///
/// # Panics
///
/// Panics if the request cannot be built.
pub fn json_request(
    method: Method,
    uri: &str,
    session: Option<&Session>,
    body: Option<&Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(session) = session {
        builder = builder.header(header::COOKIE, &session.cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("valid request")
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    });
    (status, body)
}
