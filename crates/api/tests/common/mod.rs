#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use tessera_api::auth::password::hash_password;
use tessera_api::config::ServerConfig;
use tessera_api::middleware::auth::REFRESH_TOKEN_HEADER;
use tessera_api::notify::{VerificationDelivery, VerificationNotifier};
use tessera_api::router::build_app_router;
use tessera_api::state::AppState;
use tessera_core::config::SessionConfig;
use tessera_db::models::user::{CreateUser, User};
use tessera_db::repositories::UserRepo;

pub const TEST_PASSWORD: &str = "correct-horse-battery-staple";

/// Build a test `ServerConfig` with safe defaults and fixed secrets.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        session_purge_interval_secs: 3600,
        session: SessionConfig::new("test-access-secret", "test-refresh-secret"),
    }
}

/// Notifier that keeps every delivery so tests can read the token.
#[derive(Default)]
pub struct CapturingNotifier {
    deliveries: Mutex<Vec<VerificationDelivery>>,
}

impl CapturingNotifier {
    pub fn last(&self) -> Option<VerificationDelivery> {
        self.deliveries.lock().unwrap().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.deliveries.lock().unwrap().len()
    }
}

impl VerificationNotifier for CapturingNotifier {
    fn deliver(&self, delivery: VerificationDelivery) {
        self.deliveries.lock().unwrap().push(delivery);
    }
}

/// Full application router plus the notifier it delivers to.
pub struct TestApp {
    pub router: Router,
    pub notifier: Arc<CapturingNotifier>,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Build the application exactly as `main.rs` does, with a capturing notifier.
pub fn build_test_app(pool: PgPool) -> TestApp {
    let config = test_config();
    let notifier = Arc::new(CapturingNotifier::default());
    let state = AppState::new(pool, config.clone(), notifier.clone());
    TestApp {
        router: build_app_router(state, &config),
        notifier,
    }
}

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_test_user(pool: &PgPool, email: &str) -> User {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a request with optional JSON body and extra headers.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    headers: &[(&str, &str)],
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, &[]).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body), &[]).await
}

/// POST a JSON body from a client at a public address in `country`.
pub async fn post_json_from(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    ip: &str,
    country: &str,
) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Some(body),
        &[("x-forwarded-for", ip), ("cf-ipcountry", country)],
    )
    .await
}

pub async fn get_auth(
    app: Router,
    uri: &str,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Response<Body> {
    let bearer = format!("Bearer {access_token}");
    let mut headers = vec![("authorization", bearer.as_str())];
    if let Some(refresh) = refresh_token {
        headers.push((REFRESH_TOKEN_HEADER, refresh));
    }
    send(app, Method::GET, uri, None, &headers).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Response<Body> {
    let bearer = format!("Bearer {access_token}");
    let mut headers = vec![("authorization", bearer.as_str())];
    if let Some(refresh) = refresh_token {
        headers.push((REFRESH_TOKEN_HEADER, refresh));
    }
    send(app, Method::POST, uri, Some(body), &headers).await
}

pub async fn delete_auth(
    app: Router,
    uri: &str,
    access_token: &str,
    refresh_token: Option<&str>,
) -> Response<Body> {
    let bearer = format!("Bearer {access_token}");
    let mut headers = vec![("authorization", bearer.as_str())];
    if let Some(refresh) = refresh_token {
        headers.push((REFRESH_TOKEN_HEADER, refresh));
    }
    send(app, Method::DELETE, uri, None, &headers).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
