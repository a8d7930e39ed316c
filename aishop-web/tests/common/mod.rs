/// Common test utilities for integration tests
///
/// [`TestContext`] builds the real router on top of the in-memory identity
/// store and in-memory session store, so no database is needed. It behaves
/// like a single browser: the session cookie from each response is sent
/// with the next request

use aishop_shared::auth::password;
use aishop_shared::models::user::{CreateUser, User};
use aishop_shared::store::{MemoryUserStore, UserStore};
use aishop_web::app::{build_router, AppState, SESSION_COOKIE_NAME};
use aishop_web::config::{Config, DatabaseConfig, ServerConfig, SessionConfig};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use std::sync::Arc;
use tower::Service as _;
use tower_sessions::MemoryStore;

/// Password accepted by the signup validators
pub const GOOD_PASSWORD: &str = "mango-basket-42";

pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: "postgresql://unused".to_string(),
            max_connections: 1,
        },
        session: SessionConfig {
            secret_key: "integration-test-secret-key-0123456789".to_string(),
            expiry_seconds: 3600,
        },
        debug: true,
    }
}

/// Response with the body already collected
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    /// Asserts a 303 redirect and returns its target
    pub fn redirect_target(&self) -> &str {
        assert_eq!(self.status, StatusCode::SEE_OTHER, "body: {}", self.body);
        self.location.as_deref().unwrap()
    }
}

/// Collects status, redirect target and body
pub async fn read_response(response: Response) -> TestResponse {
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        location,
        body: String::from_utf8_lossy(&body).into_owned(),
    }
}

/// Urlencoded POST request
pub fn form_request(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_urlencoded::to_string(fields).unwrap()))
        .unwrap()
}

/// Signup request with a derived email and a fixed phone number
pub fn signup_request(username: &str, password1: &str, password2: &str) -> Request<Body> {
    let email = format!("{}@example.com", username);
    form_request(
        "/signup",
        &[
            ("username", username),
            ("email", email.as_str()),
            ("phone", "010-1234-5678"),
            ("password1", password1),
            ("password2", password2),
        ],
    )
}

pub struct TestContext {
    pub users: MemoryUserStore,
    pub app: Router,
    cookie: Option<String>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        let users = MemoryUserStore::new();
        let state = AppState::new(Arc::new(users.clone()), config);
        let app = build_router(state, MemoryStore::default());

        Self {
            users,
            app,
            cookie: None,
        }
    }

    /// Current `name=value` session cookie, if any
    pub fn session_cookie(&self) -> Option<String> {
        self.cookie.clone()
    }

    /// Replaces the cookie sent with the next request
    pub fn use_cookie(&mut self, cookie: Option<String>) {
        self.cookie = cookie;
    }

    async fn send(&mut self, mut request: Request<Body>) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().call(request).await.unwrap();

        for value in response.headers().get_all(header::SET_COOKIE) {
            let pair = value.to_str().unwrap().split(';').next().unwrap().trim();
            if let Some(cookie_value) = pair.strip_prefix(&format!("{}=", SESSION_COOKIE_NAME)) {
                self.cookie = if cookie_value.is_empty() {
                    None
                } else {
                    Some(pair.to_string())
                };
            }
        }

        read_response(response).await
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        self.send(form_request(uri, fields)).await
    }

    pub async fn signup(&mut self, username: &str, password1: &str, password2: &str) -> TestResponse {
        self.send(signup_request(username, password1, password2)).await
    }

    pub async fn login(&mut self, username: &str, password: &str) -> TestResponse {
        self.post_form("/login", &[("username", username), ("password", password)])
            .await
    }

    /// Inserts a user directly into the store
    pub async fn create_user(&self, username: &str, password: &str) -> User {
        let hash = password::hash_password(password).unwrap();
        self.users
            .create(CreateUser::new(username, format!("{}@example.com", username), hash))
            .await
            .unwrap()
    }
}
