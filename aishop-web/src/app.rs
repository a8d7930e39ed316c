/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use aishop_shared::store::MemoryUserStore;
/// use aishop_web::{app::{build_router, AppState}, config::Config};
/// use std::sync::Arc;
/// use tower_sessions::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryUserStore::new()), config);
/// let app = build_router(state, MemoryStore::default());
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use aishop_shared::store::UserStore;
use axum::{routing::get, Router};
use sha2::{Digest, Sha512};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tokio::task::JoinHandle;
use tower_sessions::{
    cookie::{time::Duration, Key, SameSite},
    session_store::ExpiredDeletion,
    Expiry, SessionManagerLayer, SessionStore,
};
use tracing::Level;

/// Name of the session cookie
pub const SESSION_COOKIE_NAME: &str = "aishop_session";

/// How often expired sessions are deleted from the session store
pub const EXPIRED_SESSION_CLEANUP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Identity store
    pub users: Arc<dyn UserStore>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, config: Config) -> Self {
        Self {
            users,
            config: Arc::new(config),
        }
    }
}

/// Cookie signing key derived from `SECRET_KEY`
///
/// SHA-512 stretches any accepted secret to the 64 bytes the signing key
/// requires.
fn signing_key(secret: &str) -> Key {
    Key::from(Sha512::digest(secret.as_bytes()).as_slice())
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET       /                 # Landing page (signed-in: redirect to dashboard)
/// ├── GET|POST  /signup
/// ├── GET|POST  /login
/// ├── GET       /logout
/// ├── GET       /dashboard        # Login required
/// ├── GET       /profile          # Login required
/// ├── GET|POST  /profile/update   # Login required
/// └── GET       /health
/// ```
///
/// Sessions live in `store`: PostgreSQL in production, memory in tests.
pub fn build_router<S>(state: AppState, store: S) -> Router
where
    S: SessionStore + Clone,
{
    let session_config = &state.config.session;

    let session_layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_path("/")
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_secure(state.config.secure_cookies())
        .with_expiry(Expiry::OnInactivity(Duration::seconds(session_config.expiry_seconds)))
        .with_signed(signing_key(&session_config.secret_key));

    let auth_routes = Router::new()
        .route(
            "/signup",
            get(routes::auth::signup_page).post(routes::auth::signup),
        )
        .route(
            "/login",
            get(routes::auth::login_page).post(routes::auth::login),
        )
        .route("/logout", get(routes::auth::logout));

    let account_routes = Router::new()
        .route("/dashboard", get(routes::pages::dashboard))
        .route("/profile", get(routes::profile::profile))
        .route(
            "/profile/update",
            get(routes::profile::edit_profile_page).post(routes::profile::update_profile),
        );

    let enable_hsts = state.config.secure_cookies();

    Router::new()
        .route("/", get(routes::pages::home))
        .route("/health", get(routes::health::health_check))
        .merge(auth_routes)
        .merge(account_routes)
        .fallback(routes::pages::not_found)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SecurityHeadersLayer::new(enable_hsts))
        .with_state(state)
}

/// Spawns the task that deletes expired sessions every `period`
///
/// The task only ends on a store error, which is logged. Abort the handle
/// on shutdown.
pub fn spawn_expired_session_cleanup<S>(store: S, period: std::time::Duration) -> JoinHandle<()>
where
    S: ExpiredDeletion + Clone,
{
    tokio::spawn(async move {
        if let Err(e) = store.continuously_delete_expired(period).await {
            tracing::error!("Expired session cleanup stopped: {}", e);
        }
    })
}
