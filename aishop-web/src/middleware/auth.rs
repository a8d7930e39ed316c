/// Extractors resolving the signed-in user from the session
///
/// - [`MaybeUser`]: the current user, if any
/// - [`RequireLogin`]: the current user, or a redirect to the login page
///
/// The session only holds the user id. Every request re-reads the user
/// record, so a deleted or deactivated account loses access immediately;
/// such a session is flushed and the visitor is treated as anonymous.
///
/// # Example
///
/// ```no_run
/// use aishop_web::middleware::auth::RequireLogin;
///
/// async fn handler(RequireLogin(user): RequireLogin) -> String {
///     format!("Hello, {}", user.username)
/// }
/// ```

use crate::{app::AppState, error::WebError};
use aishop_shared::{auth::session, models::user::User};
use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::debug;

/// Login page path
pub const LOGIN_PATH: &str = "/login";

/// The authenticated user, or `None` for anonymous visitors
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

/// The authenticated user; anonymous visitors are sent to the login page
#[derive(Debug, Clone)]
pub struct RequireLogin(pub User);

/// Login URL that returns to `path` afterwards
pub fn login_redirect_url(path: &str) -> String {
    format!("{}?next={}", LOGIN_PATH, path)
}

async fn load_user(parts: &mut Parts, state: &AppState) -> Result<Option<User>, Response> {
    let session = Session::from_request_parts(parts, state)
        .await
        .map_err(IntoResponse::into_response)?;

    let user_id = match session::current_user_id(&session).await {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(None),
        Err(e) => return Err(WebError::from(e).into_response()),
    };

    let user = state
        .users
        .find_by_id(user_id)
        .await
        .map_err(|e| WebError::from(e).into_response())?;

    match user {
        Some(user) if user.is_active => Ok(Some(user)),
        _ => {
            debug!(user_id = %user_id, "Session refers to a missing or inactive user, flushing");
            session::log_out(&session)
                .await
                .map_err(|e| WebError::from(e).into_response())?;
            Ok(None)
        }
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(load_user(parts, state).await?))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireLogin {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match load_user(parts, state).await? {
            Some(user) => Ok(RequireLogin(user)),
            None => {
                let path = parts.uri.path().to_string();
                debug!(path = %path, "Anonymous request to a login-gated page");
                Err(Redirect::to(&login_redirect_url(&path)).into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_redirect_url_keeps_path() {
        assert_eq!(login_redirect_url("/dashboard"), "/login?next=/dashboard");
        assert_eq!(login_redirect_url("/profile/update"), "/login?next=/profile/update");
    }
}
