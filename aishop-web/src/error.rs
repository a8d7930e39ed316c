/// Error handling for the web server
///
/// Handlers return `WebResult<T>`. Form validation failures are not errors:
/// they re-render the form. `WebError` covers everything that ends in an
/// error page instead.

use crate::templates::ErrorTemplate;
use aishop_shared::{auth::password::PasswordError, store::StoreError};
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Web result type alias
pub type WebResult<T> = Result<T, WebError>;

/// Errors that end a request with an error page
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// Not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (503)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl WebError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Message safe to show to the visitor
    fn public_message(&self) -> String {
        match self {
            WebError::NotFound(msg) => msg.clone(),
            WebError::Internal(_) => "Something went wrong on our side. Please try again.".to_string(),
            WebError::ServiceUnavailable(_) => {
                "The service is temporarily unavailable. Please try again shortly.".to_string()
            }
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            WebError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            WebError::ServiceUnavailable(msg) => tracing::warn!("Service unavailable: {}", msg),
            WebError::NotFound(_) => {}
        }

        let page = ErrorTemplate {
            messages: Vec::new(),
            status: status.as_u16(),
            message: self.public_message(),
        };

        match page.render() {
            Ok(body) => (status, Html(body)).into_response(),
            Err(_) => (status, self.public_message()).into_response(),
        }
    }
}

impl From<StoreError> for WebError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Database(sqlx::Error::PoolTimedOut) => {
                WebError::ServiceUnavailable("Database pool timed out".to_string())
            }
            other => WebError::Internal(other.to_string()),
        }
    }
}

impl From<tower_sessions::session::Error> for WebError {
    fn from(err: tower_sessions::session::Error) -> Self {
        WebError::Internal(format!("Session error: {}", err))
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        WebError::Internal(format!("Template error: {}", err))
    }
}

impl From<PasswordError> for WebError {
    fn from(err: PasswordError) -> Self {
        WebError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for WebError {
    fn from(err: tokio::task::JoinError) -> Self {
        WebError::Internal(format!("Background task failed: {}", err))
    }
}
