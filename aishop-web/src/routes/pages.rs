/// Landing and dashboard pages

use crate::{
    error::{WebError, WebResult},
    flash,
    middleware::auth::{MaybeUser, RequireLogin},
    routes::auth::DASHBOARD_PATH,
    templates::{render, DashboardTemplate, HomeTemplate, UserView},
};
use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

/// `GET /`: signed-in visitors go straight to the dashboard
pub async fn home(MaybeUser(user): MaybeUser, session: Session) -> WebResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let page = HomeTemplate {
        messages: flash::take(&session).await?,
    };
    Ok(render(&page)?.into_response())
}

/// `GET /dashboard`
pub async fn dashboard(RequireLogin(user): RequireLogin, session: Session) -> WebResult<Response> {
    let page = DashboardTemplate {
        messages: flash::take(&session).await?,
        user: UserView::from(&user),
    };
    Ok(render(&page)?.into_response())
}

/// Fallback for unknown paths
pub async fn not_found() -> WebError {
    WebError::NotFound("The page you requested does not exist.".to_string())
}
