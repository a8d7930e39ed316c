/// Profile pages
///
/// # Endpoints
///
/// - `GET  /profile`        - Read-only profile
/// - `GET  /profile/update` - Edit form
/// - `POST /profile/update` - Save name, age, gender and phone
///
/// Username and password cannot be changed here.

use crate::{
    app::AppState,
    error::{WebError, WebResult},
    flash::{self, FlashMessage, Level},
    forms::{FormErrors, ProfileForm},
    middleware::auth::RequireLogin,
    templates::{profile_form_for, render, ProfileTemplate},
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use tower_sessions::Session;
use tracing::info;

pub async fn profile(RequireLogin(user): RequireLogin, session: Session) -> WebResult<Response> {
    let messages = flash::take(&session).await?;
    Ok(render(&ProfileTemplate::view(messages, &user))?.into_response())
}

pub async fn edit_profile_page(RequireLogin(user): RequireLogin, session: Session) -> WebResult<Response> {
    let messages = flash::take(&session).await?;
    let page = ProfileTemplate::edit(messages, &user, profile_form_for(&user), FormErrors::new());
    Ok(render(&page)?.into_response())
}

pub async fn update_profile(
    RequireLogin(user): RequireLogin,
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> WebResult<Response> {
    let form = form.normalized();

    let update = match form.clean() {
        Ok(update) => update,
        Err(errors) => {
            let messages = vec![FlashMessage::new(Level::Error, "Please correct the errors below.")];
            let page = ProfileTemplate::edit(messages, &user, form, errors);
            return Ok(render(&page)?.into_response());
        }
    };

    let updated = state
        .users
        .update_profile(user.id, update)
        .await?
        .ok_or_else(|| WebError::NotFound("Account not found.".to_string()))?;

    info!(user_id = %updated.id, "Profile updated");

    flash::push(&session, Level::Success, "Your profile has been updated.").await?;
    Ok(Redirect::to("/profile").into_response())
}
