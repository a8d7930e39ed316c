/// Signup, login and logout
///
/// # Endpoints
///
/// - `GET  /signup` - Signup form
/// - `POST /signup` - Create an account, then redirect to `/login`
/// - `GET  /login`  - Login form (accepts `?next=`)
/// - `POST /login`  - Start an authenticated session
/// - `GET  /logout` - End the session, then redirect to `/login`
///
/// Invalid submissions re-render the form with HTTP 200 and field errors.

use crate::{
    app::AppState,
    error::WebResult,
    flash::{self, Level},
    forms::{self, FormErrors, LoginForm, SignupForm},
    middleware::auth::MaybeUser,
    templates::{render, LoginTemplate, SignupTemplate},
};
use aishop_shared::{
    auth::{password, session},
    store::StoreError,
};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, warn};

/// Where a signed-in visitor lands by default
pub const DASHBOARD_PATH: &str = "/dashboard";

/// `?next=` on the login page
#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    #[serde(default)]
    pub next: Option<String>,
}

/// Keeps `next` only when it points back into this site
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| forms::is_safe_next(n))
}

fn signup_form_page(form: SignupForm, errors: FormErrors) -> WebResult<Response> {
    // Passwords are never echoed back
    let form = SignupForm {
        password1: String::new(),
        password2: String::new(),
        ..form
    };
    Ok(render(&SignupTemplate::new(Vec::new(), form, errors))?.into_response())
}

/// Signup form
pub async fn signup_page(MaybeUser(user): MaybeUser, session: Session) -> WebResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let messages = flash::take(&session).await?;
    let page = SignupTemplate::new(messages, SignupForm::default(), FormErrors::new());
    Ok(render(&page)?.into_response())
}

/// Creates an account
///
/// The username pre-check gives the usual field error; a concurrent signup
/// that wins the race is caught by the store's unique constraint and
/// reported the same way.
pub async fn signup(
    MaybeUser(user): MaybeUser,
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> WebResult<Response> {
    if user.is_some() {
        return Ok(Redirect::to(DASHBOARD_PATH).into_response());
    }

    let form = form.normalized();
    let cleaned = form.clean();

    let username_taken = !form.username.is_empty()
        && state.users.find_by_username(&form.username).await?.is_some();

    let cleaned = match cleaned {
        Ok(cleaned) if !username_taken => cleaned,
        Ok(_) => {
            let mut errors = FormErrors::new();
            errors.add("username", forms::USERNAME_TAKEN);
            return signup_form_page(form, errors);
        }
        Err(mut errors) => {
            if username_taken && !errors.has("username") {
                errors.add("username", forms::USERNAME_TAKEN);
            }
            return signup_form_page(form, errors);
        }
    };

    let plaintext = cleaned.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&plaintext)).await??;

    let user = match state.users.create(cleaned.into_create_user(password_hash)).await {
        Ok(user) => user,
        Err(StoreError::UsernameTaken(username)) => {
            warn!(username = %username, "Signup lost a race for the username");
            let mut errors = FormErrors::new();
            errors.add("username", forms::USERNAME_TAKEN);
            return signup_form_page(form, errors);
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, username = %user.username, "User signed up");

    flash::push(
        &session,
        Level::Success,
        format!("Account created for {}. You can now log in.", user.username),
    )
    .await?;

    Ok(Redirect::to("/login").into_response())
}

/// Login form
pub async fn login_page(
    MaybeUser(user): MaybeUser,
    session: Session,
    Query(query): Query<NextQuery>,
) -> WebResult<Response> {
    let next = safe_next(query.next.as_deref());

    if user.is_some() {
        return Ok(Redirect::to(next.unwrap_or(DASHBOARD_PATH)).into_response());
    }

    let page = LoginTemplate {
        messages: flash::take(&session).await?,
        username: String::new(),
        next: next.unwrap_or_default().to_string(),
        errors: FormErrors::new(),
        invalid_login: false,
    };
    Ok(render(&page)?.into_response())
}

/// Authenticates and starts a session
///
/// Unknown usernames, wrong passwords and inactive accounts all produce
/// the same response. A dummy hash is verified for unknown usernames so
/// the response time does not reveal whether the account exists.
pub async fn login(
    session: Session,
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let next = safe_next(form.next.as_deref()).map(str::to_string);

    let (username, plaintext) = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let page = LoginTemplate {
                messages: Vec::new(),
                username: form.username.trim().to_string(),
                next: next.unwrap_or_default(),
                errors,
                invalid_login: false,
            };
            return Ok(render(&page)?.into_response());
        }
    };

    let candidate = state.users.find_by_username(&username).await?;

    let authenticated = match candidate {
        Some(user) => {
            let hash = user.password_hash.clone();
            let matches =
                tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash)).await??;
            (matches && user.is_active).then_some(user)
        }
        None => {
            tokio::task::spawn_blocking(move || password::verify_dummy(&plaintext)).await?;
            None
        }
    };

    let Some(user) = authenticated else {
        warn!(username = %username, "Failed login attempt");
        let page = LoginTemplate {
            messages: Vec::new(),
            username,
            next: next.unwrap_or_default(),
            errors: FormErrors::new(),
            invalid_login: true,
        };
        return Ok(render(&page)?.into_response());
    };

    session::log_in(&session, user.id).await?;
    state.users.record_login(user.id).await?;

    info!(user_id = %user.id, username = %user.username, "User logged in");

    flash::push(
        &session,
        Level::Success,
        format!("Welcome back, {}.", user.display_name()),
    )
    .await?;

    let target = next.unwrap_or_else(|| DASHBOARD_PATH.to_string());
    Ok(Redirect::to(&target).into_response())
}

/// Ends the session
pub async fn logout(session: Session) -> WebResult<Response> {
    if let Some(user_id) = session::current_user_id(&session).await? {
        info!(user_id = %user_id, "User logged out");
    }

    session::log_out(&session).await?;
    flash::push(&session, Level::Info, "You have been logged out.").await?;

    Ok(Redirect::to("/login").into_response())
}
