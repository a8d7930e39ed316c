/// Page templates
///
/// Every page extends `base.html`, which renders pending flash messages, so
/// every template carries a `messages` field

use aishop_shared::models::user::{Gender, User};
use askama::Template;
use axum::response::Html;

use crate::error::WebResult;
use crate::flash::FlashMessage;
use crate::forms::{self, FormErrors, ProfileForm, SignupForm};

/// Renders a template into an HTML response body
pub fn render<T: Template>(template: &T) -> WebResult<Html<String>> {
    Ok(Html(template.render()?))
}

/// Option in a `<select>`
#[derive(Debug, Clone, Copy)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

/// Gender choices, led by an empty "not selected" option
pub fn gender_choices() -> Vec<Choice> {
    let mut choices = vec![Choice {
        code: "",
        label: "Select",
    }];
    choices.extend(Gender::ALL.iter().map(|g| Choice {
        code: g.code(),
        label: g.label(),
    }));
    choices
}

/// Display-ready copy of a user record. Never includes the password hash
#[derive(Debug, Clone)]
pub struct UserView {
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub age: String,
    pub gender: String,
    pub trust_score: String,
    pub joined: String,
    pub last_login: String,
}

fn or_blank(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            email: user.email.clone(),
            name: or_blank(user.name.clone()),
            phone: or_blank(user.phone.clone()),
            age: or_blank(user.age.map(|a| a.to_string())),
            gender: or_blank(user.gender.map(|g| g.label().to_string())),
            trust_score: format!("{:.1}", user.trust_score),
            joined: user.created_at.format("%Y-%m-%d %H:%M").to_string(),
            last_login: or_blank(
                user.last_login_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            ),
        }
    }
}

/// Landing page for anonymous visitors
#[derive(Template)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub messages: Vec<FlashMessage>,
}

/// Signup form
#[derive(Template)]
#[template(path = "signup.html")]
pub struct SignupTemplate {
    pub messages: Vec<FlashMessage>,
    pub form: SignupForm,
    pub errors: FormErrors,
    pub gender_choices: Vec<Choice>,
}

impl SignupTemplate {
    pub fn new(messages: Vec<FlashMessage>, form: SignupForm, errors: FormErrors) -> Self {
        Self {
            messages,
            form,
            errors,
            gender_choices: gender_choices(),
        }
    }
}

/// Login form
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub messages: Vec<FlashMessage>,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
    /// Credentials did not match
    pub invalid_login: bool,
}

impl LoginTemplate {
    pub fn invalid_login_message(&self) -> &'static str {
        forms::INVALID_LOGIN
    }
}

/// Signed-in landing page
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub messages: Vec<FlashMessage>,
    pub user: UserView,
}

/// Profile page, read-only or with the edit form
#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub messages: Vec<FlashMessage>,
    pub user: UserView,
    pub editing: bool,
    pub form: ProfileForm,
    pub errors: FormErrors,
    pub gender_choices: Vec<Choice>,
}

impl ProfileTemplate {
    pub fn view(messages: Vec<FlashMessage>, user: &User) -> Self {
        Self {
            messages,
            user: UserView::from(user),
            editing: false,
            form: ProfileForm::default(),
            errors: FormErrors::new(),
            gender_choices: gender_choices(),
        }
    }

    pub fn edit(
        messages: Vec<FlashMessage>,
        user: &User,
        form: ProfileForm,
        errors: FormErrors,
    ) -> Self {
        Self {
            messages,
            user: UserView::from(user),
            editing: true,
            form,
            errors,
            gender_choices: gender_choices(),
        }
    }
}

/// Pre-fills the profile form from the stored record
pub fn profile_form_for(user: &User) -> ProfileForm {
    ProfileForm {
        name: user.name.clone().unwrap_or_default(),
        age: user.age.map(|a| a.to_string()).unwrap_or_default(),
        gender: user.gender.map(|g| g.code().to_string()).unwrap_or_default(),
        phone: user.phone.clone().unwrap_or_default(),
    }
}

/// Error page
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub messages: Vec<FlashMessage>,
    pub status: u16,
    pub message: String,
}
