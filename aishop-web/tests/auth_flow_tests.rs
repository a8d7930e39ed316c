/// End-to-end tests for signup, login, logout and the gated pages
///
/// Every test drives the real router through a `TestContext`, which keeps
/// the session cookie between requests like a browser would.

mod common;

use aishop_shared::store::UserStore;
use aishop_web::forms::{INVALID_LOGIN, USERNAME_TAKEN};
use axum::http::StatusCode;
use common::{TestContext, GOOD_PASSWORD};
use std::time::Duration;
use tower::Service as _;

#[tokio::test]
async fn test_signup_with_new_username_creates_one_user() {
    let mut ctx = TestContext::new();

    let response = ctx.signup("minji", GOOD_PASSWORD, GOOD_PASSWORD).await;
    assert_eq!(response.redirect_target(), "/login");

    assert_eq!(ctx.users.count().await.unwrap(), 1);

    let user = ctx.users.find_by_username("minji").await.unwrap().unwrap();
    assert_eq!(user.email, "minji@example.com");
    assert_eq!(user.phone.as_deref(), Some("010-1234-5678"));
    assert_eq!(user.trust_score, 3.0);
    assert!(user.is_active);
    assert!(user.password_hash.starts_with("$argon2id$"));
    assert_ne!(user.password_hash, GOOD_PASSWORD);
}

#[tokio::test]
async fn test_signup_success_message_shown_on_login_page() {
    let mut ctx = TestContext::new();

    ctx.signup("minji", GOOD_PASSWORD, GOOD_PASSWORD).await;
    let page = ctx.get("/login").await;

    assert_eq!(page.status, StatusCode::OK);
    assert!(page.body.contains("Account created for minji"));

    // Shown once only
    let again = ctx.get("/login").await;
    assert!(!again.body.contains("Account created for minji"));
}

#[tokio::test]
async fn test_signup_with_taken_username_creates_nothing() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx.signup("minji", GOOD_PASSWORD, GOOD_PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("A user with that username already exists."));
    assert_eq!(ctx.users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_signup_with_mismatched_passwords_creates_nothing() {
    let mut ctx = TestContext::new();

    let response = ctx.signup("minji", GOOD_PASSWORD, "mango-basket-43").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("two password fields didn"));
    assert!(!response.body.contains(GOOD_PASSWORD));
    assert_eq!(ctx.users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_with_missing_fields_shows_errors() {
    let mut ctx = TestContext::new();

    let response = ctx.post_form("/signup", &[("username", "minji")]).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
    // Submitted values are kept
    assert!(response.body.contains("value=\"minji\""));
    assert_eq!(ctx.users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_signup_with_weak_password_creates_nothing() {
    let mut ctx = TestContext::new();

    let response = ctx.signup("minji", "12345678", "12345678").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This password is entirely numeric."));
    assert_eq!(ctx.users.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_login_grants_dashboard_access() {
    let mut ctx = TestContext::new();
    let user = ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx.login("minji", GOOD_PASSWORD).await;
    assert_eq!(response.redirect_target(), "/dashboard");
    assert!(ctx.session_cookie().is_some());

    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.status, StatusCode::OK);
    assert!(dashboard.body.contains("minji@example.com"));
    assert!(dashboard.body.contains("Welcome back, minji."));
    assert!(!dashboard.body.contains(&user.password_hash));

    let stored = ctx.users.find_by_id(user.id).await.unwrap().unwrap();
    assert!(stored.last_login_at.is_some());
}

#[tokio::test]
async fn test_login_with_wrong_password_is_denied() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx.login("minji", "not-the-password").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(INVALID_LOGIN));

    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.redirect_target(), "/login?next=/dashboard");
}

#[tokio::test]
async fn test_login_error_identical_for_unknown_user_and_wrong_password() {
    let mut with_user = TestContext::new();
    with_user.create_user("minji", GOOD_PASSWORD).await;
    let wrong_password = with_user.login("minji", "not-the-password").await;

    let mut without_user = TestContext::new();
    let unknown_user = without_user.login("minji", "not-the-password").await;

    assert_eq!(wrong_password.status, unknown_user.status);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_login_with_blank_fields_shows_required() {
    let mut ctx = TestContext::new();

    let response = ctx.login("", "").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("This field is required."));
    assert!(!response.body.contains(INVALID_LOGIN));
}

#[tokio::test]
async fn test_inactive_user_cannot_log_in() {
    let mut ctx = TestContext::new();
    let user = ctx.create_user("minji", GOOD_PASSWORD).await;
    assert!(ctx.users.deactivate(user.id).await);

    let response = ctx.login("minji", GOOD_PASSWORD).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(INVALID_LOGIN));
}

#[tokio::test]
async fn test_deactivated_user_loses_active_session() {
    let mut ctx = TestContext::new();
    let user = ctx.create_user("minji", GOOD_PASSWORD).await;
    ctx.login("minji", GOOD_PASSWORD).await;
    assert_eq!(ctx.get("/dashboard").await.status, StatusCode::OK);

    ctx.users.deactivate(user.id).await;

    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.redirect_target(), "/login?next=/dashboard");
}

#[tokio::test]
async fn test_login_cycles_session_id() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    ctx.login("minji", GOOD_PASSWORD).await;
    ctx.get("/dashboard").await;
    let first = ctx.session_cookie().unwrap();

    ctx.login("minji", GOOD_PASSWORD).await;
    let second = ctx.session_cookie().unwrap();
    assert_ne!(first, second);

    // The pre-login id no longer identifies a session
    ctx.use_cookie(Some(first));
    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.redirect_target(), "/login?next=/dashboard");
}

#[tokio::test]
async fn test_login_redirects_to_safe_next() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx
        .post_form(
            "/login",
            &[("username", "minji"), ("password", GOOD_PASSWORD), ("next", "/profile")],
        )
        .await;

    assert_eq!(response.redirect_target(), "/profile");
}

#[tokio::test]
async fn test_login_ignores_offsite_next() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx
        .post_form(
            "/login",
            &[
                ("username", "minji"),
                ("password", GOOD_PASSWORD),
                ("next", "https://evil.example/steal"),
            ],
        )
        .await;

    assert_eq!(response.redirect_target(), "/dashboard");
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;
    ctx.login("minji", GOOD_PASSWORD).await;
    let logged_in_cookie = ctx.session_cookie();
    assert_eq!(ctx.get("/dashboard").await.status, StatusCode::OK);

    let response = ctx.get("/logout").await;
    assert_eq!(response.redirect_target(), "/login");

    let login_page = ctx.get("/login").await;
    assert!(login_page.body.contains("You have been logged out."));

    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.redirect_target(), "/login?next=/dashboard");

    // Replaying the old cookie does not restore the session
    ctx.use_cookie(logged_in_cookie);
    let replay = ctx.get("/dashboard").await;
    assert_eq!(replay.redirect_target(), "/login?next=/dashboard");
}

#[tokio::test]
async fn test_logout_when_anonymous_redirects_to_login() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/logout").await;
    assert_eq!(response.redirect_target(), "/login");
}

#[tokio::test]
async fn test_dashboard_without_login_never_renders_user_data() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;

    let response = ctx.get("/dashboard").await;

    assert_eq!(response.redirect_target(), "/login?next=/dashboard");
    assert!(!response.body.contains("minji"));
}

#[tokio::test]
async fn test_authenticated_visitor_skips_login_and_signup() {
    let mut ctx = TestContext::new();
    ctx.create_user("minji", GOOD_PASSWORD).await;
    ctx.login("minji", GOOD_PASSWORD).await;

    assert_eq!(ctx.get("/login").await.redirect_target(), "/dashboard");
    assert_eq!(ctx.get("/signup").await.redirect_target(), "/dashboard");
    assert_eq!(ctx.get("/").await.redirect_target(), "/dashboard");
}

#[tokio::test]
async fn test_anonymous_pages_render() {
    let mut ctx = TestContext::new();

    for uri in ["/", "/login", "/signup"] {
        let response = ctx.get(uri).await;
        assert_eq!(response.status, StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn test_profile_requires_login() {
    let mut ctx = TestContext::new();

    assert_eq!(ctx.get("/profile").await.redirect_target(), "/login?next=/profile");
    assert_eq!(
        ctx.get("/profile/update").await.redirect_target(),
        "/login?next=/profile/update"
    );
}

#[tokio::test]
async fn test_profile_update_saves_fields() {
    let mut ctx = TestContext::new();
    let user = ctx.create_user("minji", GOOD_PASSWORD).await;
    ctx.login("minji", GOOD_PASSWORD).await;

    let form = ctx.get("/profile/update").await;
    assert_eq!(form.status, StatusCode::OK);

    let response = ctx
        .post_form(
            "/profile/update",
            &[("name", "Kim Minji"), ("age", "29"), ("gender", "F"), ("phone", "")],
        )
        .await;
    assert_eq!(response.redirect_target(), "/profile");

    let stored = ctx.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.name.as_deref(), Some("Kim Minji"));
    assert_eq!(stored.age, Some(29));
    assert_eq!(stored.phone, None);

    let profile = ctx.get("/profile").await;
    assert!(profile.body.contains("Kim Minji"));
    assert!(profile.body.contains("Your profile has been updated."));
}

#[tokio::test]
async fn test_profile_update_with_invalid_age_changes_nothing() {
    let mut ctx = TestContext::new();
    let user = ctx.create_user("minji", GOOD_PASSWORD).await;
    ctx.login("minji", GOOD_PASSWORD).await;

    let response = ctx
        .post_form("/profile/update", &[("name", "Kim Minji"), ("age", "-3")])
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Please correct the errors below."));
    assert!(response.body.contains("Ensure this value is greater than or equal to 0."));

    let stored = ctx.users.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(stored.name, None);
    assert_eq!(stored.age, None);
}

#[tokio::test]
async fn test_health_check_reports_connected() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let mut ctx = TestContext::new();

    let response = ctx.get("/no-such-page").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body.contains("Error 404"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_signups_for_one_username_create_one_account() {
    let ctx = TestContext::new();

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let mut app = ctx.app.clone();
            tokio::spawn(async move {
                let request = common::signup_request("minji", GOOD_PASSWORD, GOOD_PASSWORD);
                common::read_response(app.call(request).await.unwrap()).await
            })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        let response = handle.await.unwrap();
        if response.status == StatusCode::SEE_OTHER {
            created += 1;
        } else {
            assert_eq!(response.status, StatusCode::OK);
            assert!(response.body.contains(USERNAME_TAKEN));
        }
    }

    assert_eq!(created, 1);
    assert_eq!(ctx.users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_session_expires_after_inactivity() {
    let mut config = common::test_config();
    config.session.expiry_seconds = 1;
    let mut ctx = TestContext::with_config(config);
    ctx.create_user("minji", GOOD_PASSWORD).await;

    ctx.login("minji", GOOD_PASSWORD).await;
    assert_eq!(ctx.get("/dashboard").await.status, StatusCode::OK);

    tokio::time::sleep(Duration::from_secs(2)).await;

    let dashboard = ctx.get("/dashboard").await;
    assert_eq!(dashboard.redirect_target(), "/login?next=/dashboard");
}
