/// Route handlers
///
/// - `pages`: home, dashboard and the 404 fallback
/// - `auth`: signup, login, logout
/// - `profile`: profile view and edit
/// - `health`: health check endpoint

pub mod auth;
pub mod health;
pub mod pages;
pub mod profile;
