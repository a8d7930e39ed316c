/// Middleware and extractors for the web server
///
/// - `auth`: session-to-user extractors and the login gate
/// - `security`: security response headers

pub mod auth;
pub mod security;
