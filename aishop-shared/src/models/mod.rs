/// Database models
///
/// # Models
///
/// - `user`: User accounts and authentication data
///
/// Only user accounts are persisted by this service.

pub mod user;
