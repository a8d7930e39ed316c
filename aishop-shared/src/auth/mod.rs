/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and strength validation
/// - [`session`]: Reading and writing the login state of a session
///
/// # Example
///
/// ```no_run
/// use aishop_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;
