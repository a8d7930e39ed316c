/// Password hashing module using Argon2id
///
/// This module provides password hashing with the Argon2id algorithm and the
/// strength checks applied at signup.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use aishop_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("super_secret_password_123")?;
/// assert!(verify_password("super_secret_password_123", &hash)?);
/// assert!(!verify_password("wrong_password", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use std::sync::OnceLock;

/// Minimum accepted password length (in characters)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Passwords rejected outright regardless of length
const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "password123",
    "12345678",
    "123456789",
    "1234567890",
    "qwerty123",
    "qwertyuiop",
    "iloveyou",
    "sunshine",
    "princess",
    "football",
    "baseball",
    "welcome1",
    "admin123",
    "abc12345",
    "11111111",
    "00000000",
    "letmein1",
    "trustno1",
    "starwars",
    "dragon12",
    "passw0rd",
    "q1w2e3r4",
    "1q2w3e4r",
    "asdfghjk",
    "zaq12wsx",
    "superman",
    "whatever",
    "shopping",
];

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn argon2_instance() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a password using Argon2id
///
/// Returns a PHC string, e.g.
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2_instance()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored PHC hash
///
/// Returns `Ok(false)` on mismatch. Parameters are read from the hash itself.
///
/// # Errors
///
/// Returns an error if the hash cannot be parsed or verification fails for
/// a reason other than a mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // A PHC string without an output would otherwise verify as a mismatch
    if parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash("Hash has no output".to_string()));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Runs a full verification against a throwaway hash and discards the result
///
/// Used when the username is unknown so the response time matches a real
/// password check.
pub fn verify_dummy(password: &str) {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();

    let hash = DUMMY_HASH.get_or_init(|| hash_password("aishop-dummy-password").ok());
    if let Some(hash) = hash {
        let _ = verify_password(password, hash);
    }
}

/// Validates password strength for a new account
///
/// Collects every failed rule so they can all be shown next to the field:
/// - at least [`MIN_PASSWORD_LENGTH`] characters
/// - not entirely numeric
/// - not a common password
/// - not too similar to any of `user_attributes`
///
/// `user_attributes` pairs a label used in the message with the submitted
/// value, e.g. `("username", "minji")`. A password is too similar when it
/// contains the value or one of its words (as split on punctuation, so an
/// email's local part counts), or is contained in one. Only the first
/// similar attribute is reported.
///
/// # Example
///
/// ```
/// use aishop_shared::auth::password::validate_password;
///
/// assert!(validate_password("orchard-lantern-42", &[("username", "minji")]).is_ok());
/// assert!(validate_password("1234", &[("username", "minji")]).is_err());
/// assert!(validate_password("kimminji-99", &[("email address", "kimminji@example.com")]).is_err());
/// ```
pub fn validate_password(password: &str, user_attributes: &[(&str, &str)]) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push(format!(
            "This password is too short. It must contain at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    let lowered = password.to_lowercase();

    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        errors.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        errors.push("This password is entirely numeric.".to_string());
    }

    if let Some((label, _)) = user_attributes
        .iter()
        .find(|(_, value)| is_similar(&lowered, value))
    {
        errors.push(format!("The password is too similar to the {}.", label));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Whole values shorter than this are never compared
const MIN_SIMILAR_VALUE: usize = 3;

/// Words split out of a value shorter than this are ignored ("com", "kr")
const MIN_SIMILAR_WORD: usize = 4;

fn is_similar(lowered_password: &str, value: &str) -> bool {
    let value = value.trim().to_lowercase();
    if lowered_password.is_empty() {
        return false;
    }

    let whole = Some(value.as_str()).filter(|v| v.chars().count() >= MIN_SIMILAR_VALUE);
    let words = value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() >= MIN_SIMILAR_WORD);

    whole
        .into_iter()
        .chain(words)
        .any(|part| lowered_password.contains(part) || part.contains(lowered_password))
}
