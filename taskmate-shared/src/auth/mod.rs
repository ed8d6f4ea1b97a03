/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: session token creation and validation
/// - [`middleware`]: bearer-token middleware for Axum
/// - [`authorization`]: role checks against the store
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskmate_shared::auth::jwt::{create_token, validate_token, Claims};
/// use taskmate_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse")?;
/// assert!(verify_password("correct horse", &hash)?);
///
/// let secret = "a-signing-secret-of-at-least-32-bytes";
/// let token = create_token(&Claims::new("ada@example.com", Duration::hours(1)), secret)?;
/// assert_eq!(validate_token(&token, secret)?.email(), "ada@example.com");
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
