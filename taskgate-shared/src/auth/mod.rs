/// Authentication primitives for taskgate
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing with a work-factor floor
/// - [`jwt`]: HS256 bearer credential issuance and verification
/// - [`middleware`]: request authentication gate (header to resolved user)
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use taskgate_shared::auth::jwt::{SigningSecret, TokenIssuer, TokenVerifier};
/// use taskgate_shared::auth::password::{HashParams, PasswordHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(HashParams::default())?;
/// let secret = hasher.hash("user_password")?;
/// assert!(hasher.verify(&secret, "user_password"));
///
/// let signing = SigningSecret::new(std::env::var("JWT_SECRET")?)?;
/// let issued = TokenIssuer::new(&signing, Duration::hours(1)).issue_for("user@example.com")?;
/// let claims = TokenVerifier::new(&signing).verify(&issued.token)?;
/// assert_eq!(claims.email, "user@example.com");
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
