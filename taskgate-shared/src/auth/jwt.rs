/// Bearer credential issuance and verification
///
/// Credentials are JWTs signed with HS256 (HMAC-SHA256) under a single
/// process-wide secret. The claim set asserts the email that logged in, the
/// issuer, and the issue/expiry timestamps:
///
/// ```json
/// { "email": "alice@example.com", "iss": "taskgate", "iat": 1700000000, "exp": 1700003600 }
/// ```
///
/// # Security
///
/// - **Algorithm**: HS256 only. The header is inspected first and any other
///   declared algorithm is rejected before the MAC is computed.
/// - **Expiration**: `exp = iat + ttl`; a token is expired once `now >= exp`.
///   There is no leeway.
/// - **Secret Management**: at least 32 bytes, loaded once at startup and
///   never printed (see [`SigningSecret`]).
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskgate_shared::auth::jwt::{SigningSecret, TokenIssuer, TokenVerifier};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = SigningSecret::new("an-example-secret-that-is-32-bytes!!")?;
/// let issuer = TokenIssuer::new(&secret, Duration::hours(1));
/// let verifier = TokenVerifier::new(&secret);
///
/// let issued = issuer.issue_for("alice@example.com")?;
/// let claims = verifier.verify(&issued.token)?;
/// assert_eq!(claims.email, "alice@example.com");
/// # Ok(())
/// # }
/// ```

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey,
    Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::models::user::User;

/// Value of the `iss` claim on every credential this service mints.
pub const ISSUER: &str = "taskgate";

/// Minimum signing secret length in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for credential operations
///
/// Callers at the HTTP boundary collapse every variant into a single
/// "not authenticated" response; the distinction exists for logging.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// Not a JWT, undecodable segments, or missing/invalid claims
    #[error("Malformed token")]
    Malformed,

    /// MAC does not match the payload under our secret
    #[error("Token signature is invalid")]
    BadSignature,

    /// `now >= exp`
    #[error("Token has expired")]
    Expired,

    /// Header declares something other than HS256
    #[error("Token algorithm is not HS256")]
    AlgorithmMismatch,

    /// The signing secret does not meet the length requirement
    #[error("Signing secret must be at least 32 bytes")]
    WeakSecret,

    /// Encoding the token failed
    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Shared HMAC secret
///
/// `Debug` is redacted so the secret cannot leak through logs or panics.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Wraps a secret after checking its length.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::WeakSecret` if shorter than [`MIN_SECRET_LEN`] bytes.
    pub fn new(secret: impl Into<String>) -> Result<Self, TokenError> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret);
        }
        Ok(Self(secret.into_bytes()))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret([REDACTED])")
    }
}

/// Claim set carried by a credential
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Email the credential was issued to
    pub email: String,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Returns true if the credential is expired at `now` (Unix seconds).
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Expiration as a UTC timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

/// A freshly signed credential
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact JWT
    pub token: String,
    /// When the credential stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Signs credentials for authenticated users
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer for `secret` whose credentials live for `ttl`.
    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a credential asserting `user`'s email.
    ///
    /// Only call this after the user's password has been verified.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if encoding fails.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_for(&user.email)
    }

    /// Issues a credential for `email`, valid from now.
    pub fn issue_for(&self, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(email, Utc::now())
    }

    /// Issues a credential for `email` as if signed at `issued_at`.
    pub fn issue_at(
        &self,
        email: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = issued_at.timestamp();
        let exp = iat
            .checked_add(self.ttl.num_seconds())
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;
        let claims = Claims {
            email: email.to_string(),
            iss: ISSUER.to_string(),
            iat,
            exp,
        };
        let expires_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::Signing("expiry out of range".to_string()))?;

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Signing(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish_non_exhaustive()
    }
}

/// Verifies presented credentials
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Creates a verifier for `secret`.
    pub fn new(secret: &SigningSecret) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        // Expiry is checked against an explicit clock in verify_at.
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verifies `token` against the current time.
    ///
    /// # Errors
    ///
    /// See [`TokenVerifier::verify_at`].
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verifies `token` as of `now` (Unix seconds).
    ///
    /// Claims are only returned once the signature has been checked.
    ///
    /// # Errors
    ///
    /// - `TokenError::AlgorithmMismatch` if the header declares anything but HS256
    /// - `TokenError::BadSignature` if the MAC does not verify
    /// - `TokenError::Expired` if `now >= exp`
    /// - `TokenError::Malformed` for anything structurally wrong, including
    ///   headers naming an algorithm the JWT library does not know (e.g. `none`)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(TokenError::AlgorithmMismatch);
        }

        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    TokenError::AlgorithmMismatch
                }
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }
}

impl fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-that-is-at-least-32-bytes";
    const OTHER_SECRET: &str = "another-secret-key-that-is-at-least-32-bytes";
    const TTL_SECS: i64 = 3600;

    fn pair(secret: &str) -> (TokenIssuer, TokenVerifier) {
        let secret = SigningSecret::new(secret).expect("secret is long enough");
        (
            TokenIssuer::new(&secret, Duration::seconds(TTL_SECS)),
            TokenVerifier::new(&secret),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).single().expect("valid timestamp")
    }

    #[test]
    fn test_short_secret_rejected() {
        assert_eq!(
            SigningSecret::new("too-short").unwrap_err(),
            TokenError::WeakSecret
        );
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = SigningSecret::new(SECRET).unwrap();
        let printed = format!("{:?}", secret);

        assert!(!printed.contains(SECRET));
        assert!(printed.contains("REDACTED"));
    }

    #[test]
    fn test_issue_and_verify() {
        let (issuer, verifier) = pair(SECRET);
        let issued = issuer.issue_for("alice@example.com").expect("issue");

        let claims = verifier.verify(&issued.token).expect("verify");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, TTL_SECS);
        assert_eq!(claims.expires_at(), Some(issued.expires_at));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let secret = SigningSecret::new(SECRET).unwrap();
        let issuer = TokenIssuer::new(&secret, Duration::seconds(9_000_000_000_000));

        assert!(matches!(
            issuer.issue_for("alice@example.com"),
            Err(TokenError::Signing(_))
        ));
    }

    #[test]
    fn test_expiry_boundary() {
        let (issuer, verifier) = pair(SECRET);
        let issued = issuer.issue_at("alice@example.com", t0()).expect("issue");
        let start = t0().timestamp();

        assert!(verifier.verify_at(&issued.token, start).is_ok());
        assert!(verifier.verify_at(&issued.token, start + TTL_SECS - 1).is_ok());
        assert_eq!(
            verifier.verify_at(&issued.token, start + TTL_SECS),
            Err(TokenError::Expired)
        );
        assert_eq!(
            verifier.verify_at(&issued.token, start + TTL_SECS + 1),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_old_token_rejected_by_wall_clock() {
        let (issuer, verifier) = pair(SECRET);
        let issued = issuer.issue_at("alice@example.com", t0()).expect("issue");

        assert_eq!(verifier.verify(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (issuer, _) = pair(SECRET);
        let (_, other_verifier) = pair(OTHER_SECRET);
        let issued = issuer.issue_for("alice@example.com").expect("issue");

        assert_eq!(
            other_verifier.verify(&issued.token),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_hs512_rejected_as_algorithm_mismatch() {
        let (_, verifier) = pair(SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "alice@example.com".to_string(),
            iss: ISSUER.to_string(),
            iat: now,
            exp: now + TTL_SECS,
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("encode");

        assert_eq!(verifier.verify(&token), Err(TokenError::AlgorithmMismatch));
    }

    #[test]
    fn test_alg_none_rejected() {
        let (_, verifier) = pair(SECRET);
        // {"alg":"none","typ":"JWT"} . {"email":"alice@example.com","iss":"taskgate",...}
        let token = "eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.\
                     eyJlbWFpbCI6ImFsaWNlQGV4YW1wbGUuY29tIiwiaXNzIjoidGFza2dhdGUiLCJpYXQiOjE3MDAwMDAwMDAsImV4cCI6NDEwMjQ0NDgwMH0.";

        let result = verifier.verify(token);
        assert!(
            matches!(
                result,
                Err(TokenError::Malformed) | Err(TokenError::AlgorithmMismatch)
            ),
            "unexpected result: {:?}",
            result
        );
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let (issuer, verifier) = pair(SECRET);
        let issued = issuer.issue_for("mallory@example.com").expect("issue");
        let parts: Vec<&str> = issued.token.split('.').collect();
        assert_eq!(parts.len(), 3);

        // Same header and signature, payload swapped for alice's.
        let forged = format!(
            "{}.{}.{}",
            parts[0],
            "eyJlbWFpbCI6ImFsaWNlQGV4YW1wbGUuY29tIiwiaXNzIjoidGFza2dhdGUiLCJpYXQiOjE3MDAwMDAwMDAsImV4cCI6NDEwMjQ0NDgwMH0",
            parts[2]
        );

        assert_eq!(verifier.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let (_, verifier) = pair(SECRET);

        for token in ["", "not-a-jwt", "a.b.c", "...."] {
            assert_eq!(
                verifier.verify(token),
                Err(TokenError::Malformed),
                "token {:?}",
                token
            );
        }
    }

    #[test]
    fn test_foreign_issuer_is_malformed() {
        let (_, verifier) = pair(SECRET);
        let now = Utc::now().timestamp();
        let claims = Claims {
            email: "alice@example.com".to_string(),
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + TTL_SECS,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("encode");

        assert_eq!(verifier.verify(&token), Err(TokenError::Malformed));
    }
}
