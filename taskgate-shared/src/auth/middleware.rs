/// Request authentication gate
///
/// Turns the `Authorization` header of an incoming request into a resolved
/// [`User`], or refuses. The HTTP layer wraps [`AuthGate::authenticate`] in an
/// axum middleware and inserts the resulting [`AuthContext`] into request
/// extensions; handlers read it with `Extension<AuthContext>`.
///
/// # Steps
///
/// 1. Extract the bearer token (`Authorization: Bearer <token>`)
/// 2. Verify it with [`TokenVerifier`]
/// 3. Look up the user by the email claim through [`Storage`]
/// 4. Re-check that the stored email equals the claimed one
///
/// Any failure in steps 1 to 4 is a credential problem and the caller sees a
/// single "not authenticated" response. Only a storage outage is reported
/// differently ([`AuthError::Backend`]).
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::http::HeaderMap;
/// use taskgate_shared::auth::jwt::{SigningSecret, TokenVerifier};
/// use taskgate_shared::auth::middleware::AuthGate;
/// use taskgate_shared::store::MemoryStore;
///
/// # async fn example(headers: HeaderMap) -> Result<(), Box<dyn std::error::Error>> {
/// let secret = SigningSecret::new("an-example-secret-that-is-32-bytes!!")?;
/// let gate = AuthGate::new(TokenVerifier::new(&secret), Arc::new(MemoryStore::new()));
///
/// let ctx = gate.authenticate(&headers).await?;
/// println!("authenticated as {}", ctx.user.email);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use tracing::{debug, warn};

use super::jwt::{TokenError, TokenVerifier};
use crate::models::user::User;
use crate::store::Storage;

/// Identity attached to an authenticated request
///
/// Lives in request extensions for the duration of one request only.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The user the credential resolved to
    pub user: User,
}

impl AuthContext {
    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Header present but not `Bearer <token>`
    #[error("Authorization header is not a bearer token")]
    InvalidFormat,

    /// Token failed verification
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] TokenError),

    /// Token verified but names no known user
    #[error("Token subject does not exist")]
    UnknownIdentity,

    /// Stored user's email differs from the claim
    #[error("Token subject does not match stored identity")]
    IdentityMismatch,

    /// Storage failed while resolving the user
    #[error("Storage error during authentication: {0}")]
    Backend(String),
}

impl AuthError {
    /// True for every variant that means "bad or missing credential".
    pub fn is_credential_failure(&self) -> bool {
        !matches!(self, AuthError::Backend(_))
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// Returns `Ok(None)` when the header is absent and `Err(InvalidFormat)` when
/// it is present but not a non-empty bearer token.
pub fn extract_bearer(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;
    let token = value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidFormat)?;

    if token.is_empty() {
        return Err(AuthError::InvalidFormat);
    }

    Ok(Some(token))
}

/// Verifier plus storage, everything needed to authenticate a request
#[derive(Clone)]
pub struct AuthGate {
    verifier: TokenVerifier,
    store: Arc<dyn Storage>,
}

impl AuthGate {
    pub fn new(verifier: TokenVerifier, store: Arc<dyn Storage>) -> Self {
        Self { verifier, store }
    }

    /// Authenticates a request from its headers
    ///
    /// # Errors
    ///
    /// Returns the [`AuthError`] variant for whichever step failed. Failures
    /// are logged with their cause; tokens are never logged.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let token = match extract_bearer(headers) {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("Rejected request without authorization header");
                return Err(AuthError::MissingCredentials);
            }
            Err(e) => {
                debug!("Rejected malformed authorization header");
                return Err(e);
            }
        };

        let claims = self.verifier.verify(token).map_err(|e| {
            match e {
                TokenError::BadSignature | TokenError::AlgorithmMismatch => {
                    warn!(reason = %e, "Rejected forged or foreign token");
                }
                _ => {
                    debug!(reason = %e, "Rejected token");
                }
            }
            AuthError::InvalidToken(e)
        })?;

        let user = self
            .store
            .find_user_by_email(&claims.email)
            .await
            .map_err(|e| AuthError::Backend(e.to_string()))?
            .ok_or_else(|| {
                warn!(email = %claims.email, "Valid token for unknown user");
                AuthError::UnknownIdentity
            })?;

        if user.email != claims.email {
            warn!(
                user_id = user.id,
                "Stored email does not match token claim"
            );
            return Err(AuthError::IdentityMismatch);
        }

        debug!(user_id = user.id, "Request authenticated");
        Ok(AuthContext { user })
    }
}

impl std::fmt::Debug for AuthGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGate")
            .field("store", &self.store.backend_name())
            .finish_non_exhaustive()
    }
}
