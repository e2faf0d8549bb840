/// Login endpoint
///
/// # Endpoints
///
/// - `POST /v1/login` - Exchange email and password for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidatedJson,
};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    /// Password
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Signed bearer token
    pub token: String,

    /// Always `Bearer`
    pub token_type: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Lowercases and trims an email for lookup and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Login endpoint
///
/// Verifies the password on the blocking pool and issues a token asserting
/// the user's email.
///
/// # Endpoint
///
/// ```text
/// POST /v1/login
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "correct horse battery staple"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "token_type": "Bearer",
///   "expires_at": "2025-01-01T01:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
/// - `422 Unprocessable Entity`: Empty email or password
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = normalize_email(&req.email);
    let user = state.store.find_user_by_email(&email).await?;

    // Unknown emails still pay for one verification.
    let secret = match &user {
        Some(user) => user.password_hash.clone(),
        None => state.decoy_secret.to_string(),
    };
    let hasher = state.hasher.clone();
    let password = req.password;
    let verified =
        tokio::task::spawn_blocking(move || hasher.verify(&secret, &password)).await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            warn!("Login failed");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let issued = state.issuer.issue(&user)?;
    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_at: issued.expires_at,
    }))
}
