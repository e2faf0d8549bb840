/// User endpoints
///
/// - `POST /v1/users` - Register (public)
/// - `GET /v1/users` - List users
/// - `GET /v1/users/:id` - Fetch one user
/// - `GET /v1/me` - The user the bearer token resolves to
///
/// Password secrets are never part of any response.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{RecordId, ValidatedJson},
    routes::auth::normalize_email,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use taskgate_shared::{
    auth::middleware::AuthContext,
    models::user::{NewUser, User},
    store::StoreError,
};
use tracing::info;
use validator::Validate;

/// Registration request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1 to 100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1 to 100 characters"))]
    pub last_name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/users
/// Content-Type: application/json
///
/// {
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "email": "ada@example.com",
///   "password": "analytical-engine"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with the stored user (no password field).
///
/// # Errors
///
/// - `409 Conflict`: Email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let hasher = state.hasher.clone();
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

    let user = state
        .store
        .create_user(NewUser {
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            email: normalize_email(&req.email),
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict("Email already registered".to_string()),
            other => other.into(),
        })?;

    info!(user_id = user.id, "User registered");
    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.store.list_users().await?))
}

/// Fetch a user by ID
///
/// # Errors
///
/// - `400 Bad Request`: ID is not a positive integer
/// - `404 Not Found`: No such user
pub async fn get_user(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<User>> {
    state
        .store
        .find_user_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
}

/// The authenticated user
pub async fn current_user(Extension(auth): Extension<AuthContext>) -> Json<User> {
    Json(auth.user)
}
