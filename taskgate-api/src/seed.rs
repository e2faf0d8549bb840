/// Demo data seeding
///
/// Creates a single demo user at startup so a fresh deployment has an
/// account to log in with. Seeding is idempotent: an existing account with
/// the same email is left untouched, including its password.

use taskgate_shared::{
    auth::password::PasswordHasher,
    models::user::{NewUser, User},
    store::{StoreError, Storage},
};
use tracing::info;

use crate::{error::ApiError, routes::auth::normalize_email};

/// Outcome of [`seed_demo_user`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The user was inserted
    Created(User),

    /// A user with this email already existed
    AlreadyPresent(User),
}

impl SeedOutcome {
    /// The seeded or pre-existing user
    pub fn user(&self) -> &User {
        match self {
            SeedOutcome::Created(user) | SeedOutcome::AlreadyPresent(user) => user,
        }
    }
}

/// Ensures a demo user with `email` exists
///
/// # Errors
///
/// Returns an error if hashing fails or the store is unavailable.
pub async fn seed_demo_user(
    store: &dyn Storage,
    hasher: &PasswordHasher,
    email: &str,
    password: &str,
) -> Result<SeedOutcome, ApiError> {
    let email = normalize_email(email);

    if let Some(existing) = store.find_user_by_email(&email).await? {
        info!(user_id = existing.id, "Demo user already present");
        return Ok(SeedOutcome::AlreadyPresent(existing));
    }

    let hasher = hasher.clone();
    let password = password.to_string();
    let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password)).await??;

    let new_user = NewUser {
        first_name: "Demo".to_string(),
        last_name: "User".to_string(),
        email: email.clone(),
        password_hash,
    };

    match store.create_user(new_user).await {
        Ok(user) => {
            info!(user_id = user.id, "Demo user created");
            Ok(SeedOutcome::Created(user))
        }
        // Another instance seeded between the lookup and the insert.
        Err(StoreError::Conflict(_)) => store
            .find_user_by_email(&email)
            .await?
            .map(SeedOutcome::AlreadyPresent)
            .ok_or_else(|| ApiError::InternalError("Demo user vanished after conflict".to_string())),
        Err(e) => Err(e.into()),
    }
}
