/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskgate_api::{app::{build_router, AppState}, config::Config};
/// use taskgate_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), config)?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::{header, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    BoxError, Router,
};
use chrono::Duration;
use std::sync::Arc;
use taskgate_shared::{
    auth::{
        jwt::{TokenIssuer, TokenVerifier},
        middleware::AuthGate,
        password::{PasswordError, PasswordHasher},
    },
    store::Storage,
};
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is either an `Arc` or cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Storage gateway
    pub store: Arc<dyn Storage>,

    /// Signs credentials at login
    pub issuer: TokenIssuer,

    /// Authenticates protected requests
    pub auth: AuthGate,

    /// Password hashing with the configured work factor
    pub hasher: PasswordHasher,

    /// Secret verified when a login names an unknown email, so both
    /// failure paths cost one Argon2 verification
    pub decoy_secret: Arc<str>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state over `store`
    ///
    /// # Errors
    ///
    /// Fails if the configured password work factor is rejected.
    pub fn new(store: Arc<dyn Storage>, config: Config) -> Result<Self, PasswordError> {
        let hasher = PasswordHasher::new(config.password)?;
        let work = hasher.params();
        tracing::info!(
            memory_kib = work.memory_kib,
            iterations = work.iterations,
            parallelism = work.parallelism,
            "Password hashing configured"
        );
        let decoy_secret = hasher.hash("taskgate-decoy-password")?;

        let issuer = TokenIssuer::new(&config.jwt.secret, Duration::seconds(config.jwt.ttl_seconds));
        let auth = AuthGate::new(TokenVerifier::new(&config.jwt.secret), Arc::clone(&store));

        Ok(Self {
            store,
            issuer,
            auth,
            hasher,
            decoy_secret: decoy_secret.into(),
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health               # Health check (public)
/// └── /v1/
///     ├── POST   /login         # Exchange email + password for a token (public)
///     ├── POST   /users         # Register (public)
///     ├── GET    /users         # List users (authenticated)
///     ├── GET    /users/:id     # Fetch user (authenticated)
///     ├── GET    /me            # Current user (authenticated)
///     ├── GET    /tasks         # List tasks (authenticated)
///     ├── POST   /tasks         # Create task (authenticated)
///     ├── GET    /tasks/:id     # Fetch task (authenticated)
///     └── DELETE /tasks/:id     # Delete task (authenticated)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. Request timeout (tower TimeoutLayer, 504 JSON body on expiry)
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (protected routes only, rejects before the handler runs)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_routes = Router::new()
        .route("/login", post(routes::auth::login))
        .route("/users", post(routes::users::create_user));

    let protected_routes = Router::new()
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", get(routes::users::get_user))
        .route("/me", get(routes::users::current_user))
        .route(
            "/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task).delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new().merge(public_routes).merge(protected_routes);

    let cors = if state.config.cors_permissive() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(state.config.api.cors_origins.clone())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    let timeout = std::time::Duration::from_secs(state.config.api.request_timeout_seconds);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(timeout)),
        )
        .with_state(state)
}

/// Renders errors raised by tower middleware as `ApiError` bodies
async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::InternalError(format!("Unhandled middleware error: {}", err))
    }
}

/// JWT authentication middleware layer
///
/// Resolves the bearer token to a user and injects `AuthContext` into
/// request extensions. Every credential failure yields the same 401.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = state.auth.authenticate(req.headers()).await?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
