/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login
/// - `users`: Registration and user lookup
/// - `tasks`: Task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
pub mod users;
