//! # taskgate shared library
//!
//! Domain types, authentication and storage used by the taskgate API server.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, bearer credentials, request authentication
//! - `models`: `User` and `Task` with their Postgres queries
//! - `store`: the `Storage` capability contract and its backends
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the taskgate shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
