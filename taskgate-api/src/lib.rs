//! # Taskgate API Server Library
//!
//! This library provides the core functionality for the Taskgate API server:
//! credential issuance at login, bearer-token authentication on protected
//! routes, and user and task resources over a pluggable store.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Request extractors (validated JSON, record IDs)
//! - `routes`: API route handlers
//! - `seed`: Demo data seeding

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod seed;
