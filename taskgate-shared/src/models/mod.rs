/// Database models for taskgate
///
/// Each model carries its own Postgres queries. Request handlers do not call
/// these directly; they go through [`crate::store::Storage`], whose Postgres
/// implementation delegates here.
///
/// # Models
///
/// - `user`: registered accounts and their password secrets
/// - `task`: global task records

pub mod task;
pub mod user;
