/// Database layer for taskgate
///
/// - `pool`: PostgreSQL connection pool with health checks
/// - `migrations`: embedded schema migrations
///
/// Models and their queries are in [`crate::models`]; callers outside this
/// crate should go through [`crate::store::Storage`].

pub mod migrations;
pub mod pool;
