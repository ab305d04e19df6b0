//! PostgreSQL plumbing
//!
//! - `pool`: connection pool creation and health checks
//! - `migrations`: embedded schema migrations
//!
//! Queries themselves live on the models; see [`crate::store::PgStore`].

pub mod migrations;
pub mod pool;
