//! # Taskboard Shared Library
//!
//! This crate contains the domain types and data access used by both the
//! Taskboard API server and the client library.
//!
//! ## Module Organization
//!
//! - `models`: Projects, tasks, the task status state machine and status counts
//! - `analytics`: Per-user task status aggregation
//! - `store`: Document store trait with PostgreSQL and in-memory backends
//! - `db`: PostgreSQL pool and migrations
//! - `auth`: Bearer token verification and request auth context

pub mod analytics;
pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
