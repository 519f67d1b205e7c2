//! # Taskboard Shared Library
//!
//! Shared types and business logic used by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `models`: user and task records with their store queries
//! - `auth`: password hashing, token signing, access-control middleware
//! - `db`: connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;

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
