//! # TenantBoard Shared Library
//!
//! Types, persistence and auth primitives used by the TenantBoard API server.
//!
//! ## Module Organization
//!
//! - `models`: Tenant-scoped database models and queries
//! - `auth`: Password hashing, JWT, request auth context and role checks
//! - `db`: Connection pool and embedded migrations
//! - `quota`: Subscription limit enforcement
//! - `validation`: Input checks not covered by `validator` derives

pub mod auth;
pub mod db;
pub mod models;
pub mod quota;
pub mod validation;

/// Current version of the TenantBoard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
