//! # TenantBoard API Server Library
//!
//! Multi-tenant project and task tracking over a JSON REST API. Every
//! resource belongs to one tenant, and every query is scoped to the tenant of
//! the authenticated session.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Startup configuration, validated once
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that reject with the error envelope
//! - `middleware`: Authentication and security headers
//! - `response`: Success envelope
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod response;
pub mod routes;
