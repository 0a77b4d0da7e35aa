/// Middleware modules for the API server
///
/// - [`auth`]: Bearer token authentication producing the request's `AuthContext`
/// - [`security`]: Security response headers

pub mod auth;
pub mod security;
