//! # Auth Module
//!
//! This module handles all authentication-related functionality including:
//! - Google and Apple ID token sign-in
//! - Phone one-time-code sign-in
//! - Session token (access/refresh JWT) issuing and validation
//! - Bearer-token middleware and the AuthedUser extractor for protected routes

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod oidc;
pub mod otp;
pub mod routes;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_support;

pub use extractors::AuthedUser;
pub use routes::auth_routes;
