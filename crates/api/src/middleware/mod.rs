//! Bearer-token extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a bearer token.
//! - [`rbac::RequireAdmin`] -- Additionally requires the admin claim.

pub mod auth;
pub mod rbac;
