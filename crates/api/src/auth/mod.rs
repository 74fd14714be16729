//! Authentication primitives.
//!
//! - [`jwt`] -- the token codec: signed access-token issuance and validation.
//! - [`password`] -- Argon2id password hashing and verification.

pub mod jwt;
pub mod password;
