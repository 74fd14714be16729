//! docchat authentication backend.
//!
//! Issues signed access tokens against a file-backed credential store and
//! exposes the login, user-creation and logout endpoints the chat front end
//! talks to. The library is shared by the binary and the integration tests.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod state;
pub mod store;
