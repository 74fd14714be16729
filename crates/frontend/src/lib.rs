//! docchat chat front end: per-page sessions and batch-ingestion status.
//!
//! Logs users in against the auth backend, binds each open page to its
//! session, forwards batch uploads, and drives the status polling machine from
//! `docchat_core`. The library is shared by the binary and the integration
//! tests.

pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod routes;
pub mod service;
pub mod session;
pub mod state;
pub mod token;
