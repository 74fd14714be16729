//! Domain types shared by the docchat auth backend and front end.
//!
//! - [`claims`] -- the access-token claim payload.
//! - [`error`] -- the domain error taxonomy mapped to HTTP by both servers.
//! - [`job_status`] -- batch-ingestion job status snapshots.
//! - [`polling`] -- the batch-status polling state machine.

pub mod claims;
pub mod error;
pub mod job_status;
pub mod polling;
