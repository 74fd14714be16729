//! Status of asynchronous document-ingestion jobs.
//!
//! The backend reports one [`JobStatus`] per file of a batch. The set is
//! unordered on the backend side but always rendered in the order received.

use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state of a single ingestion job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Queued,
    Processing,
    Done,
    Failed,
    /// Any status string this client does not know about. Never active.
    Unknown,
}

impl JobState {
    /// Parse a backend status string (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "processing" => Self::Processing,
            "done" => Self::Done,
            "failed" => Self::Failed,
            _ => Self::Unknown,
        }
    }

    /// `true` for `queued` and `processing`.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Queued | Self::Processing)
    }
}

impl<'de> Deserialize<'de> for JobState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One row of a batch-status snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub filename: String,
    pub status: JobState,
}

impl JobStatus {
    pub fn new(filename: impl Into<String>, status: JobState) -> Self {
        Self {
            filename: filename.into(),
            status,
        }
    }
}

/// A snapshot is active when it is non-empty and at least one job is still
/// queued or processing.
pub fn has_active_jobs(snapshot: &[JobStatus]) -> bool {
    snapshot.iter().any(|job| job.status.is_active())
}
