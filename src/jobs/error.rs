// src/jobs/error.rs
use std::fmt;

/// Lookups that found nothing. Carried inside `anyhow::Error` so callers can
/// tell a missing record apart from a failed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    JobNotFound(String),
    ApplicantNotFound(String),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::JobNotFound(job_id) => write!(f, "Job not found: {job_id}"),
            Self::ApplicantNotFound(path) => write!(f, "Applicant not found: {path}"),
        }
    }
}

impl std::error::Error for JobError {}

impl JobError {
    /// The `JobError` anywhere in the chain of `err`, if there is one
    pub fn find(err: &anyhow::Error) -> Option<&JobError> {
        err.chain().find_map(|cause| cause.downcast_ref::<JobError>())
    }
}
