// src/core/paths.rs
//! Document paths of the denormalized job layout.
//!
//! A job lives at `jobs/{id}` (canonical) and, for a tenant, duplicated at
//! `universities/{tenant}/jobs/{id}`. Applicants and interviews nest below
//! whichever copy they were written under.

pub const JOBS: &str = "jobs";
pub const UNIVERSITIES: &str = "universities";
pub const USERS: &str = "users";

pub fn jobs_collection(tenant: Option<&str>) -> String {
    match tenant {
        Some(tenant) => format!("{}/{}/{}", UNIVERSITIES, tenant, JOBS),
        None => JOBS.to_string(),
    }
}

pub fn job_doc(tenant: Option<&str>, job_id: &str) -> String {
    format!("{}/{}", jobs_collection(tenant), job_id)
}

pub fn applicants_collection(tenant: Option<&str>, job_id: &str) -> String {
    format!("{}/applicants", job_doc(tenant, job_id))
}

pub fn applicant_doc(tenant: Option<&str>, job_id: &str, applicant_id: &str) -> String {
    format!("{}/{}", applicants_collection(tenant, job_id), applicant_id)
}

pub fn interviews_collection(tenant: Option<&str>, job_id: &str, applicant_id: &str) -> String {
    format!("{}/interviews", applicant_doc(tenant, job_id, applicant_id))
}

pub fn user_doc(uid: &str) -> String {
    format!("{}/{}", USERS, uid)
}

/// The two places a job flag or lifecycle field has to be written to.
/// Writes are independent; agreement is restored by the next reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLocations {
    pub canonical: String,
    pub tenant: Option<String>,
}

impl JobLocations {
    pub fn new(job_id: &str, tenant: Option<&str>) -> Self {
        Self {
            canonical: job_doc(None, job_id),
            tenant: tenant.map(|t| job_doc(Some(t), job_id)),
        }
    }

    /// Canonical first, then the tenant duplicate
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.canonical.as_str()).chain(self.tenant.as_deref())
    }
}
