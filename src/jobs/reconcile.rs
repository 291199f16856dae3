// src/jobs/reconcile.rs
//! Keeps the stored `newApplicants` flag equal to "some applicant is Pending".

use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::{DocumentStore, Fields, JobLocations};
use crate::types::applicant::{has_pending, Applicant};

pub const NEW_APPLICANTS_FIELD: &str = "newApplicants";

#[derive(Clone)]
pub struct ApplicantStatusAggregator {
    store: Arc<dyn DocumentStore>,
}

impl ApplicantStatusAggregator {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Returns the flag derived from `applicants`. When it differs from
    /// `current`, the canonical document and (with a tenant) its duplicate
    /// are corrected with two independent writes. A failed write is logged
    /// and left for the next pass; the derived value is returned regardless.
    pub async fn reconcile(
        &self,
        job_id: &str,
        applicants: &[Applicant],
        current: bool,
        tenant: Option<&str>,
    ) -> bool {
        let actual = has_pending(applicants);
        if actual == current {
            return actual;
        }

        info!(
            "Reconciling job {}: newApplicants {} -> {}",
            job_id, current, actual
        );

        let locations = JobLocations::new(job_id, tenant);
        for path in locations.paths() {
            let mut patch = Fields::new();
            patch.insert(NEW_APPLICANTS_FIELD.to_string(), Value::Bool(actual));

            if let Err(e) = self.store.update(path, patch).await {
                warn!("Failed to write newApplicants at {}: {:#}", path, e);
            }
        }

        actual
    }
}
