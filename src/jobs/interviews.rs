// src/jobs/interviews.rs
use anyhow::{Context, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use crate::core::{paths, Clock, DocumentStore, Fields};
use crate::jobs::error::JobError;
use crate::types::{Applicant, ApplicantStatus, Interview, InterviewDraft};

/// Interviews under `universities/{t}/jobs/{j}/applicants/{a}/interviews`
#[derive(Clone)]
pub struct InterviewRepository {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl InterviewRepository {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Interviews of one applicant, earliest first
    pub async fn list(&self, tenant: &str, job_id: &str, applicant_id: &str) -> Result<Vec<Interview>> {
        let collection = paths::interviews_collection(Some(tenant), job_id, applicant_id);
        let docs = self
            .store
            .list(&collection)
            .await
            .with_context(|| format!("Failed to fetch interviews from {}", collection))?;

        let mut interviews = docs
            .iter()
            .map(Interview::from_document)
            .collect::<Result<Vec<_>>>()?;
        interviews.sort_by(|a, b| a.scheduled_at.cmp(&b.scheduled_at));
        Ok(interviews)
    }

    /// Book an interview. A Pending applicant moves to Interviewing, which
    /// clears the job's new-applicant flag on the next fetch.
    pub async fn schedule(
        &self,
        tenant: &str,
        job_id: &str,
        applicant_id: &str,
        draft: InterviewDraft,
    ) -> Result<Interview> {
        draft.validate()?;

        let applicant_path = paths::applicant_doc(Some(tenant), job_id, applicant_id);
        let applicant = self
            .store
            .get(&applicant_path)
            .await?
            .ok_or_else(|| JobError::ApplicantNotFound(applicant_path.clone()))?;
        let applicant = Applicant::from_document(&applicant)?;

        let interview = draft.into_interview(uuid::Uuid::new_v4().to_string(), self.clock.now());
        let interview_path = format!(
            "{}/{}",
            paths::interviews_collection(Some(tenant), job_id, applicant_id),
            interview.id
        );
        self.store
            .set(&interview_path, interview.to_fields()?)
            .await
            .context("Failed to save interview")?;

        if applicant.status == ApplicantStatus::Pending {
            let mut patch = Fields::new();
            patch.insert("status".to_string(), Value::from("Interviewing"));
            self.store
                .update(&applicant_path, patch)
                .await
                .context("Failed to mark applicant as interviewing")?;
        }

        info!(
            "Scheduled interview {} for applicant {} on job {}",
            interview.id, applicant_id, job_id
        );
        Ok(interview)
    }
}
