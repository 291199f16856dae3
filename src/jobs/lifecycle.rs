// src/jobs/lifecycle.rs
//! Job mutations: create, edit (which also restores a trashed job), soft
//! delete with a purge date, cascading hard delete and the purge sweep.
//!
//! Active -> (soft delete) -> Trashed -> (update) -> Active
//! Trashed -> (grace elapsed + sweep) -> Purged

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::core::config_manager::DEFAULT_PURGE_GRACE_DAYS;
use crate::core::{paths, Clock, DocumentStore, Fields, Filter};
use crate::jobs::error::JobError;
use crate::types::{Job, JobDraft, JobPatch};

/// Every stored copy of one job, canonical first
struct JobCopies {
    copies: Vec<(String, Job)>,
}

impl JobCopies {
    fn paths(&self) -> impl Iterator<Item = &str> {
        self.copies.iter().map(|(path, _)| path.as_str())
    }

    fn all_trashed(&self) -> bool {
        self.copies.iter().all(|(_, job)| job.is_deleted)
    }

    fn any_trashed(&self) -> bool {
        self.copies.iter().any(|(_, job)| job.is_deleted)
    }
}

#[derive(Clone)]
pub struct JobLifecycle {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    grace: Duration,
}

impl JobLifecycle {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, grace: Duration) -> Self {
        Self { store, clock, grace }
    }

    pub fn with_default_grace(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self::new(store, clock, Duration::days(DEFAULT_PURGE_GRACE_DAYS))
    }

    /// Write a new posting to the canonical collection and the tenant copy
    pub async fn create(&self, tenant: Option<&str>, draft: JobDraft) -> Result<Job> {
        draft.validate()?;

        let id = uuid::Uuid::new_v4().to_string();
        let job = draft.into_job(id, tenant, self.clock.now());
        let fields = job.to_fields()?;

        self.store
            .set(&paths::job_doc(None, &job.id), fields.clone())
            .await
            .context("Failed to create job")?;
        if let Some(tenant) = tenant {
            self.store
                .set(&paths::job_doc(Some(tenant), &job.id), fields)
                .await
                .context("Failed to create tenant copy of job")?;
        }

        info!("Created job {} ({}) for tenant {:?}", job.id, job.title, tenant);
        Ok(job)
    }

    /// Move a job to the trash; it is purged once the grace period elapses.
    /// Trashing an already trashed job changes nothing.
    pub async fn soft_delete(&self, job_id: &str, tenant: Option<&str>) -> Result<()> {
        let located = self.locate(job_id, tenant).await?;
        if located.all_trashed() {
            debug!("Job {} is already in the trash", job_id);
            return Ok(());
        }

        let now = self.clock.now();
        let purge_at = now + self.grace;

        let mut patch = Fields::new();
        patch.insert("isDeleted".to_string(), Value::Bool(true));
        patch.insert("deletedAt".to_string(), millis(now));
        patch.insert("scheduledForDeletion".to_string(), millis(purge_at));

        self.write_all(&located, patch).await?;
        info!("Job {} moved to trash, purge scheduled for {}", job_id, purge_at);
        Ok(())
    }

    /// Merge `patch` into every copy of the job. Editing a trashed job
    /// restores it.
    pub async fn update(&self, job_id: &str, tenant: Option<&str>, patch: &JobPatch) -> Result<()> {
        patch.validate()?;
        let located = self.locate(job_id, tenant).await?;

        let mut fields = patch.to_fields()?;
        if located.any_trashed() {
            fields.insert("isDeleted".to_string(), Value::Bool(false));
            fields.insert("deletedAt".to_string(), Value::Null);
            fields.insert("scheduledForDeletion".to_string(), Value::Null);
            info!("Restoring job {} from trash", job_id);
        }
        fields.insert("lastUpdated".to_string(), millis(self.clock.now()));

        self.write_all(&located, fields).await?;
        debug!("Updated job {}", job_id);
        Ok(())
    }

    /// Delete interviews, then applicants, then the job documents. A failure
    /// part way through stops the cascade; what was deleted stays deleted.
    pub async fn hard_delete(&self, job_id: &str, tenant: Option<&str>) -> Result<()> {
        let located = self.locate(job_id, tenant).await?;
        let mut applicants_removed = 0;
        let mut interviews_removed = 0;

        for job_path in located.paths() {
            let applicants = self
                .store
                .list(&format!("{}/applicants", job_path))
                .await
                .with_context(|| format!("Failed to list applicants of {}", job_path))?;

            for applicant in applicants {
                let interviews = self
                    .store
                    .list(&format!("{}/interviews", applicant.path))
                    .await
                    .with_context(|| format!("Failed to list interviews of {}", applicant.path))?;

                for interview in interviews {
                    self.store.delete(&interview.path).await?;
                    interviews_removed += 1;
                }
                self.store.delete(&applicant.path).await?;
                applicants_removed += 1;
            }
        }

        for job_path in located.paths() {
            self.store.delete(job_path).await?;
        }

        info!(
            "Purged job {} with {} applicants and {} interviews",
            job_id, applicants_removed, interviews_removed
        );
        Ok(())
    }

    /// Hard-delete every trashed job whose purge date has passed. Deletions
    /// run concurrently; returns how many succeeded.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let expired = self
            .store
            .query(
                paths::JOBS,
                &[
                    Filter::eq("isDeleted", true),
                    Filter::lte("scheduledForDeletion", now.timestamp_millis()),
                ],
            )
            .await
            .context("Failed to query expired jobs")?;

        if expired.is_empty() {
            debug!("No expired jobs to purge");
            return Ok(0);
        }

        let mut tasks = JoinSet::new();
        for doc in expired {
            let lifecycle = self.clone();
            let tenant = doc.str_field("universityId").map(str::to_string);
            tasks.spawn(async move {
                let result = lifecycle.hard_delete(&doc.id, tenant.as_deref()).await;
                (doc.id, result)
            });
        }

        let mut deleted = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(()))) => deleted += 1,
                Ok((job_id, Err(e))) => warn!("Failed to purge job {}: {:#}", job_id, e),
                Err(e) => error!("Purge task aborted: {}", e),
            }
        }

        info!("Cleanup sweep purged {} expired jobs", deleted);
        Ok(deleted)
    }

    async fn locate(&self, job_id: &str, tenant: Option<&str>) -> Result<JobCopies> {
        let mut candidates = vec![paths::job_doc(None, job_id)];
        if let Some(tenant) = tenant {
            candidates.push(paths::job_doc(Some(tenant), job_id));
        }

        let mut copies: Vec<(String, Job)> = Vec::new();
        let mut index = 0;
        while index < candidates.len() {
            let path = candidates[index].clone();
            index += 1;

            let Some(doc) = self
                .store
                .get(&path)
                .await
                .with_context(|| format!("Failed to read job {}", path))?
            else {
                continue;
            };
            let job = Job::from_document(&doc)?;

            // The job names its own tenant; follow it to the duplicate.
            if let Some(owner) = job.university_id.as_deref() {
                let duplicate = paths::job_doc(Some(owner), job_id);
                if !candidates.contains(&duplicate) {
                    candidates.push(duplicate);
                }
            }
            copies.push((path, job));
        }

        if copies.is_empty() {
            return Err(JobError::JobNotFound(job_id.to_string()).into());
        }
        Ok(JobCopies { copies })
    }

    async fn write_all(&self, located: &JobCopies, patch: Fields) -> Result<()> {
        for path in located.paths() {
            self.store
                .update(path, patch.clone())
                .await
                .with_context(|| format!("Failed to update {}", path))?;
        }
        Ok(())
    }
}

fn millis(at: DateTime<Utc>) -> Value {
    Value::from(at.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManualClock, MemoryStore};
    use crate::types::{CriteriaWeights, JobStatus, WorkSetup};

    fn draft(title: &str) -> JobDraft {
        JobDraft {
            title: title.to_string(),
            department: "Science".to_string(),
            summary: String::new(),
            key_duties: vec![],
            essential_skills: vec![],
            qualifications: vec![],
            salary: "50000".to_string(),
            work_setup: WorkSetup::Remote,
            available_slots: 1,
            criteria_weights: CriteriaWeights::default(),
        }
    }

    #[tokio::test]
    async fn test_create_writes_both_copies() {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let lifecycle = JobLifecycle::with_default_grace(store.clone(), clock);

        let job = lifecycle.create(Some("u1"), draft("Chemist")).await.unwrap();
        assert_eq!(job.status, JobStatus::Open);

        let canonical = store.get(&paths::job_doc(None, &job.id)).await.unwrap().unwrap();
        let duplicate = store
            .get(&paths::job_doc(Some("u1"), &job.id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(canonical.data, duplicate.data);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_weights() {
        let store = Arc::new(MemoryStore::new());
        let lifecycle =
            JobLifecycle::with_default_grace(store.clone(), Arc::new(ManualClock::new(Utc::now())));

        let mut bad = draft("Chemist");
        bad.criteria_weights = CriteriaWeights {
            experience: 40,
            skills: 30,
            education: 20,
        };
        assert!(lifecycle.create(Some("u1"), bad).await.is_err());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unknown_job_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        let lifecycle =
            JobLifecycle::with_default_grace(store, Arc::new(ManualClock::new(Utc::now())));

        let err = lifecycle.soft_delete("nope", None).await.unwrap_err();
        assert_eq!(
            JobError::find(&err),
            Some(&JobError::JobNotFound("nope".to_string()))
        );
        assert!(lifecycle.hard_delete("nope", None).await.is_err());
        assert!(lifecycle
            .update("nope", None, &JobPatch::default())
            .await
            .is_err());
    }
}
