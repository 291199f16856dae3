// src/jobs/repository.rs
//! Reads job postings and their applicants, derives display labels and keeps
//! the `newApplicants` flag in step with the applicant subcollection.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::{paths, Clock, DocumentStore};
use crate::jobs::reconcile::ApplicantStatusAggregator;
use crate::types::{Applicant, ApplicantListing, Job, JobListing};
use crate::utils::optional_days_ago_label;

pub struct JobRepository {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
    aggregator: ApplicantStatusAggregator,
}

impl JobRepository {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            aggregator: ApplicantStatusAggregator::new(Arc::clone(&store)),
            store,
            clock,
        }
    }

    /// All active jobs in scope, newest first, each with its applicants.
    /// Any read failure aborts the whole fetch.
    pub async fn fetch_jobs(&self, tenant: Option<&str>) -> Result<Vec<JobListing>> {
        let collection = paths::jobs_collection(tenant);
        let docs = self
            .store
            .list(&collection)
            .await
            .with_context(|| format!("Failed to fetch jobs from {}", collection))?;

        let now = self.clock.now();
        let mut listings = Vec::with_capacity(docs.len());

        // One job at a time: its reconciliation finishes before the next read.
        for doc in &docs {
            let job = Job::from_document(doc)?;
            if job.is_deleted {
                debug!("Skipping trashed job {}", job.id);
                continue;
            }
            listings.push(self.enrich(job, tenant, now).await?);
        }

        listings.sort_by(|a, b| b.job.date_posted.cmp(&a.job.date_posted));

        info!(
            "Fetched {} active jobs from {} ({} trashed skipped)",
            listings.len(),
            collection,
            docs.len() - listings.len()
        );
        Ok(listings)
    }

    pub async fn find_job(&self, tenant: Option<&str>, job_id: &str) -> Result<Option<Job>> {
        let path = paths::job_doc(tenant, job_id);
        self.store
            .get(&path)
            .await
            .with_context(|| format!("Failed to read job {}", path))?
            .map(|doc| Job::from_document(&doc))
            .transpose()
    }

    /// Applicants of a job, read from the tenant copy when the job belongs
    /// to the caller's tenant and from the canonical copy otherwise
    pub async fn fetch_applicants(&self, job: &Job, tenant: Option<&str>) -> Result<Vec<Applicant>> {
        let scope = applicant_scope(job, tenant);
        let collection = paths::applicants_collection(scope, &job.id);

        let docs = self
            .store
            .list(&collection)
            .await
            .with_context(|| format!("Failed to fetch applicants from {}", collection))?;

        docs.iter().map(Applicant::from_document).collect()
    }

    async fn enrich(
        &self,
        mut job: Job,
        tenant: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<JobListing> {
        let applicants = self.fetch_applicants(&job, tenant).await?;

        // Only a tenant-scoped read may touch the tenant copy.
        job.new_applicants = self
            .aggregator
            .reconcile(&job.id, &applicants, job.new_applicants, tenant)
            .await;

        let applicants = applicants
            .into_iter()
            .map(|applicant| ApplicantListing {
                id: applicant.id.clone(),
                applied_label: optional_days_ago_label(applicant.applied_at, now),
                applicant,
            })
            .collect();

        Ok(JobListing {
            id: job.id.clone(),
            posted_label: optional_days_ago_label(job.date_posted, now),
            job,
            applicants,
        })
    }
}

fn applicant_scope<'a>(job: &Job, tenant: Option<&'a str>) -> Option<&'a str> {
    tenant.filter(|t| job.university_id.as_deref() == Some(*t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ManualClock, MemoryStore};
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn job(university_id: Option<&str>) -> Job {
        serde_json::from_value(json!({"title": "T", "universityId": university_id})).unwrap()
    }

    #[test]
    fn test_applicant_scope_requires_tenant_match() {
        assert_eq!(applicant_scope(&job(Some("u1")), Some("u1")), Some("u1"));
        assert_eq!(applicant_scope(&job(Some("u2")), Some("u1")), None);
        assert_eq!(applicant_scope(&job(None), Some("u1")), None);
        assert_eq!(applicant_scope(&job(Some("u1")), None), None);
    }

    #[tokio::test]
    async fn test_fetch_labels_and_order() {
        let now = Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap();
        let store = Arc::new(MemoryStore::new());
        let older = (now - Duration::days(3)).timestamp_millis();
        let newer = (now - Duration::hours(30)).timestamp_millis();

        store
            .set("jobs/a", json!({"title": "Old", "datePosted": older}).as_object().cloned().unwrap())
            .await
            .unwrap();
        store
            .set("jobs/b", json!({"title": "New", "datePosted": newer}).as_object().cloned().unwrap())
            .await
            .unwrap();
        store
            .set("jobs/c", json!({"title": "Undated"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        store
            .set(
                "jobs/b/applicants/x",
                json!({"name": "Xi", "status": "Approved", "appliedAt": now.timestamp_millis()})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
            .await
            .unwrap();

        let repo = JobRepository::new(store, Arc::new(ManualClock::new(now)));
        let listings = repo.fetch_jobs(None).await.unwrap();

        let titles: Vec<_> = listings.iter().map(|l| l.job.title.as_str()).collect();
        assert_eq!(titles, vec!["New", "Old", "Undated"]);
        assert_eq!(listings[0].posted_label, "1 day ago");
        assert_eq!(listings[1].posted_label, "3 days ago");
        assert_eq!(listings[2].posted_label, "Unknown");
        assert_eq!(listings[0].applicants[0].applied_label, "Today");
        assert_eq!(listings[0].applicants[0].id, "x");
    }
}
