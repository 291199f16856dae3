// src/jobs/service.rs
//! Facade wiring repository, cache, lifecycle and the shared contexts.
//! Every mutation is followed by a forced refresh of the caller's scope.

use anyhow::Result;
use chrono::Duration;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

use crate::core::config_manager::{DEFAULT_CACHE_TTL_SECS, DEFAULT_PURGE_GRACE_DAYS};
use crate::core::{Clock, ConfigManager, DocumentStore};
use crate::jobs::cache::JobCache;
use crate::jobs::context::JobContext;
use crate::jobs::interviews::InterviewRepository;
use crate::jobs::lifecycle::JobLifecycle;
use crate::jobs::repository::JobRepository;
use crate::jobs::tenant::{Caller, TenantResolver};
use crate::types::{Interview, InterviewDraft, Job, JobDraft, JobListing, JobPatch};

#[derive(Debug, Clone)]
pub struct JobSettings {
    pub cache_ttl: std::time::Duration,
    pub purge_grace: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            cache_ttl: std::time::Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            purge_grace: Duration::days(DEFAULT_PURGE_GRACE_DAYS),
        }
    }
}

impl JobSettings {
    pub fn from_config(config: &ConfigManager) -> Self {
        Self {
            cache_ttl: config.cache_ttl(),
            purge_grace: Duration::days(config.environment.purge_grace_days),
        }
    }
}

#[derive(Clone)]
pub struct JobService {
    repository: Arc<JobRepository>,
    cache: Arc<JobCache>,
    lifecycle: JobLifecycle,
    interviews: InterviewRepository,
    tenants: TenantResolver,
    contexts: Arc<Mutex<HashMap<Option<String>, Arc<JobContext>>>>,
    clock: Arc<dyn Clock>,
}

impl JobService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, settings: JobSettings) -> Self {
        Self {
            repository: Arc::new(JobRepository::new(Arc::clone(&store), Arc::clone(&clock))),
            cache: Arc::new(JobCache::new(settings.cache_ttl, Arc::clone(&clock))),
            lifecycle: JobLifecycle::new(
                Arc::clone(&store),
                Arc::clone(&clock),
                settings.purge_grace,
            ),
            interviews: InterviewRepository::new(Arc::clone(&store), Arc::clone(&clock)),
            tenants: TenantResolver::new(store),
            contexts: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    pub fn repository(&self) -> &JobRepository {
        &self.repository
    }

    pub fn lifecycle(&self) -> &JobLifecycle {
        &self.lifecycle
    }

    pub fn interviews(&self) -> &InterviewRepository {
        &self.interviews
    }

    /// Shared state handle for one tenant scope, created on first use
    pub fn context(&self, tenant: Option<&str>) -> Arc<JobContext> {
        let mut contexts = self.contexts.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(
            contexts
                .entry(tenant.map(str::to_string))
                .or_insert_with(|| Arc::new(JobContext::new(tenant))),
        )
    }

    pub async fn resolve_tenant(&self, caller: &Caller) -> Result<Option<String>> {
        self.tenants.resolve(caller).await
    }

    /// Jobs for a scope through the cache; the scope's context is updated
    /// with the result or the error.
    pub async fn jobs(&self, tenant: Option<&str>, force_refresh: bool) -> Result<Arc<Vec<JobListing>>> {
        let context = self.context(tenant);
        context.begin_load();

        match self.cache.get(&self.repository, tenant, force_refresh).await {
            Ok(jobs) => {
                context.publish(Arc::clone(&jobs), self.clock.now());
                Ok(jobs)
            }
            Err(e) => {
                error!("Failed to fetch jobs for {:?}: {:#}", tenant, e);
                context.fail(format!("{:#}", e));
                Err(e)
            }
        }
    }

    pub async fn create_job(&self, tenant: Option<&str>, draft: JobDraft) -> Result<Job> {
        let job = self.lifecycle.create(tenant, draft).await?;
        self.refresh_after_mutation(tenant).await;
        Ok(job)
    }

    pub async fn update_job(&self, tenant: Option<&str>, job_id: &str, patch: &JobPatch) -> Result<()> {
        self.lifecycle.update(job_id, tenant, patch).await?;
        self.refresh_after_mutation(tenant).await;
        Ok(())
    }

    /// An empty edit; clears the trash flags
    pub async fn restore_job(&self, tenant: Option<&str>, job_id: &str) -> Result<()> {
        self.update_job(tenant, job_id, &JobPatch::default()).await
    }

    pub async fn soft_delete_job(&self, tenant: Option<&str>, job_id: &str) -> Result<()> {
        self.lifecycle.soft_delete(job_id, tenant).await?;
        self.refresh_after_mutation(tenant).await;
        Ok(())
    }

    pub async fn cleanup_expired(&self) -> Result<usize> {
        let purged = self.lifecycle.cleanup_expired().await?;
        if purged > 0 {
            self.cache.clear().await;
        }
        Ok(purged)
    }

    pub async fn list_interviews(
        &self,
        tenant: &str,
        job_id: &str,
        applicant_id: &str,
    ) -> Result<Vec<Interview>> {
        self.interviews.list(tenant, job_id, applicant_id).await
    }

    pub async fn schedule_interview(
        &self,
        tenant: &str,
        job_id: &str,
        applicant_id: &str,
        draft: InterviewDraft,
    ) -> Result<Interview> {
        let interview = self
            .interviews
            .schedule(tenant, job_id, applicant_id, draft)
            .await?;
        self.refresh_after_mutation(Some(tenant)).await;
        Ok(interview)
    }

    /// The mutation already succeeded; a failed refresh only lands in the
    /// context's error state.
    async fn refresh_after_mutation(&self, tenant: Option<&str>) {
        if tenant.is_some() {
            // Canonical documents changed too.
            self.cache.invalidate(None).await;
        }
        if let Err(e) = self.jobs(tenant, true).await {
            warn!("Refresh after mutation failed for {:?}: {:#}", tenant, e);
        }
    }
}
