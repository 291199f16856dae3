// src/jobs/context.rs
//! Shared job state handed to consumers. Consumers read or subscribe; only
//! the fetch path inside this crate publishes into it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use crate::types::JobListing;

#[derive(Debug, Clone, Default)]
pub struct JobState {
    pub jobs: Arc<Vec<JobListing>>,
    /// Message of the last failed fetch; the previous list stays visible
    pub error: Option<String>,
    pub loading: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct JobContext {
    tenant: Option<String>,
    state: watch::Sender<JobState>,
}

impl JobContext {
    pub fn new(tenant: Option<&str>) -> Self {
        let (state, _) = watch::channel(JobState::default());
        Self {
            tenant: tenant.map(str::to_string),
            state,
        }
    }

    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    pub fn snapshot(&self) -> JobState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    pub(crate) fn begin_load(&self) {
        self.state.send_modify(|s| s.loading = true);
    }

    pub(crate) fn publish(&self, jobs: Arc<Vec<JobListing>>, at: DateTime<Utc>) {
        self.state.send_modify(|s| {
            s.jobs = jobs;
            s.error = None;
            s.loading = false;
            s.updated_at = Some(at);
        });
    }

    pub(crate) fn fail(&self, message: String) {
        self.state.send_modify(|s| {
            s.error = Some(message);
            s.loading = false;
        });
    }
}
