// src/jobs/cache.rs
//! Last successful job fetch per tenant scope, served while fresh.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::config_manager::DEFAULT_CACHE_TTL_SECS;
use crate::core::Clock;
use crate::jobs::repository::JobRepository;
use crate::types::JobListing;

type ScopeKey = Option<String>;

#[derive(Debug, Clone)]
struct CacheEntry {
    jobs: Arc<Vec<JobListing>>,
    fetched_at: DateTime<Utc>,
}

/// One scope's entry behind its own lock
type Slot = Arc<Mutex<Option<CacheEntry>>>;

pub struct JobCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    slots: std::sync::Mutex<HashMap<ScopeKey, Slot>>,
}

impl JobCache {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl: Duration::from_std(ttl)
                .unwrap_or_else(|_| Duration::seconds(DEFAULT_CACHE_TTL_SECS as i64)),
            clock,
            slots: std::sync::Mutex::new(HashMap::new()),
        }
    }

    fn slot(&self, key: &ScopeKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Cached jobs for `tenant` if younger than the freshness window,
    /// otherwise a fresh fetch that replaces the entry. A forced call drops
    /// the entry before fetching, so a failed forced fetch leaves it empty.
    ///
    /// The scope's lock is held across the fetch: concurrent callers for the
    /// same scope wait for the in-flight fetch instead of starting their own.
    /// Other scopes are unaffected.
    pub async fn get(
        &self,
        repository: &JobRepository,
        tenant: Option<&str>,
        force_refresh: bool,
    ) -> Result<Arc<Vec<JobListing>>> {
        let key: ScopeKey = tenant.map(str::to_string);
        let slot = self.slot(&key);
        let mut entry = slot.lock().await;

        if force_refresh {
            *entry = None;
        } else if let Some(cached) = entry.as_ref() {
            let age = self.clock.now() - cached.fetched_at;
            if age < self.ttl {
                debug!(
                    "Job cache hit for {:?} (age {} ms)",
                    key,
                    age.num_milliseconds()
                );
                return Ok(Arc::clone(&cached.jobs));
            }
            debug!("Job cache entry for {:?} is stale", key);
        }

        let jobs = Arc::new(repository.fetch_jobs(tenant).await?);
        *entry = Some(CacheEntry {
            jobs: Arc::clone(&jobs),
            fetched_at: self.clock.now(),
        });
        Ok(jobs)
    }

    /// Waits for an in-flight fetch of the scope, then drops its entry
    pub async fn invalidate(&self, tenant: Option<&str>) {
        let slot = self.slot(&tenant.map(str::to_string));
        *slot.lock().await = None;
    }

    pub async fn clear(&self) {
        let slots: Vec<Slot> = {
            let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            slots.values().cloned().collect()
        };
        for slot in slots {
            *slot.lock().await = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DocumentStore, ManualClock, MemoryStore};
    use serde_json::json;

    async fn setup() -> (JobCache, JobRepository, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        store
            .set("jobs/j1", json!({"title": "Porter"}).as_object().cloned().unwrap())
            .await
            .unwrap();
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let cache = JobCache::new(std::time::Duration::from_secs(10), clock.clone());
        let repo = JobRepository::new(store.clone(), clock.clone());
        (cache, repo, store, clock)
    }

    #[tokio::test]
    async fn test_stale_entry_is_refetched() {
        let (cache, repo, store, clock) = setup().await;

        let first = cache.get(&repo, None, false).await.unwrap();
        store
            .set("jobs/j2", json!({"title": "Cook"}).as_object().cloned().unwrap())
            .await
            .unwrap();

        clock.advance(Duration::seconds(9));
        let cached = cache.get(&repo, None, false).await.unwrap();
        assert!(Arc::ptr_eq(&first, &cached));
        assert_eq!(cached.len(), 1);

        clock.advance(Duration::seconds(1));
        let refreshed = cache.get(&repo, None, false).await.unwrap();
        assert_eq!(refreshed.len(), 2);
    }

    #[tokio::test]
    async fn test_invalidate_only_drops_one_scope() {
        let (cache, repo, _store, _clock) = setup().await;

        let global = cache.get(&repo, None, false).await.unwrap();
        let scoped = cache.get(&repo, Some("u1"), false).await.unwrap();
        assert!(scoped.is_empty());

        cache.invalidate(Some("u1")).await;
        assert!(Arc::ptr_eq(&global, &cache.get(&repo, None, false).await.unwrap()));
        assert!(!Arc::ptr_eq(&scoped, &cache.get(&repo, Some("u1"), false).await.unwrap()));

        cache.clear().await;
        assert!(!Arc::ptr_eq(&global, &cache.get(&repo, None, false).await.unwrap()));
    }
}
