#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use hr_jobs::core::{Document, DocumentStore, Fields, Filter, ManualClock, MemoryStore};
use hr_jobs::jobs::{JobService, JobSettings};

/// Wraps a store, counting reads and optionally failing or holding calls
pub struct InstrumentedStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    queries: Mutex<HashMap<String, usize>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    deletes_left: Mutex<Option<usize>>,
    held_collection: Mutex<Option<String>>,
    held: AtomicUsize,
    gate: Semaphore,
}

impl InstrumentedStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            reads: AtomicUsize::new(0),
            queries: Mutex::new(HashMap::new()),
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            deletes_left: Mutex::new(None),
            held_collection: Mutex::new(None),
            held: AtomicUsize::new(0),
            gate: Semaphore::new(0),
        }
    }

    /// Number of queries issued against `collection`
    pub fn queries_of(&self, collection: &str) -> usize {
        self.queries
            .lock()
            .unwrap()
            .get(collection)
            .copied()
            .unwrap_or(0)
    }

    /// Allow `n` more deletes; every delete after that fails
    pub fn fail_deletes_after(&self, n: Option<usize>) {
        *self.deletes_left.lock().unwrap() = n;
    }

    /// Queries on `collection` wait until `release` is called
    pub fn hold_queries(&self, collection: &str) {
        *self.held_collection.lock().unwrap() = Some(collection.to_string());
    }

    /// Queries currently waiting on the hold
    pub fn held(&self) -> usize {
        self.held.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        *self.held_collection.lock().unwrap() = None;
        self.gate.add_permits(1024);
    }

    /// Yields until `n` queries are parked on the hold
    pub async fn wait_for_held(&self, n: usize) {
        while self.held() < n {
            tokio::task::yield_now().await;
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn read(&self) -> Result<()> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("store unavailable");
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            anyhow::bail!("write rejected");
        }
        Ok(())
    }
}

#[rocket::async_trait]
impl DocumentStore for InstrumentedStore {
    async fn get(&self, path: &str) -> Result<Option<Document>> {
        self.read()?;
        self.inner.get(path).await
    }

    async fn query(&self, collection: &str, filters: &[Filter]) -> Result<Vec<Document>> {
        self.read()?;
        *self
            .queries
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default() += 1;

        let is_held = self.held_collection.lock().unwrap().as_deref() == Some(collection);
        if is_held {
            self.held.fetch_add(1, Ordering::SeqCst);
            let permit = self.gate.acquire().await?;
            permit.forget();
            self.held.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.query(collection, filters).await
    }

    async fn set(&self, path: &str, data: Fields) -> Result<()> {
        self.write()?;
        self.inner.set(path, data).await
    }

    async fn update(&self, path: &str, patch: Fields) -> Result<()> {
        self.write()?;
        self.inner.update(path, patch).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.write()?;
        {
            let mut left = self.deletes_left.lock().unwrap();
            match left.as_mut() {
                Some(0) => anyhow::bail!("delete rejected: {}", path),
                Some(n) => *n -= 1,
                None => {}
            }
        }
        self.inner.delete(path).await
    }
}

pub struct Harness {
    pub store: Arc<InstrumentedStore>,
    pub clock: Arc<ManualClock>,
    pub service: JobService,
}

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap()
}

pub fn harness() -> Harness {
    let store = Arc::new(InstrumentedStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    let service = JobService::new(store.clone(), clock.clone(), JobSettings::default());
    Harness {
        store,
        clock,
        service,
    }
}

pub fn fields(value: Value) -> Fields {
    value.as_object().cloned().expect("fixture must be an object")
}

/// Seed a job in the canonical collection and, with a tenant, its duplicate
pub async fn seed_job(store: &InstrumentedStore, tenant: Option<&str>, job_id: &str, body: Value) {
    let mut data = fields(json!({
        "title": format!("Job {}", job_id),
        "availableSlots": 1,
        "status": "Open",
        "datePosted": t0().timestamp_millis(),
        "newApplicants": false,
        "universityId": tenant,
    }));
    data.extend(fields(body));

    store.set(&format!("jobs/{}", job_id), data.clone()).await.unwrap();
    if let Some(tenant) = tenant {
        store
            .set(&format!("universities/{}/jobs/{}", tenant, job_id), data)
            .await
            .unwrap();
    }
}

pub async fn seed_applicant(
    store: &InstrumentedStore,
    tenant: Option<&str>,
    job_id: &str,
    applicant_id: &str,
    status: &str,
) {
    let path = match tenant {
        Some(t) => format!("universities/{}/jobs/{}/applicants/{}", t, job_id, applicant_id),
        None => format!("jobs/{}/applicants/{}", job_id, applicant_id),
    };
    store
        .set(
            &path,
            fields(json!({
                "name": format!("Applicant {}", applicant_id),
                "email": format!("{}@example.edu", applicant_id),
                "status": status,
                "appliedAt": t0().timestamp_millis(),
            })),
        )
        .await
        .unwrap();
}

pub async fn field(store: &InstrumentedStore, path: &str, name: &str) -> Value {
    store
        .get(path)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("missing document {}", path))
        .data
        .get(name)
        .cloned()
        .unwrap_or(Value::Null)
}
