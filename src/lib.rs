// src/lib.rs
//! HR job board backend: job postings, applicants and interviews kept in a
//! document store, with a cached, self-reconciling read path and a
//! soft-delete lifecycle.

use anyhow::Result;
use std::sync::Arc;
use tracing::info;

pub mod cli;
pub mod core;
pub mod jobs;
pub mod types;
pub mod utils;
pub mod web;

use crate::core::{ConfigManager, DocumentStore, MemoryStore, SqliteStore, SystemClock};
use crate::jobs::{JobService, JobSettings};

pub use web::start_web_server;

/// Store selected by configuration
pub async fn open_store(config: &ConfigManager) -> Result<Arc<dyn DocumentStore>> {
    if config.uses_memory_store() {
        info!("Using in-memory document store; data is lost on exit");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqliteStore::open(&config.environment.database_path).await?;
    store.health_check().await?;
    Ok(Arc::new(store))
}

pub async fn build_service(config: &ConfigManager) -> Result<JobService> {
    let store = open_store(config).await?;
    Ok(JobService::new(
        store,
        Arc::new(SystemClock),
        JobSettings::from_config(config),
    ))
}
