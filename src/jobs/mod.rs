// src/jobs/mod.rs
//! Job and applicant synchronization: reads, flag reconciliation, caching,
//! the delete lifecycle and the shared state handed to consumers

pub mod cache;
pub mod context;
pub mod error;
pub mod interviews;
pub mod lifecycle;
pub mod reconcile;
pub mod repository;
pub mod service;
pub mod tenant;

pub use cache::JobCache;
pub use context::{JobContext, JobState};
pub use error::JobError;
pub use interviews::InterviewRepository;
pub use lifecycle::JobLifecycle;
pub use reconcile::ApplicantStatusAggregator;
pub use repository::JobRepository;
pub use service::{JobService, JobSettings};
pub use tenant::{Caller, TenantResolver};
