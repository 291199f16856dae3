// src/types/mod.rs
pub mod applicant;
pub mod interview;
pub mod job;

pub use applicant::{Applicant, ApplicantListing, ApplicantStatus};
pub use interview::{Interview, InterviewDraft, InterviewNote, InterviewStatus};
pub use job::{CriteriaWeights, Job, JobDraft, JobListing, JobPatch, JobStatus, WorkSetup};
