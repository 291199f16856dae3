// src/types/applicant.rs
use anyhow::Result;
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::store::Document;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicantStatus {
    Pending,
    Interviewing,
    #[serde(alias = "Hired")]
    Approved,
    Failed,
    /// Missing or unrecognized status
    #[default]
    #[serde(other)]
    Unknown,
}

impl ApplicantStatus {
    pub fn is_pending(self) -> bool {
        self == ApplicantStatus::Pending
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, alias = "resume")]
    pub resume_url: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: ApplicantStatus,
}

impl Applicant {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut applicant: Applicant = doc.decode()?;
        applicant.id = doc.id.clone();
        Ok(applicant)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantListing {
    pub id: String,
    #[serde(flatten)]
    pub applicant: Applicant,
    pub applied_label: String,
}

/// True when at least one applicant still awaits review
pub fn has_pending(applicants: &[Applicant]) -> bool {
    applicants.iter().any(|a| a.status.is_pending())
}
