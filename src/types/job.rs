// src/types/job.rs
//! Job postings as stored in the document store

use anyhow::Result;
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::store::{to_fields, Document, Fields};
use crate::types::applicant::ApplicantListing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkSetup {
    #[default]
    #[serde(rename = "On Site", alias = "On-Site", alias = "Onsite")]
    OnSite,
    Remote,
    Hybrid,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[default]
    Open,
    Closed,
}

/// Screening weights in percent; the three must add up to 100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriteriaWeights {
    pub experience: u32,
    pub skills: u32,
    pub education: u32,
}

impl Default for CriteriaWeights {
    fn default() -> Self {
        Self {
            experience: 40,
            skills: 40,
            education: 20,
        }
    }
}

impl CriteriaWeights {
    /// `None` when the sum does not fit in a `u32`
    pub fn total(&self) -> Option<u32> {
        self.experience
            .checked_add(self.skills)?
            .checked_add(self.education)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total() != Some(100) {
            anyhow::bail!(
                "Criteria weights must total 100% (experience {} + skills {} + education {})",
                self.experience,
                self.skills,
                self.education
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub key_duties: Vec<String>,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub essential_skills: Vec<String>,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub qualifications: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub salary: String,
    #[serde(default)]
    pub work_setup: WorkSetup,
    #[serde(default)]
    pub available_slots: u32,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub university_id: Option<String>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub date_posted: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default, with = "ts_milliseconds_option")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(default, with = "ts_milliseconds_option")]
    pub scheduled_for_deletion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub new_applicants: bool,
    #[serde(default)]
    pub criteria_weights: CriteriaWeights,
    #[serde(default, with = "ts_milliseconds_option")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Job {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut job: Job = doc.decode()?;
        job.id = doc.id.clone();
        Ok(job)
    }

    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }
}

/// A job as handed to consumers: display labels resolved, applicants attached
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: String,
    #[serde(flatten)]
    pub job: Job,
    pub posted_label: String,
    pub applicants: Vec<ApplicantListing>,
}

/// Input for a new posting
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobDraft {
    pub title: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub key_duties: Vec<String>,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub essential_skills: Vec<String>,
    #[serde(default, deserialize_with = "lines_or_list")]
    pub qualifications: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub salary: String,
    #[serde(default)]
    pub work_setup: WorkSetup,
    pub available_slots: u32,
    #[serde(default)]
    pub criteria_weights: CriteriaWeights,
}

impl JobDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            anyhow::bail!("Job title is required");
        }
        if self.available_slots == 0 {
            anyhow::bail!("A job needs at least one available slot");
        }
        self.criteria_weights.validate()
    }

    pub fn into_job(self, id: String, tenant: Option<&str>, now: DateTime<Utc>) -> Job {
        Job {
            id,
            title: self.title.trim().to_string(),
            department: self.department,
            summary: self.summary,
            key_duties: self.key_duties,
            essential_skills: self.essential_skills,
            qualifications: self.qualifications,
            salary: self.salary,
            work_setup: self.work_setup,
            available_slots: self.available_slots,
            status: JobStatus::Open,
            university_id: tenant.map(str::to_string),
            date_posted: Some(now),
            is_deleted: false,
            deleted_at: None,
            scheduled_for_deletion: None,
            new_applicants: false,
            criteria_weights: self.criteria_weights,
            last_updated: Some(now),
        }
    }
}

/// Partial edit of a posting; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(
        default,
        deserialize_with = "opt_lines_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_duties: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "opt_lines_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub essential_skills: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "opt_lines_or_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub qualifications: Option<Vec<String>>,
    #[serde(
        default,
        deserialize_with = "opt_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_setup: Option<WorkSetup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criteria_weights: Option<CriteriaWeights>,
}

impl JobPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                anyhow::bail!("Job title cannot be empty");
            }
        }
        if let Some(weights) = &self.criteria_weights {
            weights.validate()?;
        }
        Ok(())
    }

    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LinesOrList {
    Text(String),
    List(Vec<String>),
}

impl From<LinesOrList> for Vec<String> {
    fn from(value: LinesOrList) -> Self {
        match value {
            LinesOrList::Text(text) => crate::utils::split_lines(&text),
            LinesOrList::List(items) => items
                .into_iter()
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect(),
        }
    }
}

fn lines_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LinesOrList>::deserialize(deserializer)?
        .map(Into::into)
        .unwrap_or_default())
}

fn opt_lines_or_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<LinesOrList>::deserialize(deserializer)?.map(Into::into))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Number(serde_json::Number),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<StringOrNumber>::deserialize(deserializer)? {
        Some(StringOrNumber::Text(text)) => text,
        Some(StringOrNumber::Number(number)) => number.to_string(),
        None => String::new(),
    })
}

fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::Text(text) => text,
            StringOrNumber::Number(number) => number.to_string(),
        }),
    )
}
