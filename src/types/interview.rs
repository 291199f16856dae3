// src/types/interview.rs
//! Interviews nested under an applicant. Notes arrive either as one free-text
//! string or as a list of entries and are normalized on the way in.

use anyhow::Result;
use chrono::serde::ts_milliseconds_option;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::core::store::{to_fields, Document, Fields};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterviewStatus {
    #[default]
    #[serde(alias = "pending")]
    Scheduled,
    #[serde(alias = "success")]
    Completed,
    #[serde(alias = "Cancelled", alias = "canceled", alias = "cancelled")]
    Canceled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewNote {
    #[serde(alias = "content", alias = "note")]
    pub text: String,
    #[serde(default, with = "ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
}

impl InterviewNote {
    pub fn new(text: impl Into<String>, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            text: text.into(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interview {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, with = "ts_milliseconds_option")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interviewer: String,
    #[serde(default)]
    pub status: InterviewStatus,
    #[serde(default, deserialize_with = "normalize_notes")]
    pub notes: Vec<InterviewNote>,
}

impl Interview {
    pub fn from_document(doc: &Document) -> Result<Self> {
        let mut interview: Interview = doc.decode()?;
        interview.id = doc.id.clone();
        Ok(interview)
    }

    pub fn to_fields(&self) -> Result<Fields> {
        to_fields(self)
    }
}

/// Input for scheduling an interview
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDraft {
    pub title: String,
    pub scheduled_at: DateTime<Utc>,
    pub interviewer: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl InterviewDraft {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            anyhow::bail!("Interview title is required");
        }
        if self.interviewer.trim().is_empty() {
            anyhow::bail!("Interviewer name is required");
        }
        Ok(())
    }

    pub fn into_interview(self, id: String, now: DateTime<Utc>) -> Interview {
        let notes = self
            .notes
            .filter(|text| !text.trim().is_empty())
            .map(|text| vec![InterviewNote::new(text.trim(), Some(now))])
            .unwrap_or_default();

        Interview {
            id,
            title: self.title.trim().to_string(),
            scheduled_at: Some(self.scheduled_at),
            interviewer: self.interviewer.trim().to_string(),
            status: InterviewStatus::Scheduled,
            notes,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNote {
    Text(String),
    Entry(InterviewNote),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNotes {
    Text(String),
    Entries(Vec<RawNote>),
}

fn normalize_notes<'de, D>(deserializer: D) -> Result<Vec<InterviewNote>, D::Error>
where
    D: Deserializer<'de>,
{
    let notes = match Option::<RawNotes>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(RawNotes::Text(text)) => vec![InterviewNote::new(text, None)],
        Some(RawNotes::Entries(entries)) => entries
            .into_iter()
            .map(|entry| match entry {
                RawNote::Text(text) => InterviewNote::new(text, None),
                RawNote::Entry(note) => note,
            })
            .collect(),
    };

    Ok(notes
        .into_iter()
        .filter(|note| !note.text.trim().is_empty())
        .collect())
}
