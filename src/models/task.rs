use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Rank used for priority ordering, highest first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn toggled(self) -> Self {
        match self {
            TaskStatus::Pending => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }
}

/// A task as stored in the per-user record. Exists only client-side; the
/// server never sees one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub deadline_date: NaiveDate,
    pub deadline_time: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub reminder: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Persisted attachment: the picked file already read and encoded as a data
/// URL. `id` is wall-clock millis plus a random suffix and is treated as an
/// opaque, possibly colliding label, never as a lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(rename = "base64")]
    pub data: String,
    pub is_stored: bool,
}

/// Form values for creating or editing a task, prior to validation.
#[derive(Debug, Clone, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: String,
    pub deadline_date: Option<NaiveDate>,
    pub deadline_time: Option<String>,
    pub priority: Priority,
    pub reminder: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskFormError {
    #[error("Title is required")]
    MissingTitle,
    #[error("Category is required")]
    MissingCategory,
    #[error("Deadline date and time are required")]
    MissingDeadline,
    #[error("Deadline time must be in HH:MM format")]
    BadTime,
    #[error("Deadline cannot be in the past")]
    DeadlineInPast,
}

impl TaskDraft {
    /// Checks the form and returns the parsed deadline parts. The past check
    /// compares the combined date and time against `now`; a deadline equal to
    /// `now` is accepted.
    pub fn validate(&self, now: NaiveDateTime) -> Result<(NaiveDate, String), TaskFormError> {
        if self.title.trim().is_empty() {
            return Err(TaskFormError::MissingTitle);
        }
        if self.category.trim().is_empty() {
            return Err(TaskFormError::MissingCategory);
        }
        let (date, time) = match (self.deadline_date, self.deadline_time.as_deref()) {
            (Some(date), Some(time)) if !time.is_empty() => (date, time),
            _ => return Err(TaskFormError::MissingDeadline),
        };
        let parsed = validate::parse_hhmm(time).ok_or(TaskFormError::BadTime)?;
        if date.and_time(parsed) < now {
            return Err(TaskFormError::DeadlineInPast);
        }
        Ok((date, time.to_string()))
    }
}
