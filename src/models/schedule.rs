use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;

use crate::validate;

/// The fixed weekday abbreviation set used by the `day` column and the
/// weekly view, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub const WEEK: [DayOfWeek; 7] = [
        DayOfWeek::Mon,
        DayOfWeek::Tue,
        DayOfWeek::Wed,
        DayOfWeek::Thu,
        DayOfWeek::Fri,
        DayOfWeek::Sat,
        DayOfWeek::Sun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Mon",
            DayOfWeek::Tue => "Tue",
            DayOfWeek::Wed => "Wed",
            DayOfWeek::Thu => "Thu",
            DayOfWeek::Fri => "Fri",
            DayOfWeek::Sat => "Sat",
            DayOfWeek::Sun => "Sun",
        }
    }

    pub fn from_abbrev(s: &str) -> Option<Self> {
        Self::WEEK.into_iter().find(|day| day.as_str() == s)
    }

    pub fn full_name(self) -> &'static str {
        match self {
            DayOfWeek::Mon => "Monday",
            DayOfWeek::Tue => "Tuesday",
            DayOfWeek::Wed => "Wednesday",
            DayOfWeek::Thu => "Thursday",
            DayOfWeek::Fri => "Friday",
            DayOfWeek::Sat => "Saturday",
            DayOfWeek::Sun => "Sunday",
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            chrono::Weekday::Mon => DayOfWeek::Mon,
            chrono::Weekday::Tue => DayOfWeek::Tue,
            chrono::Weekday::Wed => DayOfWeek::Wed,
            chrono::Weekday::Thu => DayOfWeek::Thu,
            chrono::Weekday::Fri => DayOfWeek::Fri,
            chrono::Weekday::Sat => DayOfWeek::Sat,
            chrono::Weekday::Sun => DayOfWeek::Sun,
        }
    }
}

/// A class schedule row, owned by the server and mirrored into the client
/// cache exactly as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ClassSchedule {
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    pub day: String,
    pub course: String,
    pub start_time: String,
    pub end_time: String,
    pub place: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

/// Body for schedule create and update; the update endpoint takes the full
/// shape, not a partial one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulePayload {
    pub day: String,
    pub course: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default)]
    pub place: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleFormError {
    #[error("Day is required")]
    MissingDay,
    #[error("Day must be one of Mon, Tue, Wed, Thu, Fri, Sat, Sun")]
    UnknownDay,
    #[error("Course name is required")]
    MissingCourse,
    #[error("Start and end time are required")]
    MissingTime,
    #[error("Times must be in HH:MM format")]
    BadTime,
    #[error("End time must be after start time")]
    EndNotAfterStart,
}

impl SchedulePayload {
    /// Shared by the API handlers and the client-side form, so both sides
    /// reject the same inputs.
    pub fn validate(&self) -> Result<(), ScheduleFormError> {
        if self.day.trim().is_empty() {
            return Err(ScheduleFormError::MissingDay);
        }
        if DayOfWeek::from_abbrev(self.day.trim()).is_none() {
            return Err(ScheduleFormError::UnknownDay);
        }
        if self.course.trim().is_empty() {
            return Err(ScheduleFormError::MissingCourse);
        }
        if self.start_time.is_empty() || self.end_time.is_empty() {
            return Err(ScheduleFormError::MissingTime);
        }
        let start = validate::parse_hhmm(&self.start_time).ok_or(ScheduleFormError::BadTime)?;
        let end = validate::parse_hhmm(&self.end_time).ok_or(ScheduleFormError::BadTime)?;
        if end <= start {
            return Err(ScheduleFormError::EndNotAfterStart);
        }
        Ok(())
    }

    /// Builds the cache entry for a create confirmed by the server, which
    /// returns only the new row id.
    pub fn into_schedule(self, id: i64, user_id: i64) -> ClassSchedule {
        ClassSchedule {
            id,
            user_id,
            day: self.day,
            course: self.course,
            start_time: self.start_time,
            end_time: self.end_time,
            place: self.place,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleCreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyScheduleResponse {
    pub schedules: Vec<ClassSchedule>,
}
